pub mod config;
pub mod error;
pub mod types;

pub use config::ConsoleConfig;
pub use error::ConsoleError;
pub use types::{filename_timestamp, merge_patch, now_millis};
