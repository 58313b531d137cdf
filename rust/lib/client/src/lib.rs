//! Data-fetch collaborator for the ops console.
//!
//! [`ConsoleApi`] is the seam: the console engine only ever talks to a
//! `dyn ConsoleApi`. Two backends ship with it:
//!
//! - [`HttpApi`]: JSON over HTTP against a remote service.
//! - [`MockApi`]: seeded in-process data with configurable latency and a
//!   failure switch.
//!
//! ```ignore
//! let api: Arc<dyn ConsoleApi> = Arc::new(MockApi::new(Duration::from_millis(400)));
//! let hosts = api.fetch_hosts().await?.data;
//! ```

pub mod api;
pub mod error;
pub mod http;
pub mod mock;
pub mod model;

pub use api::{fetch_resource, ConsoleApi, Resource};
pub use error::ApiError;
pub use http::HttpApi;
pub use mock::MockApi;
pub use model::*;
