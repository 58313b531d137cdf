pub mod error;
pub mod local;
pub mod memory;
pub mod redb;
pub mod traits;

pub use error::KVError;
pub use local::LocalStore;
pub use memory::MemoryStore;
pub use redb::RedbStore;
pub use traits::KVStore;
