use crate::error::KVError;

/// KVStore is the byte-level persistence backend behind the console's
/// local state.
///
/// Keys are flat strings such as `app_user` or `sidebar.openCategories`.
/// Every operation may fail (disk full, file locked, backend disabled);
/// callers that must never fail wrap a store in [`crate::LocalStore`].
pub trait KVStore: Send + Sync {
    /// Get the value for a key. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError>;

    /// Set a key-value pair, replacing any previous value.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError>;

    /// Delete a key. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), KVError>;

    /// Scan all keys matching a prefix. Returns sorted (key, value) pairs.
    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError>;
}
