use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::traits::KVStore;

/// LocalStore is the string-valued local key-value store the console reads
/// and writes its persisted UI state through.
///
/// Two layers:
///
/// - **Shadow layer** (in-memory, higher priority): holds values whose
///   write to the backend failed, and tombstones for failed removals.
/// - **Backend** (persistent): any [`KVStore`].
///
/// No operation returns an error. A failing backend is logged at `warn` and
/// the value lives on in the shadow layer, so the session keeps working
/// without persistence.
#[derive(Clone)]
pub struct LocalStore {
    shadow: Arc<RwLock<BTreeMap<String, Option<String>>>>,
    backend: Arc<dyn KVStore>,
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore").finish_non_exhaustive()
    }
}

impl LocalStore {
    pub fn new(backend: Arc<dyn KVStore>) -> Self {
        Self {
            shadow: Arc::new(RwLock::new(BTreeMap::new())),
            backend,
        }
    }

    /// A store that never persists anything beyond the process.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(crate::MemoryStore::new()))
    }

    /// Read a value. Backend failures read as absent.
    pub fn get(&self, key: &str) -> Option<String> {
        {
            let shadow = self.shadow.read().unwrap();
            if let Some(entry) = shadow.get(key) {
                return entry.clone();
            }
        }
        match self.backend.get(key) {
            Ok(Some(bytes)) => match String::from_utf8(bytes) {
                Ok(s) => Some(s),
                Err(_) => {
                    warn!("LocalStore: value at {} is not UTF-8, ignoring", key);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("LocalStore: read {} failed: {}", key, e);
                None
            }
        }
    }

    /// Write a value through to the backend.
    pub fn set(&self, key: &str, value: &str) {
        match self.backend.set(key, value.as_bytes()) {
            Ok(()) => {
                self.shadow.write().unwrap().remove(key);
            }
            Err(e) => {
                warn!("LocalStore: write {} failed, keeping in memory: {}", key, e);
                self.shadow
                    .write()
                    .unwrap()
                    .insert(key.to_string(), Some(value.to_string()));
            }
        }
    }

    /// Remove a value.
    pub fn remove(&self, key: &str) {
        match self.backend.delete(key) {
            Ok(()) => {
                self.shadow.write().unwrap().remove(key);
            }
            Err(e) => {
                warn!("LocalStore: remove {} failed, masking in memory: {}", key, e);
                self.shadow.write().unwrap().insert(key.to_string(), None);
            }
        }
    }

    /// Read and decode a JSON value. Malformed JSON reads as absent.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("LocalStore: value at {} is not valid JSON: {}", key, e);
                None
            }
        }
    }

    /// Encode and write a JSON value.
    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.set(key, &raw),
            Err(e) => warn!("LocalStore: cannot encode value for {}: {}", key, e),
        }
    }

    /// Whether any value is held only in memory because the backend failed.
    pub fn is_degraded(&self) -> bool {
        !self.shadow.read().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use crate::error::KVError;
    use serde::Deserialize;

    /// A backend that fails every call, like a disabled browser storage.
    struct BrokenStore;

    impl KVStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, KVError> {
            Err(KVError::Unavailable("disabled".into()))
        }
        fn set(&self, _key: &str, _value: &[u8]) -> Result<(), KVError> {
            Err(KVError::Unavailable("quota exceeded".into()))
        }
        fn delete(&self, _key: &str) -> Result<(), KVError> {
            Err(KVError::Unavailable("disabled".into()))
        }
        fn scan(&self, _prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError> {
            Err(KVError::Unavailable("disabled".into()))
        }
    }

    #[test]
    fn writes_through_to_backend() {
        let backend = Arc::new(MemoryStore::new());
        let store = LocalStore::new(backend.clone());

        store.set("sidebar.collapsed", "1");
        assert_eq!(backend.get("sidebar.collapsed").unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.get("sidebar.collapsed").as_deref(), Some("1"));
        assert!(!store.is_degraded());

        store.remove("sidebar.collapsed");
        assert_eq!(store.get("sidebar.collapsed"), None);
    }

    #[test]
    fn broken_backend_degrades_to_memory() {
        let store = LocalStore::new(Arc::new(BrokenStore));

        assert_eq!(store.get("app_user"), None);
        store.set("app_user", "{}");
        assert_eq!(store.get("app_user").as_deref(), Some("{}"));
        assert!(store.is_degraded());

        store.remove("app_user");
        assert_eq!(store.get("app_user"), None);
    }

    #[test]
    fn json_helpers_round_trip_and_tolerate_garbage() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Columns(Vec<String>);

        let store = LocalStore::in_memory();
        store.set_json("datatable_columns", &Columns(vec!["id".into(), "name".into()]));
        assert_eq!(
            store.get_json::<Columns>("datatable_columns"),
            Some(Columns(vec!["id".into(), "name".into()]))
        );

        store.set("datatable_columns", "not json");
        assert_eq!(store.get_json::<Columns>("datatable_columns"), None);
    }

    #[test]
    fn clones_share_state() {
        let a = LocalStore::new(Arc::new(BrokenStore));
        let b = a.clone();
        a.set("k", "v");
        assert_eq!(b.get("k").as_deref(), Some("v"));
    }
}
