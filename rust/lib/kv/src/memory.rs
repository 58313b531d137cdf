use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::KVError;
use crate::traits::KVStore;

/// MemoryStore keeps everything in a process-local map. Used for tests and
/// for sessions that run without a data directory.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KVStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError> {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), KVError> {
        self.entries.write().unwrap().remove(key);
        Ok(())
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError> {
        let entries = self.entries.read().unwrap();
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_delete() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.set("app_user", b"{}").unwrap();
        assert_eq!(store.get("app_user").unwrap(), Some(b"{}".to_vec()));

        store.delete("app_user").unwrap();
        assert_eq!(store.get("app_user").unwrap(), None);
        // Deleting again is fine.
        store.delete("app_user").unwrap();
    }

    #[test]
    fn scan_prefix_is_sorted_and_bounded() {
        let store = MemoryStore::new();
        store.set("sidebar.openCategories", b"[]").unwrap();
        store.set("sidebar.collapsed", b"0").unwrap();
        store.set("sidebarx", b"no").unwrap();
        store.set("app_user", b"{}").unwrap();

        let keys: Vec<String> = store
            .scan("sidebar.")
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["sidebar.collapsed", "sidebar.openCategories"]);
    }
}
