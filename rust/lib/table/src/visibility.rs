use std::fmt;
use std::sync::Arc;

use opsconsole_kv::LocalStore;
use tracing::debug;

/// Storage key used when a table does not name its own.
pub const DEFAULT_STORAGE_KEY: &str = "datatable_columns";

pub type VisibilityListener = Arc<dyn Fn(&[String]) + Send + Sync>;

/// How a table resolves and persists its visible columns.
#[derive(Clone)]
pub struct VisibilityOptions {
    pub store: LocalStore,
    pub storage_key: Option<String>,
    pub default_visible: Option<Vec<String>>,
    pub on_change: Option<VisibilityListener>,
}

impl VisibilityOptions {
    pub fn new(store: LocalStore) -> Self {
        Self {
            store,
            storage_key: None,
            default_visible: None,
            on_change: None,
        }
    }

    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = Some(key.into());
        self
    }

    pub fn default_visible<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_visible = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn on_change<F>(mut self, f: F) -> Self
    where
        F: Fn(&[String]) + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for VisibilityOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisibilityOptions")
            .field("storage_key", &self.storage_key)
            .field("default_visible", &self.default_visible)
            .finish()
    }
}

/// The ordered set of visible column keys for one table.
///
/// Without options every column is visible and nothing is persisted. With
/// options, every change is written through to the store and reported to
/// the listener.
pub struct ColumnVisibility {
    all: Vec<String>,
    visible: Vec<String>,
    options: Option<VisibilityOptions>,
}

impl ColumnVisibility {
    /// Resolve the initial set: caller defaults, then the persisted list,
    /// then all columns. Unknown keys are dropped in every case.
    pub fn new(all: Vec<String>, options: Option<VisibilityOptions>) -> Self {
        let visible = match &options {
            None => all.clone(),
            Some(opts) => {
                let known = |keys: &[String]| -> Vec<String> {
                    keys.iter().filter(|k| all.contains(k)).cloned().collect()
                };
                if let Some(defaults) = &opts.default_visible {
                    known(defaults)
                } else if let Some(saved) = opts.store.get_json::<Vec<String>>(&key_of(opts)) {
                    known(&saved)
                } else {
                    all.clone()
                }
            }
        };
        let vis = Self {
            all,
            visible,
            options,
        };
        vis.persist();
        vis
    }

    pub fn is_configured(&self) -> bool {
        self.options.is_some()
    }

    pub fn visible_keys(&self) -> &[String] {
        &self.visible
    }

    pub fn is_visible(&self, key: &str) -> bool {
        self.visible.iter().any(|k| k == key)
    }

    /// Show or hide one column. Newly shown columns go to the end of the
    /// list. Unknown keys are ignored.
    pub fn toggle(&mut self, key: &str) {
        if !self.all.iter().any(|k| k == key) {
            debug!("ColumnVisibility: ignoring unknown column {}", key);
            return;
        }
        if let Some(pos) = self.visible.iter().position(|k| k == key) {
            self.visible.remove(pos);
        } else {
            self.visible.push(key.to_string());
        }
        self.changed();
    }

    pub fn show_all(&mut self) {
        self.visible = self.all.clone();
        self.changed();
    }

    pub fn hide_all(&mut self) {
        self.visible.clear();
        self.changed();
    }

    fn changed(&self) {
        self.persist();
        if let Some(listener) = self.options.as_ref().and_then(|o| o.on_change.as_ref()) {
            listener(&self.visible);
        }
    }

    fn persist(&self) {
        if let Some(opts) = &self.options {
            opts.store.set_json(&key_of(opts), &self.visible);
        }
    }
}

fn key_of(opts: &VisibilityOptions) -> String {
    opts.storage_key
        .clone()
        .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn keys(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn all() -> Vec<String> {
        keys(&["name", "ip", "status", "createdAt"])
    }

    // ========================================================================
    // Initial resolution
    // ========================================================================

    #[test]
    fn unconfigured_shows_everything() {
        let vis = ColumnVisibility::new(all(), None);
        assert_eq!(vis.visible_keys(), all().as_slice());
        assert!(!vis.is_configured());
    }

    #[test]
    fn defaults_win_over_persisted() {
        let store = LocalStore::in_memory();
        store.set_json(DEFAULT_STORAGE_KEY, &keys(&["ip"]));
        let opts = VisibilityOptions::new(store).default_visible(["status", "bogus", "name"]);
        let vis = ColumnVisibility::new(all(), Some(opts));
        assert_eq!(vis.visible_keys(), keys(&["status", "name"]).as_slice());
    }

    #[test]
    fn persisted_list_drops_stale_keys() {
        let store = LocalStore::in_memory();
        store.set_json("cols.hosts", &keys(&["ip", "retired", "name"]));
        let opts = VisibilityOptions::new(store).storage_key("cols.hosts");
        let vis = ColumnVisibility::new(all(), Some(opts));
        assert_eq!(vis.visible_keys(), keys(&["ip", "name"]).as_slice());
    }

    #[test]
    fn garbage_in_storage_means_all_columns() {
        let store = LocalStore::in_memory();
        store.set(DEFAULT_STORAGE_KEY, "{not json");
        let vis = ColumnVisibility::new(all(), Some(VisibilityOptions::new(store)));
        assert_eq!(vis.visible_keys(), all().as_slice());
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    #[test]
    fn every_change_is_persisted_and_reported() {
        let store = LocalStore::in_memory();
        let reported = Arc::new(Mutex::new(Vec::<Vec<String>>::new()));
        let r = reported.clone();
        let opts = VisibilityOptions::new(store.clone())
            .storage_key("cols.hosts")
            .on_change(move |keys| r.lock().unwrap().push(keys.to_vec()));
        let mut vis = ColumnVisibility::new(all(), Some(opts));

        vis.toggle("ip");
        assert_eq!(
            store.get_json::<Vec<String>>("cols.hosts").unwrap(),
            keys(&["name", "status", "createdAt"])
        );
        vis.toggle("ip");
        assert_eq!(vis.visible_keys().last().map(String::as_str), Some("ip"));
        vis.hide_all();
        assert!(store.get_json::<Vec<String>>("cols.hosts").unwrap().is_empty());
        vis.show_all();
        vis.toggle("nope");

        assert_eq!(reported.lock().unwrap().len(), 4);
        assert!(vis.is_visible("createdAt"));
    }
}
