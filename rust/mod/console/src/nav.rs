//! Navigation filter and sidebar engine.

use opsconsole_flux::Translate;
use opsconsole_kv::LocalStore;
use serde::Serialize;
use tracing::debug;

use crate::menu::{MenuNode, MenuTree};
use crate::permission::{has_any, PermissionSet};

/// Storage key for the open category keys.
pub const OPEN_CATEGORIES_KEY: &str = "sidebar.openCategories";
/// Storage key for the collapsed flag (`"1"` / `"0"`).
pub const COLLAPSED_KEY: &str = "sidebar.collapsed";

/// Nodes the permission set may see, in original order. Categories whose
/// children are all filtered out are dropped too.
pub fn filter_menu(nodes: &[MenuNode], perms: &PermissionSet) -> Vec<MenuNode> {
    nodes
        .iter()
        .filter(|n| has_any(perms, &n.required))
        .filter_map(|n| {
            if n.children.is_empty() {
                return Some(n.clone());
            }
            let children = filter_menu(&n.children, perms);
            if children.is_empty() {
                return None;
            }
            Some(MenuNode {
                children,
                ..n.clone()
            })
        })
        .collect()
}

/// Renderable sidebar entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NavItem {
    Leaf {
        key: String,
        label: String,
        path: String,
        icon: Option<String>,
        active: bool,
    },
    Category {
        key: String,
        label: String,
        icon: Option<String>,
        /// A descendant is the current page.
        active: bool,
        open: bool,
        children: Vec<NavItem>,
    },
}

impl NavItem {
    pub fn key(&self) -> &str {
        match self {
            NavItem::Leaf { key, .. } | NavItem::Category { key, .. } => key.as_str(),
        }
    }
}

/// What the presentation layer draws for the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarView {
    pub main: Vec<NavItem>,
    /// Drawn after a divider, under `other_label`.
    pub other: Vec<NavItem>,
    pub other_label: String,
    pub collapsed: bool,
}

/// Sidebar UI state: which categories are open and whether the sidebar is
/// collapsed. Every change is written through to the local store.
#[derive(Debug, Clone)]
pub struct Sidebar {
    store: LocalStore,
    open: Vec<String>,
    collapsed: bool,
}

impl Sidebar {
    /// Restore state for a sidebar showing `visible` at `current_path`.
    ///
    /// A persisted open set is used as-is, minus keys the tree no longer
    /// has. Without one, the visible category holding the current page
    /// starts open.
    pub fn mount(
        store: LocalStore,
        tree: &MenuTree,
        visible: &[MenuNode],
        current_path: &str,
    ) -> Self {
        let open = match store.get_json::<Vec<String>>(OPEN_CATEGORIES_KEY) {
            Some(saved) => saved.into_iter().filter(|k| tree.has_key(k)).collect(),
            None => visible
                .iter()
                .find(|n| n.is_category() && n.children.iter().any(|c| c.contains_path(current_path)))
                .map(|n| vec![n.key.clone()])
                .unwrap_or_default(),
        };
        let collapsed = store.get(COLLAPSED_KEY).as_deref() == Some("1");
        debug!("Sidebar: mounted at {} with open {:?}", current_path, open);
        Self {
            store,
            open,
            collapsed,
        }
    }

    pub fn open_categories(&self) -> &[String] {
        &self.open
    }

    pub fn is_open(&self, key: &str) -> bool {
        self.open.iter().any(|k| k == key)
    }

    /// Flip a category open or closed. Returns whether it is now open.
    pub fn toggle_category(&mut self, key: &str) -> bool {
        let now_open = if let Some(pos) = self.open.iter().position(|k| k == key) {
            self.open.remove(pos);
            false
        } else {
            self.open.push(key.to_string());
            true
        };
        self.store.set_json(OPEN_CATEGORIES_KEY, &self.open);
        debug!("Sidebar: {} {}", key, if now_open { "opened" } else { "closed" });
        now_open
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn set_collapsed(&mut self, collapsed: bool) {
        self.collapsed = collapsed;
        self.store
            .set(COLLAPSED_KEY, if collapsed { "1" } else { "0" });
    }

    pub fn toggle_collapsed(&mut self) -> bool {
        self.set_collapsed(!self.collapsed);
        self.collapsed
    }

    /// Build the view for `tree` as seen by `perms` at `current_path`.
    /// Recomputed from scratch on every call.
    pub fn view(
        &self,
        tree: &MenuTree,
        perms: &PermissionSet,
        current_path: &str,
        i18n: &dyn Translate,
    ) -> SidebarView {
        let mut main = Vec::new();
        let mut other = Vec::new();
        for node in filter_menu(tree.roots(), perms) {
            let item = self.item(&node, current_path, i18n);
            if node.is_extra() {
                other.push(item);
            } else {
                main.push(item);
            }
        }
        SidebarView {
            main,
            other,
            other_label: i18n.translate("menu.section.other", Some("其他")),
            collapsed: self.collapsed,
        }
    }

    fn item(&self, node: &MenuNode, current_path: &str, i18n: &dyn Translate) -> NavItem {
        let label = node.display_label(i18n);
        if node.is_category() {
            let active = node.children.iter().any(|c| c.contains_path(current_path));
            NavItem::Category {
                key: node.key.clone(),
                label,
                icon: node.icon.as_ref().map(|i| i.resolve(active).to_string()),
                active,
                open: self.is_open(&node.key),
                children: node
                    .children
                    .iter()
                    .map(|c| self.item(c, current_path, i18n))
                    .collect(),
            }
        } else {
            let active = node.path.as_deref() == Some(current_path);
            NavItem::Leaf {
                key: node.key.clone(),
                label,
                path: node.path.clone().unwrap_or_default(),
                icon: node.icon.as_ref().map(|i| i.resolve(active).to_string()),
                active,
            }
        }
    }
}
