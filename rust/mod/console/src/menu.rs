//! Menu/route tree: the static hierarchy of navigable pages with the
//! permissions each one requires.

use std::collections::HashSet;

use opsconsole_core::ConsoleError;
use opsconsole_flux::Translate;
use serde::{Deserialize, Serialize};

use crate::permission as perm;

/// Section tag for items shown in the secondary "other" group.
pub const SECTION_EXTRA: &str = "extra";

/// Icon reference attached to a menu node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MenuIcon {
    /// Same icon in every state.
    Single { name: String },
    /// Filled variant while active, regular otherwise.
    Pair { filled: String, regular: String },
}

impl MenuIcon {
    pub fn single(name: impl Into<String>) -> Self {
        MenuIcon::Single { name: name.into() }
    }

    /// `{base}.filled` / `{base}.regular`.
    pub fn pair(base: &str) -> Self {
        MenuIcon::Pair {
            filled: format!("{}.filled", base),
            regular: format!("{}.regular", base),
        }
    }

    /// Concrete icon for the node's current state.
    pub fn resolve(&self, active: bool) -> &str {
        match self {
            MenuIcon::Single { name } => name.as_str(),
            MenuIcon::Pair { filled, .. } if active => filled.as_str(),
            MenuIcon::Pair { regular, .. } => regular.as_str(),
        }
    }
}

/// One node of the menu tree. A node with `path` is a leaf; a node with
/// `children` is a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuNode {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuNode>,
    /// Any one of these grants visibility. Empty means always visible.
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<MenuIcon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

impl MenuNode {
    pub fn leaf(key: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::bare(key.into())
        }
    }

    pub fn category(key: impl Into<String>, children: Vec<MenuNode>) -> Self {
        Self {
            children,
            ..Self::bare(key.into())
        }
    }

    fn bare(key: String) -> Self {
        Self {
            key,
            label_key: None,
            label: None,
            path: None,
            children: Vec::new(),
            required: Vec::new(),
            icon: None,
            section: None,
        }
    }

    pub fn label_key(mut self, key: impl Into<String>) -> Self {
        self.label_key = Some(key.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn required<I, S>(mut self, perms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = perms.into_iter().map(Into::into).collect();
        self
    }

    pub fn icon(mut self, icon: MenuIcon) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn is_category(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn is_extra(&self) -> bool {
        self.section.as_deref() == Some(SECTION_EXTRA)
    }

    /// Whether this node or any descendant navigates to `path`.
    pub fn contains_path(&self, path: &str) -> bool {
        self.path.as_deref() == Some(path) || self.children.iter().any(|c| c.contains_path(path))
    }

    pub fn display_label(&self, i18n: &dyn Translate) -> String {
        resolve_label(self.label_key.as_deref(), self.label.as_deref(), &self.key, i18n)
    }
}

/// A node without its children, plus the keys of its ancestors from the
/// root down to its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatEntry {
    pub key: String,
    pub label_key: Option<String>,
    pub label: Option<String>,
    pub path: Option<String>,
    pub required: Vec<String>,
    pub icon: Option<MenuIcon>,
    pub section: Option<String>,
    pub parent_keys: Vec<String>,
}

impl FlatEntry {
    pub fn display_label(&self, i18n: &dyn Translate) -> String {
        resolve_label(self.label_key.as_deref(), self.label.as_deref(), &self.key, i18n)
    }
}

fn resolve_label(
    label_key: Option<&str>,
    label: Option<&str>,
    key: &str,
    i18n: &dyn Translate,
) -> String {
    match (label_key, label) {
        (Some(k), fallback) => i18n.translate(k, fallback),
        (None, Some(l)) => l.to_string(),
        (None, None) => key.to_string(),
    }
}

/// Pre-order depth-first walk, children in declared order.
pub fn flatten(nodes: &[MenuNode]) -> Vec<FlatEntry> {
    fn walk(nodes: &[MenuNode], parents: &mut Vec<String>, out: &mut Vec<FlatEntry>) {
        for node in nodes {
            out.push(FlatEntry {
                key: node.key.clone(),
                label_key: node.label_key.clone(),
                label: node.label.clone(),
                path: node.path.clone(),
                required: node.required.clone(),
                icon: node.icon.clone(),
                section: node.section.clone(),
                parent_keys: parents.clone(),
            });
            if !node.children.is_empty() {
                parents.push(node.key.clone());
                walk(&node.children, parents, out);
                parents.pop();
            }
        }
    }
    let mut out = Vec::new();
    walk(nodes, &mut Vec::new(), &mut out);
    out
}

/// Keys must be unique across the tree, and so must declared paths.
pub fn validate(nodes: &[MenuNode]) -> Result<(), ConsoleError> {
    let mut keys = HashSet::new();
    let mut paths = HashSet::new();
    for entry in flatten(nodes) {
        if entry.key.is_empty() {
            return Err(ConsoleError::Validation("menu node with empty key".into()));
        }
        if !keys.insert(entry.key.clone()) {
            return Err(ConsoleError::Validation(format!(
                "duplicate menu key: {}",
                entry.key
            )));
        }
        if let Some(path) = entry.path {
            if !paths.insert(path.clone()) {
                return Err(ConsoleError::Validation(format!(
                    "duplicate menu path: {}",
                    path
                )));
            }
        }
    }
    Ok(())
}

/// A validated menu tree with its flattened form precomputed. Immutable
/// after construction.
#[derive(Debug, Clone)]
pub struct MenuTree {
    roots: Vec<MenuNode>,
    flat: Vec<FlatEntry>,
}

impl MenuTree {
    pub fn new(roots: Vec<MenuNode>) -> Result<Self, ConsoleError> {
        validate(&roots)?;
        let flat = flatten(&roots);
        Ok(Self { roots, flat })
    }

    /// Parse a tree from its JSON form.
    pub fn from_json(text: &str) -> Result<Self, ConsoleError> {
        let roots: Vec<MenuNode> =
            serde_json::from_str(text).map_err(|e| ConsoleError::Validation(e.to_string()))?;
        Self::new(roots)
    }

    pub fn roots(&self) -> &[MenuNode] {
        &self.roots
    }

    pub fn entries(&self) -> &[FlatEntry] {
        &self.flat
    }

    /// First entry whose path equals `path` exactly.
    pub fn find_by_path(&self, path: &str) -> Option<&FlatEntry> {
        self.flat.iter().find(|e| e.path.as_deref() == Some(path))
    }

    pub fn find_by_key(&self, key: &str) -> Option<&FlatEntry> {
        self.flat.iter().find(|e| e.key == key)
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.find_by_key(key).is_some()
    }

    /// Every declared path, in tree order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.flat.iter().filter_map(|e| e.path.as_deref())
    }
}

impl Default for MenuTree {
    fn default() -> Self {
        default_menu()
    }
}

/// The console's built-in navigation.
pub fn default_menu() -> MenuTree {
    let roots = vec![
        MenuNode::leaf("dashboard", "/")
            .label_key("menu.dashboard")
            .icon(MenuIcon::pair("board"))
            .required([perm::DASHBOARD_VIEW]),
        MenuNode::category(
            "hostCategory",
            vec![
                MenuNode::leaf("hosts", "/hosts")
                    .label_key("menu.host.list")
                    .required([perm::HOSTS_READ]),
                MenuNode::leaf("addHost", "/hosts/add")
                    .label_key("menu.host.add")
                    .required([perm::HOSTS_CREATE]),
            ],
        )
        .label_key("menu.host.category")
        .icon(MenuIcon::pair("desktop-tower"))
        .required([perm::HOSTS_READ]),
        MenuNode::category(
            "serviceCategory",
            vec![
                MenuNode::leaf("services", "/services")
                    .label_key("menu.service.list")
                    .required([perm::SERVICES_READ]),
                MenuNode::leaf("serviceAlerts", "/services/alerts")
                    .label_key("menu.service.alerts")
                    .required([perm::SERVICES_ALERTS_READ]),
            ],
        )
        .label_key("menu.service.category")
        .icon(MenuIcon::pair("server"))
        .required([perm::SERVICES_READ]),
        MenuNode::category(
            "logCategory",
            vec![
                MenuNode::leaf("logs", "/logs")
                    .label_key("menu.log.list")
                    .required([perm::LOGS_READ]),
                MenuNode::leaf("logRules", "/logs/rules")
                    .label_key("menu.log.rules")
                    .required([perm::LOGS_RULES_READ]),
            ],
        )
        .label_key("menu.log.category")
        .icon(MenuIcon::pair("document-bullet-list"))
        .required([perm::LOGS_READ]),
        MenuNode::category(
            "userCategory",
            vec![
                MenuNode::leaf("users", "/users")
                    .label_key("menu.user.users")
                    .required([perm::USERS_READ]),
                MenuNode::leaf("roles", "/roles")
                    .label_key("menu.user.roles")
                    .required([perm::ROLES_MANAGE]),
            ],
        )
        .label_key("menu.user.category")
        .icon(MenuIcon::pair("people"))
        .required([perm::USERS_READ]),
        MenuNode::category(
            "systemCategory",
            vec![
                MenuNode::leaf("settings", "/settings")
                    .label_key("menu.system.settings")
                    .required([perm::SETTINGS_READ]),
                MenuNode::leaf("security", "/settings/security")
                    .label_key("menu.system.security")
                    .required([perm::SETTINGS_SECURITY_READ]),
            ],
        )
        .label_key("menu.system.category")
        .icon(MenuIcon::pair("settings"))
        .required([perm::SETTINGS_READ]),
        MenuNode::leaf("reports", "/reports")
            .label_key("menu.reports")
            .icon(MenuIcon::pair("data-area"))
            .required([perm::REPORTS_VIEW])
            .section(SECTION_EXTRA),
        MenuNode::leaf("profile", "/profile")
            .label_key("menu.profile")
            .icon(MenuIcon::single("person-star"))
            .required([perm::PROFILE_VIEW])
            .section(SECTION_EXTRA),
    ];
    let flat = flatten(&roots);
    MenuTree { roots, flat }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsconsole_flux::{KeyEcho, Translator};

    // ========================================================================
    // Flatten / lookup
    // ========================================================================

    #[test]
    fn flatten_is_preorder_with_parent_chain() {
        let tree = default_menu();
        let keys: Vec<&str> = tree.entries().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(
            &keys[..4],
            &["dashboard", "hostCategory", "hosts", "addHost"]
        );
        assert_eq!(tree.entries().len(), 18);

        let add = tree.find_by_path("/hosts/add").unwrap();
        assert_eq!(add.key, "addHost");
        assert_eq!(add.parent_keys, vec!["hostCategory"]);
        assert!(tree.find_by_key("hostCategory").unwrap().parent_keys.is_empty());
    }

    #[test]
    fn nested_parent_chain() {
        let roots = vec![MenuNode::category(
            "ops",
            vec![MenuNode::category("infra", vec![MenuNode::leaf("racks", "/ops/racks")])],
        )];
        let flat = flatten(&roots);
        assert_eq!(flat[2].parent_keys, vec!["ops", "infra"]);
    }

    #[test]
    fn find_by_path_is_exact() {
        let tree = default_menu();
        assert!(tree.find_by_path("/hosts/").is_none());
        assert!(tree.find_by_path("/HOSTS").is_none());
        assert!(tree.find_by_path("/nope").is_none());
        assert_eq!(tree.find_by_path("/").unwrap().key, "dashboard");
    }

    // ========================================================================
    // Validation
    // ========================================================================

    #[test]
    fn default_tree_is_valid() {
        let tree = default_menu();
        assert!(validate(tree.roots()).is_ok());
        assert_eq!(tree.paths().count(), 13);
    }

    #[test]
    fn duplicate_key_or_path_rejected() {
        let dup_key = vec![MenuNode::leaf("a", "/a"), MenuNode::category("x", vec![MenuNode::leaf("a", "/b")])];
        assert!(MenuTree::new(dup_key).is_err());

        let dup_path = vec![MenuNode::leaf("a", "/a"), MenuNode::leaf("b", "/a")];
        let err = MenuTree::new(dup_path).unwrap_err();
        assert!(err.to_string().contains("/a"));
    }

    #[test]
    fn json_form_round_trips() {
        let text = serde_json::to_string(default_menu().roots()).unwrap();
        let tree = MenuTree::from_json(&text).unwrap();
        assert_eq!(tree.roots(), default_menu().roots());
        assert!(MenuTree::from_json("{").is_err());
    }

    // ========================================================================
    // Labels and icons
    // ========================================================================

    #[test]
    fn labels_resolve_through_translator() {
        let i18n = Translator::new("en-US");
        i18n.add_messages("en-US", [("menu.dashboard", "Dashboard")]);
        let tree = default_menu();
        assert_eq!(tree.roots()[0].display_label(&i18n), "Dashboard");
        assert_eq!(tree.roots()[1].display_label(&i18n), "menu.host.category");

        let literal = MenuNode::leaf("x", "/x").label("Literal");
        assert_eq!(literal.display_label(&KeyEcho), "Literal");
        assert_eq!(MenuNode::leaf("bare", "/bare").display_label(&KeyEcho), "bare");
    }

    #[test]
    fn pair_icon_follows_active_state() {
        let icon = MenuIcon::pair("board");
        assert_eq!(icon.resolve(true), "board.filled");
        assert_eq!(icon.resolve(false), "board.regular");
        assert_eq!(MenuIcon::single("x").resolve(true), "x");
    }
}
