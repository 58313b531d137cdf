use opsconsole_flux::Translate;
use serde::Serialize;

use crate::menu::{FlatEntry, MenuTree};

/// Key of the entry prepended to every chain that doesn't start with it.
pub const HOME_KEY: &str = "dashboard";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Crumb {
    pub key: String,
    pub label: String,
    pub path: Option<String>,
    /// Has a path and is not the current page.
    pub navigable: bool,
}

/// Root-to-leaf chain for `path`. Empty when the path isn't in the tree.
pub fn breadcrumbs(tree: &MenuTree, path: &str, i18n: &dyn Translate) -> Vec<Crumb> {
    let Some(current) = tree.find_by_path(path) else {
        return Vec::new();
    };

    let mut chain: Vec<&FlatEntry> = current
        .parent_keys
        .iter()
        .chain(std::iter::once(&current.key))
        .filter_map(|k| tree.find_by_key(k))
        .collect();
    if let Some(home) = tree.find_by_key(HOME_KEY) {
        if chain.first().map(|e| e.key.as_str()) != Some(HOME_KEY) {
            chain.insert(0, home);
        }
    }

    let last = chain.len().saturating_sub(1);
    chain
        .into_iter()
        .enumerate()
        .map(|(i, e)| Crumb {
            key: e.key.clone(),
            label: e.display_label(i18n),
            path: e.path.clone(),
            navigable: i < last && e.path.is_some(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::{default_menu, MenuNode};
    use opsconsole_flux::{KeyEcho, Translator};

    fn keys(crumbs: &[Crumb]) -> Vec<&str> {
        crumbs.iter().map(|c| c.key.as_str()).collect()
    }

    #[test]
    fn leaf_under_category_gets_home_prepended() {
        let crumbs = breadcrumbs(&default_menu(), "/hosts/add", &KeyEcho);
        assert_eq!(keys(&crumbs), vec!["dashboard", "hostCategory", "addHost"]);
        assert!(crumbs[0].navigable);
        assert!(!crumbs[1].navigable);
        assert!(!crumbs[2].navigable);
    }

    #[test]
    fn two_ancestors_make_three_crumbs_in_order() {
        let tree = MenuTree::new(vec![MenuNode::category(
            "ops",
            vec![MenuNode::category(
                "infra",
                vec![MenuNode::leaf("racks", "/ops/racks")],
            )],
        )])
        .unwrap();
        let crumbs = breadcrumbs(&tree, "/ops/racks", &KeyEcho);
        assert_eq!(keys(&crumbs), vec!["ops", "infra", "racks"]);
    }

    #[test]
    fn home_itself_is_single_crumb() {
        let crumbs = breadcrumbs(&default_menu(), "/", &KeyEcho);
        assert_eq!(keys(&crumbs), vec!["dashboard"]);
        assert!(!crumbs[0].navigable);
    }

    #[test]
    fn unknown_path_has_no_crumbs() {
        assert!(breadcrumbs(&default_menu(), "/nowhere", &KeyEcho).is_empty());
    }

    #[test]
    fn labels_are_translated() {
        let i18n = Translator::new("zh-CN");
        i18n.add_messages("zh-CN", [("menu.dashboard", "仪表盘"), ("menu.reports", "报表分析")]);
        let crumbs = breadcrumbs(&default_menu(), "/reports", &i18n);
        let labels: Vec<&str> = crumbs.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["仪表盘", "报表分析"]);
    }
}
