//! Route table and route guard.
//!
//! Every path maps to a page through an explicit table. The guard decides,
//! per navigation attempt, whether the page renders or the user is sent to
//! login or to the forbidden page.

use std::collections::HashMap;

use opsconsole_client::User;
use serde::Serialize;
use tracing::debug;

use crate::menu::MenuTree;
use crate::permission::{effective_permissions, has_any, MergeMode};

pub const LOGIN_PATH: &str = "/login";
pub const FORBIDDEN_PATH: &str = "/403";
pub const NOT_FOUND_PATH: &str = "/404";

/// Pages the console can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Page {
    Dashboard,
    Hosts,
    AddHost,
    Services,
    ServiceAlerts,
    Logs,
    LogRules,
    Users,
    Roles,
    Settings,
    SecuritySettings,
    Reports,
    Profile,
    Login,
    Forbidden,
    NotFound,
}

impl Page {
    /// Whether the page renders inside the authenticated layout (header,
    /// sidebar, breadcrumbs).
    pub fn uses_layout(self) -> bool {
        !matches!(self, Page::Login | Page::Forbidden)
    }

    /// Reachable without a session.
    pub fn is_public(self) -> bool {
        matches!(self, Page::Login | Page::Forbidden)
    }
}

/// Static path → page mapping.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: HashMap<String, Page>,
}

impl RouteTable {
    pub fn new<I, S>(routes: I) -> Self
    where
        I: IntoIterator<Item = (S, Page)>,
        S: Into<String>,
    {
        Self {
            routes: routes.into_iter().map(|(p, page)| (p.into(), page)).collect(),
        }
    }

    /// Exact lookup. Unknown paths resolve to [`Page::NotFound`].
    pub fn resolve(&self, path: &str) -> Page {
        self.routes.get(path).copied().unwrap_or(Page::NotFound)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.routes.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new([
            ("/", Page::Dashboard),
            ("/hosts", Page::Hosts),
            ("/hosts/add", Page::AddHost),
            ("/services", Page::Services),
            ("/services/alerts", Page::ServiceAlerts),
            ("/logs", Page::Logs),
            ("/logs/rules", Page::LogRules),
            ("/users", Page::Users),
            ("/roles", Page::Roles),
            ("/settings", Page::Settings),
            ("/settings/security", Page::SecuritySettings),
            ("/reports", Page::Reports),
            ("/profile", Page::Profile),
            (LOGIN_PATH, Page::Login),
            (FORBIDDEN_PATH, Page::Forbidden),
            (NOT_FOUND_PATH, Page::NotFound),
        ])
    }
}

/// Outcome of one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GuardDecision {
    /// Render the page at `path`.
    Authorized { path: String, page: Page },
    /// No session: go to login, then come back to `from`.
    Unauthenticated { from: String },
    /// Signed in but not allowed.
    Unauthorized { path: String },
}

impl GuardDecision {
    /// Where the browser ends up.
    pub fn target(&self) -> &str {
        match self {
            GuardDecision::Authorized { path, .. } => path.as_str(),
            GuardDecision::Unauthenticated { .. } => LOGIN_PATH,
            GuardDecision::Unauthorized { .. } => FORBIDDEN_PATH,
        }
    }

    /// The page to draw.
    pub fn page(&self) -> Page {
        match self {
            GuardDecision::Authorized { page, .. } => *page,
            GuardDecision::Unauthenticated { .. } => Page::Login,
            GuardDecision::Unauthorized { .. } => Page::Forbidden,
        }
    }
}

/// Decide a navigation to `path`.
///
/// Public pages always render. Otherwise a missing session goes to login.
/// A path declared in the menu is checked against the user's effective
/// permissions; undeclared paths carry no requirement and fall through to
/// whatever the route table resolves (usually not-found).
pub fn guard(
    tree: &MenuTree,
    routes: &RouteTable,
    user: Option<&User>,
    path: &str,
    mode: MergeMode,
) -> GuardDecision {
    let page = routes.resolve(path);
    let decision = if page.is_public() {
        GuardDecision::Authorized {
            path: path.to_string(),
            page,
        }
    } else if user.is_none() {
        GuardDecision::Unauthenticated {
            from: path.to_string(),
        }
    } else {
        let allowed = match tree.find_by_path(path) {
            Some(entry) => has_any(&effective_permissions(user, mode), &entry.required),
            None => true,
        };
        if allowed {
            GuardDecision::Authorized {
                path: path.to_string(),
                page,
            }
        } else {
            GuardDecision::Unauthorized {
                path: path.to_string(),
            }
        }
    };
    debug!("guard: {} -> {:?}", path, decision);
    decision
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::default_menu;

    fn user(role: &str) -> User {
        User {
            name: "bob".into(),
            email: None,
            role: role.into(),
            permissions: None,
        }
    }

    fn decide(u: Option<&User>, path: &str) -> GuardDecision {
        guard(&default_menu(), &RouteTable::default(), u, path, MergeMode::Union)
    }

    #[test]
    fn every_menu_path_has_a_route() {
        let routes = RouteTable::default();
        for path in default_menu().paths() {
            assert_ne!(routes.resolve(path), Page::NotFound, "{}", path);
        }
    }

    #[test]
    fn anonymous_goes_to_login_remembering_target() {
        let d = decide(None, "/users");
        assert_eq!(d, GuardDecision::Unauthenticated { from: "/users".into() });
        assert_eq!(d.target(), LOGIN_PATH);
        assert_eq!(d.page(), Page::Login);
    }

    #[test]
    fn viewer_is_forbidden_from_users() {
        let d = decide(Some(&user("viewer")), "/users");
        assert_eq!(d.target(), FORBIDDEN_PATH);
        assert!(!d.page().uses_layout());
    }

    #[test]
    fn admin_renders_users() {
        let d = decide(Some(&user("admin")), "/users");
        assert_eq!(
            d,
            GuardDecision::Authorized {
                path: "/users".into(),
                page: Page::Users
            }
        );
    }

    #[test]
    fn undeclared_path_is_not_found_not_forbidden() {
        let d = decide(Some(&user("viewer")), "/no/such/page");
        assert_eq!(d.page(), Page::NotFound);
        assert!(d.page().uses_layout());
        // still needs a session
        assert_eq!(decide(None, "/no/such/page").page(), Page::Login);
    }

    #[test]
    fn public_pages_skip_checks() {
        assert_eq!(decide(None, LOGIN_PATH).page(), Page::Login);
        assert_eq!(decide(None, FORBIDDEN_PATH).page(), Page::Forbidden);
    }

    #[test]
    fn override_mode_can_narrow_access() {
        let mut u = user("operator");
        u.permissions = Some(vec!["users.read".into()]);
        let tree = default_menu();
        let routes = RouteTable::default();
        assert_eq!(guard(&tree, &routes, Some(&u), "/hosts", MergeMode::Union).page(), Page::Hosts);
        assert_eq!(
            guard(&tree, &routes, Some(&u), "/hosts", MergeMode::Override).page(),
            Page::Forbidden
        );
        assert_eq!(guard(&tree, &routes, Some(&u), "/users", MergeMode::Override).page(), Page::Users);
    }
}
