//! Permission model: the permission catalogue, static role policies and the
//! effective permission set of a user.
//!
//! Permission ids are namespaced `resource.action[.subresource]` strings.
//! The single token `*` grants everything.

use std::collections::BTreeSet;

use opsconsole_client::{Resource, User};

/// Grants every permission.
pub const WILDCARD: &str = "*";

pub const DASHBOARD_VIEW: &str = "dashboard.view";
pub const HOSTS_READ: &str = "hosts.read";
pub const HOSTS_CREATE: &str = "hosts.create";
pub const SERVICES_READ: &str = "services.read";
pub const SERVICES_ALERTS_READ: &str = "services.alerts.read";
pub const LOGS_READ: &str = "logs.read";
pub const LOGS_RULES_READ: &str = "logs.rules.read";
pub const USERS_READ: &str = "users.read";
pub const USERS_MANAGE: &str = "users.manage";
pub const ROLES_MANAGE: &str = "roles.manage";
pub const SETTINGS_READ: &str = "settings.read";
pub const SETTINGS_SECURITY_READ: &str = "settings.security.read";
pub const REPORTS_VIEW: &str = "reports.view";
pub const PROFILE_VIEW: &str = "profile.view";

/// Every permission in the catalogue.
pub const ALL: [&str; 14] = [
    DASHBOARD_VIEW,
    HOSTS_READ,
    HOSTS_CREATE,
    SERVICES_READ,
    SERVICES_ALERTS_READ,
    LOGS_READ,
    LOGS_RULES_READ,
    USERS_READ,
    USERS_MANAGE,
    ROLES_MANAGE,
    SETTINGS_READ,
    SETTINGS_SECURITY_READ,
    REPORTS_VIEW,
    PROFILE_VIEW,
];

/// Role → permission policy. Static for the life of the process.
pub fn role_policy(role: &str) -> &'static [&'static str] {
    match role {
        "admin" => &[WILDCARD],
        "auditor" => &[
            DASHBOARD_VIEW,
            SERVICES_READ,
            SERVICES_ALERTS_READ,
            LOGS_READ,
            LOGS_RULES_READ,
            REPORTS_VIEW,
            PROFILE_VIEW,
        ],
        "operator" => &[
            DASHBOARD_VIEW,
            HOSTS_READ,
            HOSTS_CREATE,
            SERVICES_READ,
            SERVICES_ALERTS_READ,
            LOGS_READ,
            PROFILE_VIEW,
        ],
        "viewer" => &[DASHBOARD_VIEW, PROFILE_VIEW],
        _ => &[],
    }
}

/// How a user's own permission list combines with the role policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergeMode {
    /// Role policy plus the user's list.
    #[default]
    Union,
    /// The user's list replaces the role policy when non-empty.
    Override,
}

/// A resolved set of permission ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet(BTreeSet<String>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The set that grants everything.
    pub fn all() -> Self {
        [WILDCARD].into_iter().collect()
    }

    pub fn grants_all(&self) -> bool {
        self.0.contains(WILDCARD)
    }

    /// Literal membership. Does not expand the wildcard.
    pub fn contains(&self, perm: &str) -> bool {
        self.0.contains(perm)
    }

    /// Membership with the wildcard taken into account.
    pub fn allows(&self, perm: &str) -> bool {
        self.grants_all() || self.contains(perm)
    }

    pub fn is_superset(&self, other: &PermissionSet) -> bool {
        self.0.is_superset(&other.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Permissions of a role's policy. Unknown or empty roles get nothing.
pub fn permissions_for_role(role: &str) -> PermissionSet {
    role_policy(role).iter().copied().collect()
}

/// The effective permission set of a user.
///
/// - no user: empty
/// - the user's own list contains `*`: everything, whatever the role
/// - [`MergeMode::Override`]: the user's list if non-empty, else the role's
/// - [`MergeMode::Union`]: role policy ∪ user's list
pub fn effective_permissions(user: Option<&User>, mode: MergeMode) -> PermissionSet {
    let Some(user) = user else {
        return PermissionSet::new();
    };
    let role_set = permissions_for_role(&user.role);
    let custom: PermissionSet = user.permissions.iter().flatten().cloned().collect();
    if custom.grants_all() {
        return PermissionSet::all();
    }
    match mode {
        MergeMode::Override if !custom.is_empty() => custom,
        MergeMode::Override => role_set,
        MergeMode::Union => role_set.0.into_iter().chain(custom.0).collect(),
    }
}

/// True when `required` is empty, the set grants everything, or any
/// required permission is present.
pub fn has_any<S: AsRef<str>>(perms: &PermissionSet, required: &[S]) -> bool {
    required.is_empty() || perms.grants_all() || required.iter().any(|r| perms.contains(r.as_ref()))
}

/// Like [`has_any`], but every required permission must be present.
pub fn has_all<S: AsRef<str>>(perms: &PermissionSet, required: &[S]) -> bool {
    required.is_empty() || perms.grants_all() || required.iter().all(|r| perms.contains(r.as_ref()))
}

/// Permission needed to load a resource's data.
pub fn resource_permission(resource: Resource) -> &'static str {
    match resource {
        Resource::Hosts => HOSTS_READ,
        Resource::Services => SERVICES_READ,
        Resource::Alerts => SERVICES_ALERTS_READ,
        Resource::Logs => LOGS_READ,
        Resource::LogRules => LOGS_RULES_READ,
        Resource::Users => USERS_READ,
        Resource::Roles => ROLES_MANAGE,
        Resource::Settings => SETTINGS_READ,
        Resource::SecuritySettings => SETTINGS_SECURITY_READ,
        Resource::Reports => REPORTS_VIEW,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str, perms: Option<&[&str]>) -> User {
        User {
            name: "alice".into(),
            email: None,
            role: role.into(),
            permissions: perms.map(|p| p.iter().map(|s| s.to_string()).collect()),
        }
    }

    const ROLES: [&str; 6] = ["admin", "auditor", "operator", "viewer", "ghost", ""];

    // ========================================================================
    // Role policies
    // ========================================================================

    #[test]
    fn unknown_role_has_nothing() {
        assert!(permissions_for_role("ghost").is_empty());
        assert!(permissions_for_role("").is_empty());
        assert!(permissions_for_role("admin").grants_all());
    }

    #[test]
    fn no_user_no_permissions() {
        assert!(effective_permissions(None, MergeMode::Union).is_empty());
        assert!(!has_any(&effective_permissions(None, MergeMode::Union), &[USERS_READ]));
    }

    #[test]
    fn policies_only_use_catalogue_ids() {
        for role in ROLES {
            for perm in role_policy(role) {
                assert!(*perm == WILDCARD || ALL.contains(perm), "{} in {}", perm, role);
            }
        }
    }

    // ========================================================================
    // Effective set
    // ========================================================================

    #[test]
    fn union_contains_role_and_custom() {
        let extras: [&[&str]; 4] = [&[], &[USERS_READ], &[REPORTS_VIEW, "custom.thing"], &[DASHBOARD_VIEW]];
        for role in ROLES {
            for extra in extras {
                let u = user(role, Some(extra));
                let eff = effective_permissions(Some(&u), MergeMode::Union);
                assert!(eff.is_superset(&permissions_for_role(role)));
                assert!(eff.is_superset(&extra.iter().copied().collect()));
            }
        }
    }

    #[test]
    fn wildcard_dominates_any_role() {
        for role in ROLES {
            for mode in [MergeMode::Union, MergeMode::Override] {
                let u = user(role, Some(&[USERS_READ, WILDCARD]));
                let eff = effective_permissions(Some(&u), mode);
                assert_eq!(eff, PermissionSet::all());
                assert!(has_all(&eff, &ALL));
            }
        }
    }

    #[test]
    fn override_takes_custom_or_falls_back_to_role() {
        let u = user("operator", Some(&[USERS_READ]));
        let eff = effective_permissions(Some(&u), MergeMode::Override);
        assert_eq!(eff, [USERS_READ].into_iter().collect::<PermissionSet>());
        assert!(!eff.contains(HOSTS_READ));

        let empty = user("operator", Some(&[]));
        assert_eq!(
            effective_permissions(Some(&empty), MergeMode::Override),
            permissions_for_role("operator")
        );
        let absent = user("operator", None);
        assert_eq!(
            effective_permissions(Some(&absent), MergeMode::Override),
            permissions_for_role("operator")
        );
    }

    // ========================================================================
    // Predicates
    // ========================================================================

    #[test]
    fn any_and_all() {
        let viewer = permissions_for_role("viewer");
        let none: [&str; 0] = [];
        assert!(has_any(&viewer, &none));
        assert!(has_all(&viewer, &none));
        assert!(has_any(&viewer, &[USERS_READ, DASHBOARD_VIEW]));
        assert!(!has_all(&viewer, &[USERS_READ, DASHBOARD_VIEW]));
        assert!(!has_any(&viewer, &[USERS_READ]));
        assert!(viewer.allows(PROFILE_VIEW));
        assert!(PermissionSet::all().allows(USERS_MANAGE));
    }

    #[test]
    fn resource_permissions_follow_role_policy() {
        let operator = permissions_for_role("operator");
        assert!(operator.allows(resource_permission(Resource::Hosts)));
        assert!(!operator.allows(resource_permission(Resource::Users)));
        assert!(!permissions_for_role("viewer").allows(resource_permission(Resource::Hosts)));
        let auditor = permissions_for_role("auditor");
        assert!(auditor.allows(resource_permission(Resource::LogRules)));
        for r in Resource::ALL {
            assert!(ALL.contains(&resource_permission(r)), "{}", r);
        }
    }
}
