//! Requests the presentation layer emits.

/// Restore the session and locale, then route to `path` (`/` if unset).
#[derive(Debug, Clone, Default)]
pub struct InitializeReq {
    pub path: Option<String>,
}

impl InitializeReq {
    pub const PATH: &'static str = "app/initialize";
}

/// Sign in. `role` may be a code or a localized label.
#[derive(Debug, Clone)]
pub struct LoginReq {
    pub name: String,
    pub role: String,
    pub permissions: Option<Vec<String>>,
}

impl LoginReq {
    pub const PATH: &'static str = "auth/login";
}

/// Sign out and drop every loaded resource.
#[derive(Debug, Clone)]
pub struct LogoutReq;

impl LogoutReq {
    pub const PATH: &'static str = "auth/logout";
}

/// Development role switch from the header.
#[derive(Debug, Clone)]
pub struct SwitchRoleReq {
    pub role: String,
}

impl SwitchRoleReq {
    pub const PATH: &'static str = "auth/switch-role";
}

#[derive(Debug, Clone)]
pub struct NavigateReq {
    pub path: String,
}

impl NavigateReq {
    pub const PATH: &'static str = "app/navigate";
}

/// Open or close a sidebar category.
#[derive(Debug, Clone)]
pub struct SidebarToggleReq {
    pub key: String,
}

impl SidebarToggleReq {
    pub const PATH: &'static str = "sidebar/toggle";
}

/// Collapse or expand the sidebar. `None` flips it.
#[derive(Debug, Clone, Default)]
pub struct SidebarCollapseReq {
    pub collapsed: Option<bool>,
}

impl SidebarCollapseReq {
    pub const PATH: &'static str = "sidebar/collapse";
}

#[derive(Debug, Clone)]
pub struct SetLocaleReq {
    pub locale: String,
}

impl SetLocaleReq {
    pub const PATH: &'static str = "locale/set";
}

/// Load a resource by name. With `retry`, only reloads a resource whose
/// last load failed retryably, reusing its keyword.
#[derive(Debug, Clone, Default)]
pub struct LoadResourceReq {
    pub resource: String,
    pub keyword: String,
    pub retry: bool,
}

impl LoadResourceReq {
    pub const PATH: &'static str = "resource/load";
}
