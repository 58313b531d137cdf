//! State published to the flux store. The presentation layer subscribes to
//! these paths and renders whatever it finds there.

use opsconsole_client::User;
use serde::Serialize;
use serde_json::Value;

use crate::breadcrumb::Crumb;
use crate::fetch::FetchState;
use crate::guard::Page;

/// Session state at `auth/user`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    pub busy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthState {
    pub const PATH: &'static str = "auth/user";

    pub fn signed_in(user: User) -> Self {
        Self {
            user: Some(user),
            busy: false,
            error: None,
        }
    }
}

/// Current location at `app/route`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteState {
    /// What was asked for.
    pub requested: String,
    /// Where the guard sent us.
    pub path: String,
    pub page: Page,
    /// Path to return to after login.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub breadcrumbs: Vec<Crumb>,
    pub layout: bool,
}

impl RouteState {
    pub const PATH: &'static str = "app/route";
}

/// Sidebar view lives at this path.
pub const SIDEBAR_PATH: &str = "nav/sidebar";

/// Active locale at `app/locale`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleState {
    pub locale: String,
    pub title: String,
}

impl LocaleState {
    pub const PATH: &'static str = "app/locale";
}

/// One remote resource at `resource/{name}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceState {
    pub resource: String,
    /// Log search keyword the data was loaded with.
    pub keyword: String,
    pub generation: u64,
    pub status: FetchState<Value>,
}

impl ResourceState {
    pub const PREFIX: &'static str = "resource/";

    pub fn path(resource: &str) -> String {
        format!("{}{}", Self::PREFIX, resource)
    }
}
