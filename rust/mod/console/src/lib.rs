//! Ops console engine.
//!
//! Everything an operations admin console decides lives here: who is
//! signed in and what they may do, which menu entries they see, whether a
//! navigation renders or bounces, and how each resource list loads, sorts,
//! pages and exports. The presentation layer emits requests through
//! [`Console`] (or directly on its [`Flux`]) and renders the state paths:
//!
//! | path | state |
//! |------|-------|
//! | `auth/user` | [`AuthState`] |
//! | `app/route` | [`RouteState`] |
//! | `nav/sidebar` | [`SidebarView`] |
//! | `app/locale` | [`LocaleState`] |
//! | `resource/{name}` | [`ResourceState`] |

pub mod boundary;
pub mod breadcrumb;
pub mod fetch;
pub mod guard;
pub mod handlers;
pub mod i18n_strings;
pub mod menu;
pub mod nav;
pub mod permission;
pub mod role;
pub mod schemas;
pub mod session;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use opsconsole_client::{ConsoleApi, HttpApi, MockApi, Resource, User};
use opsconsole_core::{ConsoleConfig, ConsoleError};
use opsconsole_flux::{Flux, Translator};
use opsconsole_kv::{LocalStore, RedbStore};
use opsconsole_table::{
    DataTable, ExportOptions, TableOptions, VisibilityOptions, DEFAULT_STORAGE_KEY,
};
use serde_json::Value;
use tracing::info;

pub use boundary::{ErrorBoundary, ErrorPanel};
pub use breadcrumb::{breadcrumbs, Crumb};
pub use fetch::{FetchFailure, FetchSlot, FetchState, Ticket};
pub use guard::{guard, GuardDecision, Page, RouteTable, FORBIDDEN_PATH, LOGIN_PATH};
pub use handlers::{register_handlers, ConsoleContext};
pub use menu::{default_menu, FlatEntry, MenuIcon, MenuNode, MenuTree};
pub use nav::{filter_menu, NavItem, Sidebar, SidebarView};
pub use permission::{effective_permissions, has_all, has_any, MergeMode, PermissionSet};
pub use role::{normalize_role, role_label};
pub use session::{Session, SESSION_KEY};
pub use state::{AuthState, LocaleState, ResourceState, RouteState, SIDEBAR_PATH};

use handlers::request::{
    InitializeReq, LoadResourceReq, LoginReq, LogoutReq, NavigateReq, SetLocaleReq,
    SidebarCollapseReq, SidebarToggleReq, SwitchRoleReq,
};

/// A running console: the state engine with every handler registered.
pub struct Console {
    flux: Flux,
    ctx: Arc<ConsoleContext>,
}

impl Console {
    /// Console over the default menu.
    pub fn new(config: ConsoleConfig, api: Arc<dyn ConsoleApi>, local: LocalStore) -> Self {
        Self::with_menu(config, api, local, MenuTree::default())
    }

    pub fn with_menu(
        config: ConsoleConfig,
        api: Arc<dyn ConsoleApi>,
        local: LocalStore,
        menu: MenuTree,
    ) -> Self {
        let i18n = Arc::new(Translator::new(&config.locale));
        i18n_strings::register_all(&i18n);
        let ctx = Arc::new(ConsoleContext::new(api, local, config, menu, i18n));
        let flux = Flux::new();
        register_handlers(&flux, ctx.clone());
        Self { flux, ctx }
    }

    /// Build from configuration: the mock or HTTP backend, and a redb file
    /// for local state.
    pub fn from_config(config: ConsoleConfig) -> Result<Self, ConsoleError> {
        let api: Arc<dyn ConsoleApi> = if config.use_mock {
            Arc::new(MockApi::new(Duration::from_millis(config.mock_delay_ms)))
        } else {
            Arc::new(HttpApi::new(config.api_base_url.clone()))
        };
        let db_path = config.resolve_db_path();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConsoleError::Storage(format!("{}: {}", parent.display(), e)))?;
        }
        let kv = RedbStore::open(&db_path).map_err(|e| ConsoleError::Storage(e.to_string()))?;
        info!(
            "Console: {} backend, state in {}",
            if config.use_mock { "mock" } else { "http" },
            db_path.display()
        );
        Ok(Self::new(config, api, LocalStore::new(Arc::new(kv))))
    }

    pub fn flux(&self) -> &Flux {
        &self.flux
    }

    pub fn context(&self) -> &ConsoleContext {
        &self.ctx
    }

    pub fn i18n(&self) -> &Translator {
        &self.ctx.i18n
    }

    // ====================================================================
    // Requests
    // ====================================================================

    pub async fn initialize(&self, path: Option<&str>) {
        let req = InitializeReq {
            path: path.map(str::to_string),
        };
        self.flux.emit(InitializeReq::PATH, req).await;
    }

    pub async fn navigate(&self, path: &str) {
        let req = NavigateReq {
            path: path.to_string(),
        };
        self.flux.emit(NavigateReq::PATH, req).await;
    }

    pub async fn login(&self, name: &str, role: &str, permissions: Option<Vec<String>>) {
        let req = LoginReq {
            name: name.to_string(),
            role: role.to_string(),
            permissions,
        };
        self.flux.emit(LoginReq::PATH, req).await;
    }

    pub async fn logout(&self) {
        self.flux.emit(LogoutReq::PATH, LogoutReq).await;
    }

    pub async fn switch_role(&self, role: &str) {
        let req = SwitchRoleReq {
            role: role.to_string(),
        };
        self.flux.emit(SwitchRoleReq::PATH, req).await;
    }

    pub async fn toggle_category(&self, key: &str) {
        let req = SidebarToggleReq {
            key: key.to_string(),
        };
        self.flux.emit(SidebarToggleReq::PATH, req).await;
    }

    /// `None` flips the current state.
    pub async fn set_collapsed(&self, collapsed: Option<bool>) {
        self.flux
            .emit(SidebarCollapseReq::PATH, SidebarCollapseReq { collapsed })
            .await;
    }

    pub async fn set_locale(&self, locale: &str) {
        let req = SetLocaleReq {
            locale: locale.to_string(),
        };
        self.flux.emit(SetLocaleReq::PATH, req).await;
    }

    pub async fn load(&self, resource: Resource, keyword: &str) {
        let req = LoadResourceReq {
            resource: resource.name().to_string(),
            keyword: keyword.to_string(),
            retry: false,
        };
        self.flux.emit(LoadResourceReq::PATH, req).await;
    }

    /// Reload a resource whose last load failed retryably.
    pub async fn retry(&self, resource: Resource) {
        let req = LoadResourceReq {
            resource: resource.name().to_string(),
            retry: true,
            ..LoadResourceReq::default()
        };
        self.flux.emit(LoadResourceReq::PATH, req).await;
    }

    // ====================================================================
    // State
    // ====================================================================

    pub fn auth(&self) -> AuthState {
        self.flux
            .get_as::<AuthState>(AuthState::PATH)
            .unwrap_or_default()
    }

    pub fn user(&self) -> Option<User> {
        self.auth().user
    }

    pub fn permissions(&self) -> PermissionSet {
        effective_permissions(self.user().as_ref(), self.ctx.mode)
    }

    pub fn route(&self) -> Option<RouteState> {
        self.flux.get_as::<RouteState>(RouteState::PATH)
    }

    pub fn sidebar(&self) -> Option<SidebarView> {
        self.flux.get_as::<SidebarView>(SIDEBAR_PATH)
    }

    pub fn locale(&self) -> Option<LocaleState> {
        self.flux.get_as::<LocaleState>(LocaleState::PATH)
    }

    pub fn resource(&self, resource: Resource) -> Option<ResourceState> {
        self.flux
            .get_as::<ResourceState>(&ResourceState::path(resource.name()))
    }

    /// A table over a loaded list resource, with its schema, paging, sort,
    /// selection, export and persisted column visibility. Rows are empty
    /// until the resource has loaded. `None` for single-record resources.
    pub fn table(&self, resource: Resource) -> Option<DataTable<Value>> {
        let columns = schemas::columns_for(resource)?;
        let mut options = TableOptions::default()
            .page_size(schemas::page_size_for(resource, self.ctx.config.page_size))
            .selectable()
            .empty_text(schemas::empty_text_for(resource))
            .export(ExportOptions::default().prefix(resource.name()))
            .visibility(
                VisibilityOptions::new(self.ctx.local.clone())
                    .storage_key(format!("{}.{}", DEFAULT_STORAGE_KEY, resource.name())),
            );
        if let Some(sort) = schemas::initial_sort_for(resource) {
            options = options.initial_sort(sort);
        }

        let rows = match self.resource(resource).map(|s| s.status) {
            Some(FetchState::Loaded(Value::Array(rows))) => rows,
            _ => Vec::new(),
        };
        let mut table = DataTable::new(columns, options);
        table.set_data(rows);
        Some(table)
    }
}
