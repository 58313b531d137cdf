//! Request handlers and their Flux wiring.
//!
//! `register_handlers` binds every request path to its handler: the payload
//! is downcast to the typed request and the handler gets the store plus the
//! shared [`ConsoleContext`].

pub mod app_handlers;
pub mod auth_handlers;
pub mod request;
pub mod resource_handlers;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use opsconsole_client::{ConsoleApi, Resource};
use opsconsole_core::ConsoleConfig;
use opsconsole_flux::{Flux, Payload, StateStore, Translator};
use opsconsole_kv::LocalStore;
use serde_json::Value;
use tracing::warn;

use crate::fetch::FetchSlot;
use crate::guard::RouteTable;
use crate::menu::MenuTree;
use crate::nav::Sidebar;
use crate::permission::MergeMode;
use crate::session::Session;

pub use app_handlers::{HOME_PATH, LOCALE_KEY};
pub use request::*;

/// Everything the handlers share.
pub struct ConsoleContext {
    pub api: Arc<dyn ConsoleApi>,
    pub local: LocalStore,
    pub config: ConsoleConfig,
    pub menu: MenuTree,
    pub routes: RouteTable,
    pub i18n: Arc<Translator>,
    pub mode: MergeMode,
    /// Mounted when the layout first renders, dropped at logout.
    pub(crate) sidebar: Mutex<Option<Sidebar>>,
    pub(crate) slots: Mutex<HashMap<Resource, FetchSlot<Value>>>,
}

impl ConsoleContext {
    pub fn new(
        api: Arc<dyn ConsoleApi>,
        local: LocalStore,
        config: ConsoleConfig,
        menu: MenuTree,
        i18n: Arc<Translator>,
    ) -> Self {
        Self {
            api,
            local,
            config,
            menu,
            routes: RouteTable::default(),
            i18n,
            mode: MergeMode::Union,
            sidebar: Mutex::new(None),
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn session(&self, store: &Arc<StateStore>) -> Session {
        Session::new(Arc::clone(store), self.local.clone())
    }
}

fn typed<T: 'static>(path: &str, payload: &Payload) -> Option<T>
where
    T: Clone,
{
    let req = payload.downcast_ref::<T>().cloned();
    if req.is_none() {
        warn!("{}: unexpected payload type", path);
    }
    req
}

/// Register all handlers with a Flux instance.
pub fn register_handlers(flux: &Flux, ctx: Arc<ConsoleContext>) {
    // app/initialize
    {
        let ctx = ctx.clone();
        flux.on(InitializeReq::PATH, move |path, payload, store: Arc<StateStore>| {
            let ctx = ctx.clone();
            async move {
                if let Some(req) = typed::<InitializeReq>(&path, &payload) {
                    app_handlers::handle_initialize(&req, &store, &ctx).await;
                }
            }
        });
    }

    // app/navigate
    {
        let ctx = ctx.clone();
        flux.on(NavigateReq::PATH, move |path, payload, store: Arc<StateStore>| {
            let ctx = ctx.clone();
            async move {
                if let Some(req) = typed::<NavigateReq>(&path, &payload) {
                    app_handlers::handle_navigate(&req, &store, &ctx).await;
                }
            }
        });
    }

    // auth/login
    {
        let ctx = ctx.clone();
        flux.on(LoginReq::PATH, move |path, payload, store: Arc<StateStore>| {
            let ctx = ctx.clone();
            async move {
                if let Some(req) = typed::<LoginReq>(&path, &payload) {
                    auth_handlers::handle_login(&req, &store, &ctx).await;
                }
            }
        });
    }

    // auth/logout
    {
        let ctx = ctx.clone();
        flux.on(LogoutReq::PATH, move |_, _, store: Arc<StateStore>| {
            let ctx = ctx.clone();
            async move {
                auth_handlers::handle_logout(&store, &ctx).await;
            }
        });
    }

    // auth/switch-role
    {
        let ctx = ctx.clone();
        flux.on(SwitchRoleReq::PATH, move |path, payload, store: Arc<StateStore>| {
            let ctx = ctx.clone();
            async move {
                if let Some(req) = typed::<SwitchRoleReq>(&path, &payload) {
                    auth_handlers::handle_switch_role(&req, &store, &ctx).await;
                }
            }
        });
    }

    // sidebar/toggle
    {
        let ctx = ctx.clone();
        flux.on(SidebarToggleReq::PATH, move |path, payload, store: Arc<StateStore>| {
            let ctx = ctx.clone();
            async move {
                if let Some(req) = typed::<SidebarToggleReq>(&path, &payload) {
                    app_handlers::handle_sidebar_toggle(&req, &store, &ctx).await;
                }
            }
        });
    }

    // sidebar/collapse
    {
        let ctx = ctx.clone();
        flux.on(SidebarCollapseReq::PATH, move |path, payload, store: Arc<StateStore>| {
            let ctx = ctx.clone();
            async move {
                if let Some(req) = typed::<SidebarCollapseReq>(&path, &payload) {
                    app_handlers::handle_sidebar_collapse(&req, &store, &ctx).await;
                }
            }
        });
    }

    // locale/set
    {
        let ctx = ctx.clone();
        flux.on(SetLocaleReq::PATH, move |path, payload, store: Arc<StateStore>| {
            let ctx = ctx.clone();
            async move {
                if let Some(req) = typed::<SetLocaleReq>(&path, &payload) {
                    app_handlers::handle_set_locale(&req, &store, &ctx).await;
                }
            }
        });
    }

    // resource/load
    flux.on(LoadResourceReq::PATH, move |path, payload, store: Arc<StateStore>| {
        let ctx = ctx.clone();
        async move {
            if let Some(req) = typed::<LoadResourceReq>(&path, &payload) {
                resource_handlers::handle_load_resource(&req, &store, &ctx).await;
            }
        }
    });
}
