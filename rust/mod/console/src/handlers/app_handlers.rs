//! Routing, locale and sidebar handlers.

use std::sync::Arc;

use opsconsole_flux::{StateStore, Translate};
use tracing::{debug, info, warn};

use super::request::*;
use super::ConsoleContext;
use crate::breadcrumb::breadcrumbs;
use crate::guard::{guard, GuardDecision, LOGIN_PATH};
use crate::nav::{filter_menu, Sidebar};
use crate::state::{LocaleState, RouteState, SIDEBAR_PATH};

/// Local store key for the chosen locale.
pub const LOCALE_KEY: &str = "app.locale";
pub const HOME_PATH: &str = "/";

/// Handle `app/initialize`.
pub async fn handle_initialize(req: &InitializeReq, store: &Arc<StateStore>, ctx: &ConsoleContext) {
    let known = ctx.i18n.locales();
    if let Some(saved) = ctx.local.get(LOCALE_KEY) {
        if known.contains(&saved) {
            ctx.i18n.set_locale(&saved);
        } else {
            debug!("Initialize: ignoring saved locale {}", saved);
        }
    }
    publish_locale(store, ctx);

    ctx.session(store).hydrate();
    let path = req.path.as_deref().unwrap_or(HOME_PATH);
    route_to(path, store, ctx);
}

/// Handle `app/navigate`.
pub async fn handle_navigate(req: &NavigateReq, store: &Arc<StateStore>, ctx: &ConsoleContext) {
    route_to(&req.path, store, ctx);
}

/// Handle `sidebar/toggle`.
pub async fn handle_sidebar_toggle(
    req: &SidebarToggleReq,
    store: &Arc<StateStore>,
    ctx: &ConsoleContext,
) {
    if !ctx.menu.find_by_key(&req.key).is_some_and(|e| e.path.is_none()) {
        warn!("Sidebar: {} is not a category", req.key);
        return;
    }
    let toggled = match ctx.sidebar.lock().unwrap().as_mut() {
        Some(sidebar) => {
            sidebar.toggle_category(&req.key);
            true
        }
        None => false,
    };
    if toggled {
        publish_sidebar(store, ctx);
    } else {
        warn!("Sidebar: toggle {} outside the layout", req.key);
    }
}

/// Handle `sidebar/collapse`.
pub async fn handle_sidebar_collapse(
    req: &SidebarCollapseReq,
    store: &Arc<StateStore>,
    ctx: &ConsoleContext,
) {
    let changed = match ctx.sidebar.lock().unwrap().as_mut() {
        Some(sidebar) => {
            match req.collapsed {
                Some(c) => sidebar.set_collapsed(c),
                None => {
                    sidebar.toggle_collapsed();
                }
            }
            true
        }
        None => false,
    };
    if changed {
        publish_sidebar(store, ctx);
    }
}

/// Handle `locale/set`. Unknown locales are ignored.
pub async fn handle_set_locale(req: &SetLocaleReq, store: &Arc<StateStore>, ctx: &ConsoleContext) {
    if !ctx.i18n.locales().contains(&req.locale) {
        warn!("Locale: {} has no dictionary", req.locale);
        return;
    }
    ctx.i18n.set_locale(&req.locale);
    ctx.local.set(LOCALE_KEY, &req.locale);
    publish_locale(store, ctx);

    // labels in the breadcrumbs and sidebar follow the locale
    if let Some(route) = store.get_as::<RouteState>(RouteState::PATH) {
        route_to(&route.requested, store, ctx);
    }
}

// ====================================================================
// Shared
// ====================================================================

/// Run the guard for `path` and publish the outcome.
pub(crate) fn route_to(path: &str, store: &Arc<StateStore>, ctx: &ConsoleContext) -> RouteState {
    let user = ctx.session(store).user();
    // the login page is pointless with a session
    let path = if user.is_some() && path == LOGIN_PATH {
        HOME_PATH
    } else {
        path
    };

    let decision = guard(&ctx.menu, &ctx.routes, user.as_ref(), path, ctx.mode);
    let page = decision.page();
    let target = decision.target().to_string();
    let from = match &decision {
        GuardDecision::Unauthenticated { from } => Some(from.clone()),
        _ => None,
    };
    let layout = page.uses_layout();
    let crumbs = if layout {
        breadcrumbs(&ctx.menu, &target, ctx.i18n.as_ref())
    } else {
        Vec::new()
    };

    let route = RouteState {
        requested: path.to_string(),
        path: target,
        page,
        from,
        breadcrumbs: crumbs,
        layout,
    };
    info!("Route: {} -> {} ({:?})", route.requested, route.path, route.page);
    store.set(RouteState::PATH, route.clone());

    if layout {
        publish_sidebar(store, ctx);
    } else {
        store.remove(SIDEBAR_PATH);
    }
    route
}

/// Recompute the sidebar for the current route, mounting it on first use.
pub(crate) fn publish_sidebar(store: &Arc<StateStore>, ctx: &ConsoleContext) {
    let Some(route) = store.get_as::<RouteState>(RouteState::PATH) else {
        return;
    };
    if !route.layout {
        return;
    }
    let perms = ctx.session(store).permissions(ctx.mode);
    let view = {
        let mut slot = ctx.sidebar.lock().unwrap();
        let sidebar = slot.get_or_insert_with(|| {
            let visible = filter_menu(ctx.menu.roots(), &perms);
            Sidebar::mount(ctx.local.clone(), &ctx.menu, &visible, &route.path)
        });
        sidebar.view(&ctx.menu, &perms, &route.path, ctx.i18n.as_ref())
    };
    store.set(SIDEBAR_PATH, view);
}

pub(crate) fn publish_locale(store: &StateStore, ctx: &ConsoleContext) {
    store.set(
        LocaleState::PATH,
        LocaleState {
            locale: ctx.i18n.locale(),
            title: ctx.i18n.translate("app.title", None),
        },
    );
}
