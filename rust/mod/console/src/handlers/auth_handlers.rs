//! Session handlers.

use std::sync::Arc;

use opsconsole_client::LoginRequest;
use opsconsole_flux::StateStore;
use tracing::{info, warn};

use super::app_handlers::{route_to, HOME_PATH};
use super::request::*;
use super::ConsoleContext;
use crate::guard::LOGIN_PATH;
use crate::role::normalize_role;
use crate::state::{ResourceState, RouteState};

/// Handle `auth/login`. On success, go back to where the guard bounced us
/// from, or home.
pub async fn handle_login(req: &LoginReq, store: &Arc<StateStore>, ctx: &ConsoleContext) {
    let session = ctx.session(store);
    let name = req.name.trim();
    if name.is_empty() {
        session.set_error("用户名不能为空");
        return;
    }
    session.set_busy();

    let request = LoginRequest {
        name: name.to_string(),
        role: normalize_role(&req.role).to_string(),
        permissions: req.permissions.clone(),
    };
    match ctx.api.login(request).await {
        Ok(env) => {
            let mut user = env.data;
            user.role = normalize_role(&user.role).to_string();
            info!("Login: {} as {}", user.name, user.role);
            session.set_user(Some(user));

            let target = store
                .get_as::<RouteState>(RouteState::PATH)
                .and_then(|r| r.from)
                .unwrap_or_else(|| HOME_PATH.to_string());
            route_to(&target, store, ctx);
        }
        Err(e) => {
            warn!("Login: {} failed: {}", name, e);
            session.set_error(e.to_string());
        }
    }
}

/// Handle `auth/logout`.
pub async fn handle_logout(store: &Arc<StateStore>, ctx: &ConsoleContext) {
    if let Some(user) = ctx.session(store).user() {
        info!("Logout: {}", user.name);
    }
    ctx.session(store).set_user(None);

    for (path, _) in store.scan(ResourceState::PREFIX) {
        store.remove(&path);
    }
    for slot in ctx.slots.lock().unwrap().values_mut() {
        slot.reset();
    }
    // remounts with fresh defaults at the next sign-in
    *ctx.sidebar.lock().unwrap() = None;

    route_to(LOGIN_PATH, store, ctx);
}

/// Handle `auth/switch-role`. Re-runs the guard for the current route.
pub async fn handle_switch_role(req: &SwitchRoleReq, store: &Arc<StateStore>, ctx: &ConsoleContext) {
    if !ctx.config.dev_role_switch {
        warn!("SwitchRole: disabled by configuration");
        return;
    }
    if ctx.session(store).switch_role(&req.role).is_none() {
        warn!("SwitchRole: nobody is signed in");
        return;
    }
    let requested = store
        .get_as::<RouteState>(RouteState::PATH)
        .map(|r| r.requested)
        .unwrap_or_else(|| HOME_PATH.to_string());
    route_to(&requested, store, ctx);
}
