//! Resource loading with stale-response protection.

use std::sync::Arc;

use opsconsole_client::{fetch_resource, Resource};
use opsconsole_core::ConsoleError;
use opsconsole_flux::StateStore;
use tracing::{debug, warn};

use super::request::*;
use super::ConsoleContext;
use crate::fetch::{FetchSlot, Ticket};
use crate::permission::resource_permission;
use crate::state::ResourceState;

/// Handle `resource/load`.
///
/// The user must hold the resource's permission; a denial is published as
/// a non-retryable failure. Each load takes a fresh ticket, so a slow
/// response that lands after a newer load started is dropped.
pub async fn handle_load_resource(
    req: &LoadResourceReq,
    store: &Arc<StateStore>,
    ctx: &ConsoleContext,
) {
    let resource = match req.resource.parse::<Resource>() {
        Ok(r) => r,
        Err(e) => {
            warn!("LoadResource: {}", e);
            return;
        }
    };
    let path = ResourceState::path(resource.name());
    let keyword = if req.retry {
        store
            .get_as::<ResourceState>(&path)
            .map(|s| s.keyword)
            .unwrap_or_default()
    } else {
        req.keyword.clone()
    };

    let needed = resource_permission(resource);
    if !ctx.session(store).permissions(ctx.mode).allows(needed) {
        let denied = ConsoleError::PermissionDenied(format!("missing permission {}", needed));
        let state = {
            let mut slots = ctx.slots.lock().unwrap();
            let slot = slots.entry(resource).or_default();
            let ticket = slot.begin();
            slot.complete(ticket, Err(denied));
            snapshot(resource, &keyword, slot)
        };
        store.set(&path, state);
        return;
    }

    let started = {
        let mut slots = ctx.slots.lock().unwrap();
        let slot = slots.entry(resource).or_default();
        let ticket = if req.retry { slot.retry() } else { Some(slot.begin()) };
        ticket.map(|t| (t, snapshot(resource, &keyword, slot)))
    };
    let Some((ticket, loading)) = started else {
        debug!("LoadResource: {} has nothing to retry", resource);
        return;
    };
    store.set(&path, loading);

    let result = fetch_resource(ctx.api.as_ref(), resource, &keyword)
        .await
        .map_err(ConsoleError::from);

    if let Some(state) = finish(ctx, resource, &keyword, ticket, result) {
        store.set(&path, state);
    }
}

fn finish(
    ctx: &ConsoleContext,
    resource: Resource,
    keyword: &str,
    ticket: Ticket,
    result: Result<serde_json::Value, ConsoleError>,
) -> Option<ResourceState> {
    let mut slots = ctx.slots.lock().unwrap();
    let slot = slots.get_mut(&resource)?;
    if !slot.complete(ticket, result) {
        return None;
    }
    Some(snapshot(resource, keyword, slot))
}

fn snapshot(resource: Resource, keyword: &str, slot: &FetchSlot<serde_json::Value>) -> ResourceState {
    ResourceState {
        resource: resource.name().to_string(),
        keyword: keyword.to_string(),
        generation: slot.generation(),
        status: slot.state().clone(),
    }
}
