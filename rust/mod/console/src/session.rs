//! The signed-in user.
//!
//! The user lives in the flux store at [`AuthState::PATH`] and is mirrored
//! to the local store under [`SESSION_KEY`]. It is hydrated once at startup
//! and changed only through [`Session::set_user`].

use std::sync::Arc;

use opsconsole_client::User;
use opsconsole_flux::StateStore;
use opsconsole_kv::LocalStore;
use tracing::{debug, info};

use crate::permission::{effective_permissions, MergeMode, PermissionSet};
use crate::role::normalize_role;
use crate::state::AuthState;

/// Local store key holding the serialized user.
pub const SESSION_KEY: &str = "app_user";

#[derive(Clone)]
pub struct Session {
    store: Arc<StateStore>,
    local: LocalStore,
}

impl Session {
    pub fn new(store: Arc<StateStore>, local: LocalStore) -> Self {
        Self { store, local }
    }

    /// Load the persisted user into state. Malformed data means no session.
    pub fn hydrate(&self) -> Option<User> {
        let user = self.local.get_json::<User>(SESSION_KEY);
        match &user {
            Some(u) => info!("Session: restored {} ({})", u.name, u.role),
            None => debug!("Session: nothing to restore"),
        }
        self.store.set(
            AuthState::PATH,
            AuthState {
                user: user.clone(),
                ..AuthState::default()
            },
        );
        user
    }

    pub fn state(&self) -> AuthState {
        self.store
            .get_as::<AuthState>(AuthState::PATH)
            .unwrap_or_default()
    }

    pub fn user(&self) -> Option<User> {
        self.state().user
    }

    pub fn is_signed_in(&self) -> bool {
        self.user().is_some()
    }

    /// Replace the user. `None` signs out and removes the persisted copy.
    pub fn set_user(&self, user: Option<User>) {
        match &user {
            Some(u) => self.local.set_json(SESSION_KEY, u),
            None => self.local.remove(SESSION_KEY),
        }
        self.store.set(
            AuthState::PATH,
            AuthState {
                user,
                ..AuthState::default()
            },
        );
    }

    /// Mark a sign-in as in flight, keeping whatever user is present.
    pub fn set_busy(&self) {
        let mut state = self.state();
        state.busy = true;
        state.error = None;
        self.store.set(AuthState::PATH, state);
    }

    pub fn set_error(&self, message: impl Into<String>) {
        let mut state = self.state();
        state.busy = false;
        state.error = Some(message.into());
        self.store.set(AuthState::PATH, state);
    }

    /// Swap the current user's role. Returns the updated user, or `None`
    /// when nobody is signed in.
    pub fn switch_role(&self, role: &str) -> Option<User> {
        let mut user = self.user()?;
        user.role = normalize_role(role).to_string();
        info!("Session: {} switched to {}", user.name, user.role);
        self.set_user(Some(user.clone()));
        Some(user)
    }

    pub fn permissions(&self, mode: MergeMode) -> PermissionSet {
        effective_permissions(self.user().as_ref(), mode)
    }
}
