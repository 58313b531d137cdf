//! Fetch slots: the loading/loaded/failed lifecycle of one async request,
//! with stale responses discarded by generation.

use opsconsole_core::ConsoleError;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "camelCase")]
pub enum FetchState<T> {
    Idle,
    Loading,
    Loaded(T),
    Failed(FetchFailure),
}

/// Inline error shown in place of the data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchFailure {
    pub message: String,
    pub code: String,
    /// Offer a retry action.
    pub retryable: bool,
}

impl From<&ConsoleError> for FetchFailure {
    fn from(err: &ConsoleError) -> Self {
        Self {
            message: err.to_string(),
            code: err.error_code().to_string(),
            retryable: err.is_retryable(),
        }
    }
}

/// Handed out by [`FetchSlot::begin`]; only the newest ticket may complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct FetchSlot<T> {
    state: FetchState<T>,
    generation: u64,
}

impl<T> Default for FetchSlot<T> {
    fn default() -> Self {
        Self {
            state: FetchState::Idle,
            generation: 0,
        }
    }
}

impl<T> FetchSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FetchState<T> {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, FetchState::Loading)
    }

    /// Start a request. Any ticket issued earlier becomes stale.
    pub fn begin(&mut self) -> Ticket {
        self.generation += 1;
        self.state = FetchState::Loading;
        Ticket(self.generation)
    }

    /// Apply a result. Returns false, leaving the slot untouched, when the
    /// ticket is no longer current.
    pub fn complete(&mut self, ticket: Ticket, result: Result<T, ConsoleError>) -> bool {
        if ticket.0 != self.generation {
            warn!(
                "FetchSlot: discarding stale response (generation {}, current {})",
                ticket.0, self.generation
            );
            return false;
        }
        self.state = match result {
            Ok(value) => FetchState::Loaded(value),
            Err(e) => {
                debug!("FetchSlot: generation {} failed: {}", ticket.0, e);
                FetchState::Failed(FetchFailure::from(&e))
            }
        };
        true
    }

    /// Forget the current state. In-flight tickets become stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = FetchState::Idle;
    }

    /// Start over after a retryable failure. `None` if the slot isn't in a
    /// retryable failed state.
    pub fn retry(&mut self) -> Option<Ticket> {
        match &self.state {
            FetchState::Failed(f) if f.retryable => Some(self.begin()),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match &self.state {
            FetchState::Loaded(v) => Some(v),
            _ => None,
        }
    }
}
