use thiserror::Error;

// ── Error codes ─────────────────────────────────────────────────────
//
// Stable, machine-readable identifiers. Front-ends match on these,
// never on the human-readable message string.

/// Stable error code constants.
pub mod error_code {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";
    pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
    pub const FETCH_FAILED: &str = "FETCH_FAILED";
    pub const STORAGE_UNAVAILABLE: &str = "STORAGE_UNAVAILABLE";
    pub const CONFIG: &str = "CONFIG";
    pub const INTERNAL: &str = "INTERNAL";
}

// ── ConsoleError ────────────────────────────────────────────────────

/// Unified error type used across the console engine.
///
/// Only `Fetch` is ever shown to the user (as an inline, retryable error
/// state). Authorization outcomes are routing decisions, and storage
/// failures degrade silently, so those variants exist for logging and for
/// callers that want to report them explicitly.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsoleError {
    /// Requested resource or route does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Input data is invalid.
    #[error("{0}")]
    Validation(String),

    /// No user session.
    #[error("{0}")]
    Unauthenticated(String),

    /// Session exists but lacks the required permission.
    #[error("{0}")]
    PermissionDenied(String),

    /// Remote or mock data fetch failed.
    #[error("{0}")]
    Fetch(String),

    /// Local persistent store failed.
    #[error("{0}")]
    Storage(String),

    /// Configuration could not be read or parsed.
    #[error("{0}")]
    Config(String),

    /// Unexpected internal error.
    #[error("{0}")]
    Internal(String),
}

impl ConsoleError {
    /// Stable, machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            ConsoleError::NotFound(_) => error_code::NOT_FOUND,
            ConsoleError::Validation(_) => error_code::VALIDATION_FAILED,
            ConsoleError::Unauthenticated(_) => error_code::UNAUTHENTICATED,
            ConsoleError::PermissionDenied(_) => error_code::PERMISSION_DENIED,
            ConsoleError::Fetch(_) => error_code::FETCH_FAILED,
            ConsoleError::Storage(_) => error_code::STORAGE_UNAVAILABLE,
            ConsoleError::Config(_) => error_code::CONFIG,
            ConsoleError::Internal(_) => error_code::INTERNAL,
        }
    }

    /// Whether the front-end should offer a retry action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ConsoleError::Fetch(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_mapping() {
        assert_eq!(ConsoleError::NotFound("x".into()).error_code(), "NOT_FOUND");
        assert_eq!(ConsoleError::Validation("x".into()).error_code(), "VALIDATION_FAILED");
        assert_eq!(ConsoleError::Unauthenticated("x".into()).error_code(), "UNAUTHENTICATED");
        assert_eq!(ConsoleError::PermissionDenied("x".into()).error_code(), "PERMISSION_DENIED");
        assert_eq!(ConsoleError::Fetch("x".into()).error_code(), "FETCH_FAILED");
        assert_eq!(ConsoleError::Storage("x".into()).error_code(), "STORAGE_UNAVAILABLE");
        assert_eq!(ConsoleError::Config("x".into()).error_code(), "CONFIG");
        assert_eq!(ConsoleError::Internal("x".into()).error_code(), "INTERNAL");
    }

    #[test]
    fn only_fetch_failures_are_retryable() {
        assert!(ConsoleError::Fetch("timeout".into()).is_retryable());
        assert!(!ConsoleError::Storage("quota".into()).is_retryable());
        assert!(!ConsoleError::PermissionDenied("no".into()).is_retryable());
    }

    #[test]
    fn error_display_is_just_message() {
        assert_eq!(ConsoleError::Fetch("mock request failed".into()).to_string(), "mock request failed");
        assert_eq!(ConsoleError::NotFound("/nope".into()).to_string(), "/nope");
    }
}
