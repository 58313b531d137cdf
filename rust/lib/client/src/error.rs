use opsconsole_core::ConsoleError;

/// Data-fetch failure.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error("decode: {0}")]
    Decode(String),

    #[error("mock: {0}")]
    Mock(String),
}

impl From<ApiError> for ConsoleError {
    fn from(e: ApiError) -> Self {
        ConsoleError::Fetch(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_become_retryable_fetch_errors() {
        let err: ConsoleError = ApiError::Server {
            status: 502,
            message: "bad gateway".into(),
        }
        .into();
        assert_eq!(err, ConsoleError::Fetch("HTTP 502: bad gateway".into()));
        assert!(err.is_retryable());

        let err: ConsoleError = ApiError::Mock("request failed".into()).into();
        assert_eq!(err.to_string(), "mock: request failed");
    }
}
