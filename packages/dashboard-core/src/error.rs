//! Typed errors for data acquisition.
//!
//! Every failure of a data source is classified into one `FetchError`
//! variant. The `Display` text is the message shown to the user.

use thiserror::Error;

/// Why a data source could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The fetch lost its race against the per-source timeout
    #[error("Request timeout")]
    Timeout,

    /// The service could not be reached at all
    #[error("Network error. Please check if the backend server is running.")]
    NetworkUnavailable,

    /// The service answered with a 5xx status
    #[error("Internal server error. Please try again later.")]
    ServerError { status: u16 },

    /// The endpoint does not exist (404)
    #[error("Endpoint not found. Please check the API configuration.")]
    NotFound,

    /// Any other status or a payload that could not be decoded
    #[error("{}", .detail.as_deref().unwrap_or("An unexpected error occurred"))]
    Unexpected { detail: Option<String> },
}

impl FetchError {
    /// Classify an HTTP status code with an optional server-provided detail.
    pub fn from_status(status: u16, detail: Option<String>) -> Self {
        match status {
            404 => FetchError::NotFound,
            500..=599 => FetchError::ServerError { status },
            _ => FetchError::Unexpected {
                detail: detail.filter(|d| !d.trim().is_empty()),
            },
        }
    }

    pub fn unexpected(detail: impl Into<String>) -> Self {
        FetchError::Unexpected {
            detail: Some(detail.into()),
        }
    }

    /// Short machine-friendly category name, used in logs.
    pub fn category(&self) -> &'static str {
        match self {
            FetchError::Timeout => "timeout",
            FetchError::NetworkUnavailable => "network_unavailable",
            FetchError::ServerError { .. } => "server_error",
            FetchError::NotFound => "not_found",
            FetchError::Unexpected { .. } => "unexpected",
        }
    }
}

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(FetchError::from_status(404, None), FetchError::NotFound);
        assert_eq!(
            FetchError::from_status(500, Some("boom".into())),
            FetchError::ServerError { status: 500 }
        );
        assert_eq!(
            FetchError::from_status(503, None),
            FetchError::ServerError { status: 503 }
        );
        assert_eq!(
            FetchError::from_status(422, Some("Invalid filter".into())),
            FetchError::unexpected("Invalid filter")
        );
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(FetchError::Timeout.to_string(), "Request timeout");
        assert_eq!(
            FetchError::NotFound.to_string(),
            "Endpoint not found. Please check the API configuration."
        );
        assert_eq!(
            FetchError::unexpected("Resource with ID 9 not found").to_string(),
            "Resource with ID 9 not found"
        );
        assert_eq!(
            FetchError::from_status(418, Some("   ".into())).to_string(),
            "An unexpected error occurred"
        );
    }
}
