use dashboard_core::FetchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure, or a body that could not be read or decoded
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status; `detail` is the service's error explanation, if any
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        detail: Option<String>,
    },
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl From<ClientError> for FetchError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Http(e) if e.is_timeout() => FetchError::Timeout,
            ClientError::Http(e) => match e.status() {
                Some(status) => FetchError::from_status(status.as_u16(), None),
                None if e.is_decode() || e.is_body() => FetchError::unexpected(e.to_string()),
                None => FetchError::NetworkUnavailable,
            },
            ClientError::Api { status, detail, .. } => FetchError::from_status(status, detail),
        }
    }
}
