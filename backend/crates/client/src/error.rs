//! Client Error Types

use kernel::error::{field::FieldError, kind::ErrorKind};
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// No response arrived: connection refused, DNS failure, timeout
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The server answered with an error envelope
    #[error("API error {status}: {message}")]
    Api {
        status: u16,
        message: String,
        errors: Vec<FieldError>,
    },

    /// A success response that did not carry the expected body
    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Network(_))
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Api { status: 401, .. })
    }

    /// Server-side kind of an API error; local failures count as internal
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Api { status, .. } => match status {
                401 => ErrorKind::Unauthenticated,
                403 => ErrorKind::Forbidden,
                404 => ErrorKind::NotFound,
                413 => ErrorKind::PayloadTooLarge,
                429 => ErrorKind::TooManyRequests,
                400..=499 => ErrorKind::Validation,
                _ => ErrorKind::Internal,
            },
            _ => ErrorKind::Internal,
        }
    }

    pub(crate) fn log(&self) {
        match self {
            ClientError::Network(e) => tracing::warn!(error = %e, "API unreachable"),
            ClientError::Api { status, message, .. } if *status >= 500 => {
                tracing::error!(status, message = %message, "API server error");
            }
            ClientError::Api { status, message, .. } => {
                tracing::debug!(status, message = %message, "API rejected request");
            }
            other => tracing::error!(error = %other, "Client error"),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> ClientError {
        ClientError::Api {
            status,
            message: "nope".to_string(),
            errors: Vec::new(),
        }
    }

    #[test]
    fn test_status_maps_to_kind() {
        assert_eq!(api(401).kind(), ErrorKind::Unauthenticated);
        assert_eq!(api(403).kind(), ErrorKind::Forbidden);
        assert_eq!(api(400).kind(), ErrorKind::Validation);
        assert_eq!(api(503).kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_only_401_is_unauthorized() {
        assert!(api(401).is_unauthorized());
        assert!(!api(403).is_unauthorized());
        assert!(!ClientError::Decode("x".to_string()).is_unauthorized());
    }
}
