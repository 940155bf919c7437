use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    Internal,
}

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Client-side failure taxonomy for remote fetches.
///
/// `Validation` is raised before a request leaves the client (malformed
/// parameters). `Network` covers transport failures including timeouts;
/// `Server` covers any non-2xx status, carrying the backend's message when
/// the error body was decodable.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid query parameters: {0}")]
    Validation(String),
    #[error("network failure: {source}")]
    Network {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },
    #[error("failed to decode server response: {source}")]
    Decode {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl FetchError {
    pub fn network(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        FetchError::Network {
            source: Box::new(source),
        }
    }

    pub fn decode(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        FetchError::Decode {
            source: Box::new(source),
        }
    }
}
