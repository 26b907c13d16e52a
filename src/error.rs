//! Unified SDK error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Top-level SDK error.
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl SdkError {
    /// The session is gone and the user must log in again.
    pub fn is_session_terminated(&self) -> bool {
        matches!(self, SdkError::Auth(AuthError::SessionTerminated(_)))
    }

    /// Raised client-side; nothing was sent to the server.
    pub fn is_validation(&self) -> bool {
        matches!(self, SdkError::Validation(_))
    }
}

/// HTTP-layer errors.
#[derive(Error, Debug)]
pub enum HttpError {
    #[cfg(feature = "http")]
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Server error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Timeout")]
    Timeout,

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

/// Authentication errors.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Login failed: {0}")]
    LoginFailed(String),

    #[error("Session terminated: {0}")]
    SessionTerminated(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

/// Client-side validation failures. Never sent to the server.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid amount {amount}: must be greater than 0 and at most {available}")]
    InvalidAmount { amount: Decimal, available: Decimal },

    #[error("Invalid price {0}: must be greater than 0")]
    InvalidPrice(Decimal),

    #[error("Transaction cannot be cancelled in status {status}")]
    NotCancellable { status: String },
}

/// Error body returned by the backend on 4xx responses.
#[derive(Debug, Clone, serde::Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub message: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorResponse {
    /// Best human-readable message: `message` (string or list of strings),
    /// then `error`, then the raw body.
    pub fn message_or(body: &str) -> String {
        let parsed = match serde_json::from_str::<ErrorResponse>(body) {
            Ok(parsed) => parsed,
            Err(_) => return body.to_string(),
        };
        match parsed.message {
            Some(serde_json::Value::String(s)) => s,
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join("; "),
            _ => parsed.error.unwrap_or_else(|| body.to_string()),
        }
    }
}
