//! Error types for the application.
//!
//! - [`ApiError`] - Everything a store action can fail with, normalized from
//!   transport failures, HTTP statuses and envelope codes
//! - [`TransportError`] - Raw failures below the envelope layer
//! - [`StorageError`] - localStorage operations

use thiserror::Error;

/// Envelope code for a successful call.
pub const CODE_OK: i64 = 200;
/// Envelope/HTTP code for an expired or invalid session.
pub const CODE_UNAUTHORIZED: i64 = 401;
/// Envelope/HTTP code for a pagination cursor the server no longer honors.
pub const CODE_GONE: i64 = 410;

/// Failures below the envelope layer (no usable HTTP response).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request never produced a response (offline, CORS, DNS).
    #[error("network error: {0}")]
    Network(String),
    /// The request was aborted after `FETCH_TIMEOUT_MS`.
    #[error("request timed out")]
    Timeout,
    /// The request could not be built (bad header, body conversion).
    #[error("failed to build request: {0}")]
    Build(String),
}

/// Normalized error surfaced by API functions and store actions.
///
/// The `Display` output is the user-facing message shown in toasts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No response was received.
    #[error("Network unreachable, check your connection")]
    Network(String),
    /// The transport gave up waiting.
    #[error("Request timed out, please try again")]
    Timeout,
    /// Non-2xx HTTP status without a recognizable envelope.
    #[error("{}", status_message(.0))]
    Http(u16),
    /// Envelope carried a non-200 business code.
    #[error("{message}")]
    Business { code: i64, message: String },
    /// Session expired or token rejected.
    #[error("Session expired, please sign in again")]
    Unauthorized,
    /// The pagination cursor expired; the listing must be refreshed.
    #[error("This list is out of date, refresh to continue")]
    CursorExpired,
    /// Response body did not match the expected shape.
    #[error("Unexpected response from server: {0}")]
    Decode(String),
    /// An action that needs a signed-in user was invoked without one.
    #[error("You are not signed in")]
    SignedOut,
    /// Rejected locally before any request was made.
    #[error("{0}")]
    InvalidInput(String),
}

impl ApiError {
    /// Whether the 401 gate already handled this error (no toast needed).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Whether a listing should offer a manual refresh.
    pub fn is_cursor_expired(&self) -> bool {
        matches!(self, Self::CursorExpired)
    }

    /// Map an envelope code (other than 200) to an error.
    pub fn from_code(code: i64, message: Option<String>) -> Self {
        match code {
            CODE_UNAUTHORIZED => Self::Unauthorized,
            CODE_GONE => Self::CursorExpired,
            _ => Self::Business {
                code,
                message: message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "Request failed".to_string()),
            },
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => Self::Timeout,
            TransportError::Network(msg) | TransportError::Build(msg) => Self::Network(msg),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

fn status_message(status: &u16) -> String {
    http_status_message(*status)
}

/// User-facing message for an HTTP status.
pub fn http_status_message(status: u16) -> String {
    match status {
        404 => "The requested endpoint does not exist".to_string(),
        500 => "Internal server error".to_string(),
        502 => "Bad gateway".to_string(),
        503 => "Service temporarily unavailable".to_string(),
        other => format!("Server error ({other})"),
    }
}

/// localStorage errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("localStorage not available")]
    Unavailable,
    #[error("failed to serialize value")]
    SerializationFailed,
    #[error("failed to write to localStorage")]
    WriteFailed,
    #[error("failed to remove from localStorage")]
    RemoveFailed,
}
