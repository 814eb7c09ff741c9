//! Request error types shared by the backend client and the event channel.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Categories of backend request errors for consistent handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// HTTP status error (4xx, 5xx)
    HttpStatus,
    /// Connection timeout or request timeout
    Timeout,
    /// Could not reach the backend
    Connect,
    /// Failed to parse a response (JSON parse error, invalid SSE, etc.)
    Parse,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::HttpStatus => write!(f, "http_status"),
            ApiErrorKind::Timeout => write!(f, "timeout"),
            ApiErrorKind::Connect => write!(f, "connect"),
            ApiErrorKind::Parse => write!(f, "parse"),
        }
    }
}

/// Structured error from a backend request with kind and details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error category
    pub kind: ApiErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Optional additional details (e.g., raw error body)
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Creates an HTTP status error, extracting a cleaner message from a
    /// JSON error body when one is present.
    pub fn http_status(status: u16, body: &str) -> Self {
        let message = format!("HTTP {status}");
        let details = if body.is_empty() {
            None
        } else {
            if let Ok(json) = serde_json::from_str::<Value>(body)
                && let Some(error_obj) = json.get("error")
                && let Some(msg) = error_obj.get("message").and_then(|v| v.as_str())
            {
                return Self {
                    kind: ApiErrorKind::HttpStatus,
                    message: format!("HTTP {status}: {msg}"),
                    details: Some(body.to_string()),
                };
            }
            Some(body.to_string())
        };
        Self {
            kind: ApiErrorKind::HttpStatus,
            message,
            details,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Timeout, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Parse, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for backend requests.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Maps a reqwest transport error into an `ApiError` category.
pub(crate) fn classify_reqwest_error(e: &reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::timeout(format!("Request timed out: {e}"))
    } else if e.is_connect() {
        ApiError::new(ApiErrorKind::Connect, format!("Connection failed: {e}"))
    } else if e.is_decode() {
        ApiError::parse(format!("Response decode error: {e}"))
    } else {
        ApiError::new(ApiErrorKind::HttpStatus, format!("Network error: {e}"))
    }
}
