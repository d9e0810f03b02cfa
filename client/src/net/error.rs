//! Error taxonomy shared by the gateway, resource clients, and session.
//!
//! ERROR HANDLING
//! ==============
//! - `TransportError`: the exchange never produced a response.
//! - `HttpError`: any non-2xx response, with status and best-effort body.
//! - `ApiError`: what every gateway call returns on failure.
//! - `AuthFailure`: login/signup failures carrying a display message while
//!   keeping the original error as `source`.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use serde_json::Value;

pub const HTTP_ERROR_MESSAGE: &str = "request failed";

/// Failure below the HTTP layer (offline, DNS, refused, aborted).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A non-success HTTP response.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}{}", status_suffix(.status))]
pub struct HttpError {
    pub message: String,
    pub status: Option<u16>,
    /// Decoded response body: JSON when parseable, raw text otherwise.
    pub payload: Option<Value>,
}

impl HttpError {
    pub fn from_response(status: u16, payload: Option<Value>) -> Self {
        Self { message: HTTP_ERROR_MESSAGE.to_owned(), status: Some(status), payload }
    }

    /// The `detail` string of an object payload, if present and non-blank.
    ///
    /// Best-effort: the service usually sends `{"detail": "..."}` but nothing
    /// guarantees it, and validation errors send `detail` as a list.
    pub fn detail(&self) -> Option<&str> {
        self.payload
            .as_ref()?
            .get("detail")?
            .as_str()
            .filter(|detail| !detail.trim().is_empty())
    }
}

#[allow(clippy::ref_option)]
fn status_suffix(status: &Option<u16>) -> String {
    status.map(|code| format!(" (status {code})")).unwrap_or_default()
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Http(#[from] HttpError),

    /// A 2xx body that does not fit the caller's expected type.
    #[error("unexpected response body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("request body encode failed: {0}")]
    Encode(#[source] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(err) => err.status,
            _ => None,
        }
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Http(err) => err.payload.as_ref(),
            _ => None,
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Http(err) => err.detail(),
            _ => None,
        }
    }
}

/// Login/signup failure: a message fit for display plus the error behind it.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct AuthFailure {
    pub message: String,
    #[source]
    pub source: ApiError,
}

/// Display message for a failed auth call.
///
/// Order: the payload `detail`, then the error's own message when
/// `use_error_message` is set, then `fallback`.
pub fn user_message(err: &ApiError, use_error_message: bool, fallback: &str) -> String {
    if let Some(detail) = err.detail() {
        return detail.to_owned();
    }
    if use_error_message {
        let own = err.to_string();
        if !own.trim().is_empty() {
            return own;
        }
    }
    fallback.to_owned()
}
