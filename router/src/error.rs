//! Handler-signalled HTTP errors.

use std::fmt;

use http::StatusCode;

/// An error a handler returns (inside `anyhow::Error`) to choose the response status.
///
/// Any other handler error becomes a `500`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    pub status_code: u16,
    pub message: Option<String>,
}

impl HttpError {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            message: None,
        }
    }

    pub fn with_message(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: Some(message.into()),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_message(StatusCode::BAD_REQUEST.as_u16(), message)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND.as_u16())
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "http {}: {message}", self.status_code),
            None => write!(f, "http {}", self.status_code),
        }
    }
}

impl std::error::Error for HttpError {}
