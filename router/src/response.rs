//! Transport-neutral response produced by the router.

use std::collections::HashMap;

use http::StatusCode;
use serde::Serialize;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const ALLOW: &str = "Allow";

/// Status, headers and body as handed to a transport adapter.
///
/// `body` may be absent here; adapters must coalesce a missing body into `""` before building
/// their native response (see [`NormalizedResponse::into_body_string`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl NormalizedResponse {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn text(status_code: u16, body: impl Into<String>) -> Self {
        Self::new(status_code)
            .with_header(CONTENT_TYPE, "text/plain")
            .with_body(body)
    }

    /// Serialize `value` as the JSON body.
    pub fn json<T: Serialize + ?Sized>(status_code: u16, value: &T) -> anyhow::Result<Self> {
        let body = serde_json::to_string(value)?;
        Ok(Self::new(status_code)
            .with_header(CONTENT_TYPE, "application/json")
            .with_body(body))
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND.as_u16())
    }

    /// `405` with an `Allow` header listing `allowed` in the given order.
    pub fn method_not_allowed<S: AsRef<str>>(allowed: &[S]) -> Self {
        let allow = allowed
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(", ");
        Self::new(StatusCode::METHOD_NOT_ALLOWED.as_u16()).with_header(ALLOW, allow)
    }

    pub fn internal_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR.as_u16())
    }

    /// The body, with an absent body read as `""`.
    pub fn body_str(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }

    pub fn into_body_string(self) -> String {
        self.body.unwrap_or_default()
    }
}
