//! Router configuration loaded from YAML.
//!
//! Every option defaults to "no normalization": the router matches the method and path exactly
//! as the transport delivered them unless told otherwise.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
/// How the request method is compared with registered methods.
#[serde(rename_all = "snake_case")]
pub enum MethodMatching {
    /// `get` and `GET` are different methods.
    #[default]
    Exact,
    /// Methods are upper-cased (ASCII) on both registration and lookup.
    CaseInsensitive,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
/// How a trailing `/` on the request path (and on route templates) is treated.
#[serde(rename_all = "snake_case")]
pub enum TrailingSlash {
    /// `/items/` and `/items` are different paths.
    #[default]
    Strict,
    /// A single trailing `/` is dropped before matching (the root path `/` is kept).
    Ignore,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
/// Top-level router configuration.
pub struct RouterConfig {
    #[serde(default)]
    pub method_matching: MethodMatching,

    #[serde(default)]
    pub trailing_slash: TrailingSlash,

    #[serde(default)]
    /// When set, `500` responses carry the handler error (or panic message) as a `text/plain` body.
    pub expose_error_details: bool,
}

impl RouterConfig {
    /// Parse a YAML router config from bytes.
    pub fn from_yaml_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_slice(bytes)?)
    }

    pub(crate) fn normalize_method(&self, method: &str) -> String {
        match self.method_matching {
            MethodMatching::Exact => method.to_string(),
            MethodMatching::CaseInsensitive => method.to_ascii_uppercase(),
        }
    }

    pub(crate) fn normalize_path<'a>(&self, path: &'a str) -> &'a str {
        match self.trailing_slash {
            TrailingSlash::Strict => path,
            TrailingSlash::Ignore => match path.strip_suffix('/') {
                Some(trimmed) if !trimmed.is_empty() => trimmed,
                _ => path,
            },
        }
    }
}
