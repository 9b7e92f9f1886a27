//! `function-router` resolves HTTP-shaped requests to resource handlers without knowing which
//! transport delivered them.
//!
//! A transport adapter wraps its native request in a [`RequestContext`], calls
//! [`FunctionRouter::handle_request`], and reshapes the returned [`NormalizedResponse`] into its
//! own response type.
//!
//! Core modules:
//! - [`context`]: the [`RequestContext`] capability trait
//! - [`table`]: `(method, path template)` matcher
//! - [`handler`]: the [`Handler`] seam, [`Reply`] and path params
//! - [`router`]: dispatch and response normalization
//! - [`config`]: matching options (YAML)

pub mod config;
pub mod context;
pub mod error;
pub mod handler;
pub mod response;
pub mod router;
pub mod table;

pub use config::{MethodMatching, RouterConfig, TrailingSlash};
pub use context::{RequestContext, StaticRequest};
pub use error::HttpError;
pub use handler::{handler_fn, Handler, HandlerFn, PathParams, Reply, Routed};
pub use response::NormalizedResponse;
pub use router::{FunctionRouter, HandleRequest};
