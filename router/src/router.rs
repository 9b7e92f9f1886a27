//! Dispatch: resolve a [`RequestContext`] to a registered handler and normalize the outcome.

use std::{any::Any, panic::AssertUnwindSafe, sync::Arc};

use async_trait::async_trait;
use futures::FutureExt as _;
use serde::Serialize;
use tracing::Instrument as _;

use crate::{
    config::RouterConfig,
    context::RequestContext,
    error::HttpError,
    handler::{Handler, Routed},
    response::NormalizedResponse,
    table::{RouteMatch, RouteTable},
};

#[async_trait]
/// The dispatch contract a transport adapter depends on.
///
/// Implementations must turn unmatched routes and handler failures into a
/// [`NormalizedResponse`]. An `Err` means the router itself broke that contract; adapters
/// propagate it without recovery.
pub trait HandleRequest<C>: Send + Sync {
    async fn handle_request(&self, context: C) -> anyhow::Result<NormalizedResponse>;
}

/// Routes requests for resource type `T`, arriving as contexts of type `C`.
///
/// Register every route first (registration needs `&mut self`), then share the router
/// read-only, e.g. behind an `Arc`, for as many [`handle_request`](Self::handle_request) calls
/// as needed.
pub struct FunctionRouter<T, C> {
    config: RouterConfig,
    routes: RouteTable<Arc<dyn Handler<T, C>>>,
}

impl<T, C> Default for FunctionRouter<T, C> {
    fn default() -> Self {
        Self::with_config(RouterConfig::default())
    }
}

impl<T, C> FunctionRouter<T, C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            config,
            routes: RouteTable::new(),
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Register `handler` for `method` requests matching `template` (e.g. `/items/{id}`).
    pub fn route<H>(
        &mut self,
        method: &str,
        template: &str,
        handler: H,
    ) -> anyhow::Result<&mut Self>
    where
        H: Handler<T, C> + 'static,
    {
        let method = self.config.normalize_method(method);
        let template = self.config.normalize_path(template);
        tracing::debug!(method = %method, template = %template, "registering route");
        self.routes.insert(method, template, Arc::new(handler))?;
        Ok(self)
    }

    pub fn get<H>(&mut self, template: &str, handler: H) -> anyhow::Result<&mut Self>
    where
        H: Handler<T, C> + 'static,
    {
        self.route("GET", template, handler)
    }

    pub fn post<H>(&mut self, template: &str, handler: H) -> anyhow::Result<&mut Self>
    where
        H: Handler<T, C> + 'static,
    {
        self.route("POST", template, handler)
    }

    pub fn put<H>(&mut self, template: &str, handler: H) -> anyhow::Result<&mut Self>
    where
        H: Handler<T, C> + 'static,
    {
        self.route("PUT", template, handler)
    }

    pub fn patch<H>(&mut self, template: &str, handler: H) -> anyhow::Result<&mut Self>
    where
        H: Handler<T, C> + 'static,
    {
        self.route("PATCH", template, handler)
    }

    pub fn delete<H>(&mut self, template: &str, handler: H) -> anyhow::Result<&mut Self>
    where
        H: Handler<T, C> + 'static,
    {
        self.route("DELETE", template, handler)
    }

    /// Number of registered `(method, template)` pairs.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    fn error_response(&self, err: &anyhow::Error) -> NormalizedResponse {
        if let Some(http) = err.downcast_ref::<HttpError>() {
            tracing::debug!(status = http.status_code, error = %err, "handler returned http error");
            return match &http.message {
                Some(message) => NormalizedResponse::text(http.status_code, message.clone()),
                None => NormalizedResponse::new(http.status_code),
            };
        }

        tracing::warn!(error = %err, "handler failed");
        self.internal_error(|| format!("{err:#}"))
    }

    /// A `500`, carrying `detail` as its body only when `expose_error_details` is set.
    fn internal_error(&self, detail: impl FnOnce() -> String) -> NormalizedResponse {
        let resp = NormalizedResponse::internal_error();
        if self.config.expose_error_details {
            NormalizedResponse::text(resp.status_code, detail())
        } else {
            resp
        }
    }
}

impl<T, C> FunctionRouter<T, C>
where
    T: Serialize + Send + 'static,
    C: RequestContext + Send + 'static,
{
    /// Resolve `context` against the registered routes, run the handler and return its result
    /// as a [`NormalizedResponse`].
    ///
    /// Never fails: no matching path yields `404`, a path without the method yields `405` with an
    /// `Allow` header, a handler error or panic yields `500` (or the status of an [`HttpError`]).
    pub async fn handle_request(&self, context: C) -> NormalizedResponse {
        let span = tracing::debug_span!(
            "handle_request",
            method = %context.http_method(),
            path = %context.path(),
        );
        self.dispatch(context).instrument(span).await
    }

    async fn dispatch(&self, context: C) -> NormalizedResponse {
        let method = self.config.normalize_method(context.http_method());
        let (handler, params, route) =
            match self.routes.match_request(&method, self.config.normalize_path(context.path())) {
                RouteMatch::NotFound => {
                    tracing::debug!("no route matched");
                    return NormalizedResponse::not_found();
                }
                RouteMatch::MethodNotAllowed { allowed } => {
                    tracing::debug!(allowed = ?allowed, "method not allowed");
                    return NormalizedResponse::method_not_allowed(&allowed);
                }
                RouteMatch::Matched {
                    handler,
                    params,
                    route,
                } => (handler, params, Arc::clone(route)),
            };

        tracing::debug!(route = %route, "route matched");
        let routed = Routed {
            context,
            params,
            route,
        };

        match AssertUnwindSafe(handler.call(routed)).catch_unwind().await {
            Ok(Ok(reply)) => match reply.into_response() {
                Ok(resp) => resp,
                Err(err) => {
                    tracing::warn!(error = %err, "failed to serialize handler reply");
                    self.error_response(&err)
                }
            },
            Ok(Err(err)) => self.error_response(&err),
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(panic = %message, "handler panicked");
                self.internal_error(|| message.to_string())
            }
        }
    }
}

#[async_trait]
impl<T, C> HandleRequest<C> for FunctionRouter<T, C>
where
    T: Serialize + Send + 'static,
    C: RequestContext + Send + 'static,
{
    async fn handle_request(&self, context: C) -> anyhow::Result<NormalizedResponse> {
        Ok(FunctionRouter::handle_request(self, context).await)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "<non-string panic payload>"
    }
}
