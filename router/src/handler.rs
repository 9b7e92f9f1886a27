//! Handler seam: what a registered route calls, and what it may return.

use std::{future::Future, sync::Arc};

use async_trait::async_trait;
use http::StatusCode;
use serde::de::DeserializeOwned;

use crate::{context::RequestContext, error::HttpError, response::NormalizedResponse};

/// Path parameters captured by a `{name}` template segment, in template order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(String, String)>);

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'k, 'v> FromIterator<(&'k str, &'v str)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (&'k str, &'v str)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// A request that matched a route: the caller's context plus what matching extracted.
#[derive(Debug)]
pub struct Routed<C> {
    pub context: C,
    pub params: PathParams,
    /// The registered template that matched (e.g. `/items/{id}`).
    pub route: Arc<str>,
}

impl<C> Routed<C> {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// Parse a path parameter, answering `400` when it is missing or malformed.
    pub fn parse_param<P: std::str::FromStr>(&self, name: &str) -> anyhow::Result<P> {
        let raw = self
            .param(name)
            .ok_or_else(|| HttpError::bad_request(format!("missing path parameter: {name}")))?;
        raw.parse().map_err(|_| {
            HttpError::bad_request(format!("invalid path parameter {name}: {raw}")).into()
        })
    }
}

impl<C: RequestContext> Routed<C> {
    /// Deserialize the JSON request body, answering `400` when it does not parse.
    ///
    /// An absent body reads as `""` and is therefore rejected like any other invalid JSON.
    pub fn json_body<B: DeserializeOwned>(&self) -> anyhow::Result<B> {
        serde_json::from_str(self.context.body())
            .map_err(|err| HttpError::bad_request(format!("invalid json body: {err}")).into())
    }
}

/// What a handler for resource type `T` produces on success.
#[derive(Debug)]
pub enum Reply<T> {
    /// `200` with `T` as the JSON body.
    Resource(T),
    /// `201` with `T` as the JSON body.
    Created(T),
    /// `204`, no body.
    NoContent,
    /// A fully formed response, passed through as-is.
    Response(NormalizedResponse),
}

impl<T> From<NormalizedResponse> for Reply<T> {
    fn from(value: NormalizedResponse) -> Self {
        Self::Response(value)
    }
}

impl<T: serde::Serialize> Reply<T> {
    pub(crate) fn into_response(self) -> anyhow::Result<NormalizedResponse> {
        match self {
            Self::Resource(value) => NormalizedResponse::json(StatusCode::OK.as_u16(), &value),
            Self::Created(value) => NormalizedResponse::json(StatusCode::CREATED.as_u16(), &value),
            Self::NoContent => Ok(NormalizedResponse::new(StatusCode::NO_CONTENT.as_u16())),
            Self::Response(resp) => Ok(resp),
        }
    }
}

#[async_trait]
/// A route target for resource type `T`, receiving contexts of type `C`.
pub trait Handler<T, C>: Send + Sync {
    async fn call(&self, request: Routed<C>) -> anyhow::Result<Reply<T>>;
}

/// [`Handler`] backed by an async closure. Build one with [`handler_fn`].
#[derive(Clone)]
pub struct HandlerFn<F> {
    f: F,
}

/// Wrap `async |Routed<C>| -> anyhow::Result<Reply<T>>` as a [`Handler`].
pub fn handler_fn<T, C, F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(Routed<C>) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Reply<T>>> + Send + 'static,
{
    HandlerFn { f }
}

#[async_trait]
impl<T, C, F, Fut> Handler<T, C> for HandlerFn<F>
where
    T: Send + 'static,
    C: Send + 'static,
    F: Fn(Routed<C>) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Reply<T>>> + Send + 'static,
{
    async fn call(&self, request: Routed<C>) -> anyhow::Result<Reply<T>> {
        (self.f)(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::StaticRequest;

    fn routed(body: Option<&str>, params: &[(&str, &str)]) -> Routed<StaticRequest> {
        let mut context = StaticRequest::new("POST", "/items/7");
        if let Some(body) = body {
            context = context.with_body(body);
        }
        Routed {
            context,
            params: params.iter().copied().collect(),
            route: Arc::from("/items/{id}"),
        }
    }

    #[test]
    fn params_are_looked_up_by_name() {
        let req = routed(None, &[("id", "7"), ("sub", "x")]);
        assert_eq!(req.param("id"), Some("7"));
        assert_eq!(req.param("sub"), Some("x"));
        assert_eq!(req.param("nope"), None);
        assert_eq!(req.params.len(), 2);
        assert_eq!(
            req.params.iter().collect::<Vec<_>>(),
            vec![("id", "7"), ("sub", "x")]
        );
    }

    #[test]
    fn parse_param_maps_failures_to_bad_request() {
        fn status(err: anyhow::Error) -> u16 {
            err.downcast_ref::<HttpError>().unwrap().status_code
        }

        let req = routed(None, &[("id", "seven")]);
        assert_eq!(status(req.parse_param::<u32>("missing").unwrap_err()), 400);
        assert_eq!(status(req.parse_param::<u32>("id").unwrap_err()), 400);

        let req = routed(None, &[("id", "7")]);
        assert_eq!(req.parse_param::<u32>("id").unwrap(), 7);
    }

    #[test]
    fn json_body_rejects_absent_body_with_bad_request() {
        #[derive(serde::Deserialize, Debug)]
        struct In {
            #[allow(dead_code)]
            name: String,
        }

        let err = routed(None, &[]).json_body::<In>().unwrap_err();
        assert_eq!(err.downcast_ref::<HttpError>().unwrap().status_code, 400);

        let ok: serde_json::Value = routed(Some(r#"{"name":"a"}"#), &[]).json_body().unwrap();
        assert_eq!(ok["name"], "a");
    }

    #[test]
    fn replies_normalize_to_status_and_json() {
        let resp = Reply::Resource(serde_json::json!({"id": 1}))
            .into_response()
            .unwrap();
        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.body.as_deref(), Some(r#"{"id":1}"#));

        let resp = Reply::Created(1u8).into_response().unwrap();
        assert_eq!(resp.status_code, 201);
        assert_eq!(resp.body.as_deref(), Some("1"));

        let resp = Reply::<()>::NoContent.into_response().unwrap();
        assert_eq!(resp, NormalizedResponse::new(204));

        let raw = NormalizedResponse::text(418, "teapot");
        let resp = Reply::<()>::from(raw.clone()).into_response().unwrap();
        assert_eq!(resp, raw);
    }
}
