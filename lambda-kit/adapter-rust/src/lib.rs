//! API Gateway proxy adapter for `function-router`.
//!
//! Wraps a REST API (proxy integration) Lambda event in a [`RequestContext`], dispatches it
//! through a [`FunctionRouter`], and reshapes the router's [`NormalizedResponse`] into the proxy
//! result JSON that API Gateway expects. Transport field names live only in this crate.

use std::{collections::HashMap, sync::Arc};

use aws_lambda_events::event::apigw::ApiGatewayProxyRequest;
use function_router::{
    FunctionRouter, HandleRequest, NormalizedResponse, RequestContext, RouterConfig,
};
use lambda_runtime::{service_fn, Context, LambdaEvent};
use serde::{Deserialize, Serialize};

/// [`RequestContext`] over an API Gateway proxy event and its Lambda invocation context.
///
/// The invocation context is carried for handlers (request id, deadline, ...) but is never
/// consulted for routing.
#[derive(Debug, Clone)]
pub struct AwsRequestContext {
    pub event: ApiGatewayProxyRequest,
    pub context: Context,
}

impl AwsRequestContext {
    pub fn new(event: ApiGatewayProxyRequest, context: Context) -> Self {
        Self { event, context }
    }

    /// Lambda request id of the invocation that carried this event.
    pub fn request_id(&self) -> &str {
        &self.context.request_id
    }
}

impl RequestContext for AwsRequestContext {
    fn http_method(&self) -> &str {
        self.event.http_method.as_str()
    }

    /// A proxy event without `path` reads as `""`, which never matches a route.
    fn path(&self) -> &str {
        self.event.path.as_deref().unwrap_or_default()
    }

    fn body(&self) -> &str {
        self.event.body.as_deref().unwrap_or_default()
    }
}

/// Lambda -> API Gateway proxy result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyResult {
    #[serde(rename = "statusCode")]
    pub status_code: i64,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body: String,
    #[serde(rename = "isBase64Encoded", default)]
    pub is_base64_encoded: bool,
}

impl From<NormalizedResponse> for ProxyResult {
    fn from(value: NormalizedResponse) -> Self {
        Self {
            status_code: i64::from(value.status_code),
            headers: value.headers,
            body: value.body.unwrap_or_default(),
            is_base64_encoded: false,
        }
    }
}

/// Dispatch `context` through any [`HandleRequest`] implementation and reshape the result.
///
/// A router error is returned unchanged; there is no retry and no fallback response.
pub async fn dispatch<R>(router: &R, context: AwsRequestContext) -> anyhow::Result<ProxyResult>
where
    R: HandleRequest<AwsRequestContext> + ?Sized,
{
    let response = router.handle_request(context).await?;
    Ok(ProxyResult::from(response))
}

/// A [`FunctionRouter`] bound to API Gateway proxy events, for resource type `T`.
pub struct AwsFunctionRouter<T> {
    router: FunctionRouter<T, AwsRequestContext>,
}

impl<T> Default for AwsFunctionRouter<T> {
    fn default() -> Self {
        Self::from(FunctionRouter::default())
    }
}

impl<T> From<FunctionRouter<T, AwsRequestContext>> for AwsFunctionRouter<T> {
    fn from(router: FunctionRouter<T, AwsRequestContext>) -> Self {
        Self { router }
    }
}

impl<T> AwsFunctionRouter<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RouterConfig) -> Self {
        Self::from(FunctionRouter::with_config(config))
    }

    /// Route registration happens through the wrapped router.
    pub fn routes_mut(&mut self) -> &mut FunctionRouter<T, AwsRequestContext> {
        &mut self.router
    }

    pub fn routes(&self) -> &FunctionRouter<T, AwsRequestContext> {
        &self.router
    }
}

impl<T> AwsFunctionRouter<T>
where
    T: Serialize + Send + 'static,
{
    /// Call the handler registered for the context's method and path, and return its result as
    /// an API Gateway proxy result.
    pub async fn handle(&self, context: AwsRequestContext) -> anyhow::Result<ProxyResult> {
        let result = dispatch(&self.router, context).await?;
        tracing::debug!(status = result.status_code, "reshaped router response");
        Ok(result)
    }
}

/// Serve `router` on the Lambda runtime until the runtime shuts down.
pub async fn run<T>(router: AwsFunctionRouter<T>) -> Result<(), lambda_runtime::Error>
where
    T: Serialize + Send + 'static,
{
    let router = Arc::new(router);
    lambda_runtime::run(service_fn(
        move |event: LambdaEvent<ApiGatewayProxyRequest>| {
            let router = Arc::clone(&router);
            async move {
                let context = AwsRequestContext::new(event.payload, event.context);
                tracing::debug!(request_id = %context.request_id(), "handling invocation");
                router
                    .handle(context)
                    .await
                    .map_err(lambda_runtime::Error::from)
            }
        },
    ))
    .await
}
