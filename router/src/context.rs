//! Transport-neutral view of one inbound request.

/// Read-only view of a single, already-received request.
///
/// Implementations wrap whatever native object a transport delivers and expose the three values
/// the router needs through accessors, so the router never depends on the transport's shape.
/// Accessors must be side-effect free.
///
/// No normalization is implied: the method and path are returned exactly as the transport
/// carried them. The one guarantee is on [`body`](RequestContext::body): a request without a
/// body yields `""`, so "no body" and "empty body" are indistinguishable to handlers.
pub trait RequestContext {
    fn http_method(&self) -> &str;

    fn path(&self) -> &str;

    fn body(&self) -> &str;
}

impl<R: RequestContext + ?Sized> RequestContext for &R {
    fn http_method(&self) -> &str {
        (**self).http_method()
    }

    fn path(&self) -> &str {
        (**self).path()
    }

    fn body(&self) -> &str {
        (**self).body()
    }
}

impl<R: RequestContext + ?Sized> RequestContext for Box<R> {
    fn http_method(&self) -> &str {
        (**self).http_method()
    }

    fn path(&self) -> &str {
        (**self).path()
    }

    fn body(&self) -> &str {
        (**self).body()
    }
}

/// Owned request for callers that are not tied to a particular transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticRequest {
    method: String,
    path: String,
    body: Option<String>,
}

impl StaticRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

impl RequestContext for StaticRequest {
    fn http_method(&self) -> &str {
        &self.method
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn body(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_body_reads_as_empty_string() {
        let req = StaticRequest::new("GET", "/items/42");
        assert_eq!(req.body(), "");
    }

    #[test]
    fn accessors_return_values_verbatim() {
        let req = StaticRequest::new("get", "/Items/42/").with_body(" {} ");
        assert_eq!(req.http_method(), "get");
        assert_eq!(req.path(), "/Items/42/");
        assert_eq!(req.body(), " {} ");
    }

    #[test]
    fn references_and_boxes_forward_to_the_inner_context() {
        fn describe<C: RequestContext>(ctx: C) -> String {
            format!("{} {} {}", ctx.http_method(), ctx.path(), ctx.body())
        }

        let req = StaticRequest::new("POST", "/items").with_body("x");
        assert_eq!(describe(&req), "POST /items x");

        let boxed: Box<dyn RequestContext> = Box::new(req.clone());
        assert_eq!(describe(boxed), "POST /items x");
    }
}
