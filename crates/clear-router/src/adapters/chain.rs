//! Adapter for [`chain_router`], a continuation-style router whose handlers
//! receive `(request, response, next)`.
//!
//! Handlers get an [`HttpContext`] holding all three and return a
//! [`Response`]. A handler error is forwarded with [`Next::fail`], which hands
//! it to the router's error handler; install [`error_handler`] to answer
//! [`HttpError`]s with their own status.
//!
//! ```ignore
//! use clear_router::adapters::chain::{error_handler, Chain, HttpContext};
//!
//! let mut routes = RouteRegistry::<Chain>::new();
//! routes.get("/hello", handler(|ctx: HttpContext| async move {
//!     Ok(ctx.res.send_json(&json!({"message": "hi"})))
//! }), []);
//!
//! let router = routes.apply(chain_router::Router::new().on_error(error_handler))?;
//! ```

use std::sync::Arc;

use chain_router::{Method, Middleware, Next, Request, Response, RouterError};
use tracing::error;

use crate::error::{BoxError, ConfigError, HttpError, Result};
use crate::framework::{Binding, Framework, HandlerFn};
use crate::method::HttpMethod;

/// Framework marker for [`chain_router::Router`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Chain;

/// What a chain handler receives.
#[derive(Debug)]
pub struct HttpContext {
    pub req: Request,
    /// The response passed down the chain so far.
    pub res: Response,
    /// Continuation for handlers that defer to later chain elements.
    pub next: Next,
}

impl Framework for Chain {
    type Context = HttpContext;
    type Output = Response;
    type Middleware = Middleware;
}

fn to_chain_method(method: &HttpMethod) -> Option<Method> {
    match method {
        HttpMethod::Get => Some(Method::Get),
        HttpMethod::Post => Some(Method::Post),
        HttpMethod::Put => Some(Method::Put),
        HttpMethod::Delete => Some(Method::Delete),
        HttpMethod::Patch => Some(Method::Patch),
        HttpMethod::Options => Some(Method::Options),
        HttpMethod::Head => Some(Method::Head),
        HttpMethod::Other(_) => None,
    }
}

impl Binding<Chain> for chain_router::Router {
    fn bind(
        self,
        method: &HttpMethod,
        path: &str,
        middlewares: &[Middleware],
        handler: HandlerFn<HttpContext, Response>,
    ) -> Result<Self> {
        let Some(chain_method) = to_chain_method(method) else {
            return Err(ConfigError::UnsupportedMethod {
                method: method.clone(),
                path: path.to_string(),
            });
        };

        let endpoint = chain_router::middleware(move |req: Request, res: Response, next: Next| {
            let handler = Arc::clone(&handler);
            async move {
                let fallback = next.clone();
                match handler(HttpContext { req, res, next }).await {
                    Ok(res) => res,
                    Err(err) => fallback.fail(err),
                }
            }
        });

        self.on(chain_method, path, middlewares.iter().cloned(), endpoint)
            .map_err(|err| ConfigError::InvalidPath {
                path: path.to_string(),
                reason: match err {
                    RouterError::InvalidPattern { reason, .. } => reason.to_string(),
                    other => other.to_string(),
                },
            })
    }
}

/// Error handler answering `{"error": message, "status": code}`, with the
/// status taken from an [`HttpError`] or `500` otherwise.
///
/// Install it with [`chain_router::Router::on_error`].
pub fn error_handler(err: BoxError) -> Response {
    let status = HttpError::status_of(&err);
    if status >= 500 {
        error!(target: "clear_router", status, error = %err, "request failed");
    }
    Response::new(status).send_json(&serde_json::json!({
        "error": err.to_string(),
        "status": status,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_mapping() {
        for method in HttpMethod::BINDABLE {
            let mapped = to_chain_method(&method).unwrap();
            assert_eq!(mapped.as_str(), method.as_str());
        }
        assert!(to_chain_method(&HttpMethod::parse("TRACE")).is_none());
    }

    #[test]
    fn test_error_handler_status() {
        let res = error_handler(Box::new(HttpError::new(404, "no such user")));
        assert_eq!(res.status, 404);
        let body: serde_json::Value = res.body_json().unwrap();
        assert_eq!(body["error"], "no such user");
        assert_eq!(body["status"], 404);

        assert_eq!(error_handler("boom".into()).status, 500);
    }
}
