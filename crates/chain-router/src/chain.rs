//! Continuation chains.
//!
//! Every route owns a stack of [`Middleware`]: the route's middleware in
//! registration order, followed by its endpoint. Each element receives the
//! request, the response built so far, and a [`Next`] continuation. Calling
//! [`Next::run`] hands control to the following element; returning without
//! calling it short-circuits the chain; [`Next::fail`] diverts to the router's
//! error handler.
//!
//! # Example
//!
//! ```ignore
//! use chain_router::{middleware, Response};
//!
//! let guard = middleware(|req, res, next| async move {
//!     if req.get_query("token").is_none() {
//!         return res.status(403).send_json(&serde_json::json!({"message": "Forbidden"}));
//!     }
//!     next.run(req, res).await
//! });
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::error;

use crate::error::BoxError;
use crate::request::Request;
use crate::response::Response;

/// One element of a chain: middleware, or the endpoint at its end.
pub type Middleware =
    Arc<dyn Fn(Request, Response, Next) -> BoxFuture<'static, Response> + Send + Sync>;

/// Turns an error forwarded with [`Next::fail`] into a response.
pub type ErrorHandler = Arc<dyn Fn(BoxError) -> Response + Send + Sync>;

/// Wraps an async closure as a chain element.
pub fn middleware<F, Fut>(f: F) -> Middleware
where
    F: Fn(Request, Response, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |req, res, next| Box::pin(f(req, res, next)))
}

/// The handler installed when the router is not given one: logs the error and
/// answers `500` with `{"error": message}`.
pub fn default_error_handler() -> ErrorHandler {
    Arc::new(|err: BoxError| {
        error!(error = %err, "request failed");
        Response::new(500).send_json(&serde_json::json!({ "error": err.to_string() }))
    })
}

/// Continuation handed to every chain element.
#[derive(Clone)]
pub struct Next {
    stack: Arc<[Middleware]>,
    index: usize,
    on_error: ErrorHandler,
}

impl Next {
    pub(crate) fn start(stack: Arc<[Middleware]>, on_error: ErrorHandler) -> Self {
        Self {
            stack,
            index: 0,
            on_error,
        }
    }

    /// Runs the rest of the chain.
    ///
    /// Past the end of the chain the response is returned unchanged.
    pub fn run(self, req: Request, res: Response) -> BoxFuture<'static, Response> {
        Box::pin(async move {
            let Some(element) = self.stack.get(self.index).cloned() else {
                return res;
            };
            let next = Self {
                index: self.index + 1,
                ..self
            };
            element(req, res, next).await
        })
    }

    /// Abandons the chain and lets the router's error handler respond.
    pub fn fail(&self, err: impl Into<BoxError>) -> Response {
        (self.on_error)(err.into())
    }

    /// Number of chain elements not yet run.
    pub fn remaining(&self) -> usize {
        self.stack.len().saturating_sub(self.index)
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("index", &self.index)
            .field("len", &self.stack.len())
            .finish_non_exhaustive()
    }
}
