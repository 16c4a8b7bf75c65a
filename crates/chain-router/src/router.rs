//! Route table and dispatch.

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::chain::{default_error_handler, ErrorHandler, Middleware, Next};
use crate::error::{BoxError, Result, RouterError};
use crate::path::PathPattern;
use crate::request::{Method, PathParams, Request};
use crate::response::Response;

/// A method, a pattern and the chain run when both match.
#[derive(Clone)]
pub struct Route {
    pub method: Method,
    pub pattern: PathPattern,
    /// Middleware followed by the endpoint.
    stack: Arc<[Middleware]>,
}

impl Route {
    /// Number of middleware in front of the endpoint.
    pub fn middleware_count(&self) -> usize {
        self.stack.len().saturating_sub(1)
    }
}

/// An ordered list of routes sharing one error handler.
///
/// Routes are tried in registration order; the first pattern and method match
/// wins. Building is by value, so registration chains with `and_then`.
#[derive(Clone)]
pub struct Router {
    routes: Vec<Route>,
    on_error: ErrorHandler,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// A router without routes, answering failures with
    /// [`default_error_handler`].
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            on_error: default_error_handler(),
        }
    }

    /// Registers `endpoint` behind `middlewares` for `method` and `path`.
    pub fn on(
        mut self,
        method: Method,
        path: &str,
        middlewares: impl IntoIterator<Item = Middleware>,
        endpoint: Middleware,
    ) -> Result<Self> {
        let pattern = PathPattern::parse(path)?;
        let stack: Arc<[Middleware]> = middlewares
            .into_iter()
            .chain(std::iter::once(endpoint))
            .collect();
        self.routes.push(Route {
            method,
            pattern,
            stack,
        });
        Ok(self)
    }

    pub fn get(
        self,
        path: &str,
        middlewares: impl IntoIterator<Item = Middleware>,
        endpoint: Middleware,
    ) -> Result<Self> {
        self.on(Method::Get, path, middlewares, endpoint)
    }

    pub fn post(
        self,
        path: &str,
        middlewares: impl IntoIterator<Item = Middleware>,
        endpoint: Middleware,
    ) -> Result<Self> {
        self.on(Method::Post, path, middlewares, endpoint)
    }

    pub fn put(
        self,
        path: &str,
        middlewares: impl IntoIterator<Item = Middleware>,
        endpoint: Middleware,
    ) -> Result<Self> {
        self.on(Method::Put, path, middlewares, endpoint)
    }

    pub fn delete(
        self,
        path: &str,
        middlewares: impl IntoIterator<Item = Middleware>,
        endpoint: Middleware,
    ) -> Result<Self> {
        self.on(Method::Delete, path, middlewares, endpoint)
    }

    pub fn patch(
        self,
        path: &str,
        middlewares: impl IntoIterator<Item = Middleware>,
        endpoint: Middleware,
    ) -> Result<Self> {
        self.on(Method::Patch, path, middlewares, endpoint)
    }

    pub fn options(
        self,
        path: &str,
        middlewares: impl IntoIterator<Item = Middleware>,
        endpoint: Middleware,
    ) -> Result<Self> {
        self.on(Method::Options, path, middlewares, endpoint)
    }

    pub fn head(
        self,
        path: &str,
        middlewares: impl IntoIterator<Item = Middleware>,
        endpoint: Middleware,
    ) -> Result<Self> {
        self.on(Method::Head, path, middlewares, endpoint)
    }

    /// Replaces the handler receiving errors passed to [`Next::fail`].
    #[must_use]
    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(BoxError) -> Response + Send + Sync + 'static,
    {
        self.on_error = Arc::new(handler);
        self
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Runs the chain of the matching route.
    ///
    /// Unmatched paths get `404`; a path registered only under other methods
    /// gets `405`.
    pub fn handle(&self, mut request: Request) -> BoxFuture<'_, Response> {
        Box::pin(async move {
            let (route, params) = match self.lookup(&request) {
                Ok(found) => found,
                Err(RouterError::MethodNotAllowed { .. }) => return Response::method_not_allowed(),
                Err(_) => return Response::not_found(),
            };
            request.params = params;
            Next::start(Arc::clone(&route.stack), Arc::clone(&self.on_error))
                .run(request, Response::ok())
                .await
        })
    }

    fn lookup(&self, request: &Request) -> Result<(&Route, PathParams)> {
        let mut path_known = false;
        let candidates = self
            .routes
            .iter()
            .filter_map(|route| Some((route, route.pattern.match_path(&request.path)?)));

        for (route, params) in candidates {
            if route.method == request.method {
                return Ok((route, params));
            }
            path_known = true;
        }

        let method = request.method.to_string();
        let path = request.path.clone();
        Err(if path_known {
            RouterError::MethodNotAllowed { method, path }
        } else {
            RouterError::NotFound { method, path }
        })
    }
}
