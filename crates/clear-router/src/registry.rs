//! The route registry: an ordered route table plus the prefix and middleware
//! stacks active while routes are declared.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use tracing::trace;

use crate::framework::Framework;
use crate::handler::{Handler, HandlerType};
use crate::method::{HttpMethod, Methods};
use crate::path::join_path;

/// One registered route.
pub struct RouteEntry<F: Framework> {
    methods: Vec<HttpMethod>,
    path: String,
    handler: Handler<F>,
    middlewares: Vec<F::Middleware>,
}

impl<F: Framework> RouteEntry<F> {
    /// The methods sharing this entry, in registration order.
    pub fn methods(&self) -> &[HttpMethod] {
        &self.methods
    }

    /// The normalized absolute path.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn handler(&self) -> &Handler<F> {
        &self.handler
    }

    /// Global, then group, then route-local middleware.
    pub fn middlewares(&self) -> &[F::Middleware] {
        &self.middlewares
    }

    /// The read-only projection reported by
    /// [`RouteRegistry::all_routes`].
    pub fn info(&self) -> RouteInfo {
        RouteInfo {
            methods: self.methods.clone(),
            path: self.path.clone(),
            middleware_count: self.middlewares.len(),
            handler_type: self.handler.handler_type(),
        }
    }
}

impl<F: Framework> fmt::Debug for RouteEntry<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("methods", &self.methods)
            .field("path", &self.path)
            .field("handler", &self.handler)
            .field("middlewares", &self.middlewares.len())
            .finish()
    }
}

/// Introspection view of a route, serializable for diagnostics endpoints.
///
/// Serializes as `{"methods": ["get"], "path": "/x", "middlewareCount": 1,
/// "handlerType": "function"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteInfo {
    pub methods: Vec<HttpMethod>,
    pub path: String,
    pub middleware_count: usize,
    pub handler_type: HandlerType,
}

/// Stack values saved on entry to a scoped callback.
struct Scope<F: Framework> {
    prefix: String,
    group_middlewares: Vec<F::Middleware>,
    global_middlewares: Vec<F::Middleware>,
}

/// Collects routes declared through nested groups and middleware scopes.
///
/// Registration is synchronous and needs `&mut self`; once every route is
/// declared, [`RouteRegistry::apply`] binds the table onto a router.
///
/// # Example
///
/// ```ignore
/// let mut routes = RouteRegistry::<Axum>::new();
///
/// routes.middleware([log.clone()], |r| {
///     r.group("/api", |r| {
///         r.get("/users", handler(list_users), []);
///         r.post("/users", handler(create_user), [validate.clone()]);
///     });
/// });
///
/// let app = routes.apply(axum::Router::new())?;
/// ```
pub struct RouteRegistry<F: Framework> {
    routes: Vec<RouteEntry<F>>,
    prefix: String,
    group_middlewares: Vec<F::Middleware>,
    global_middlewares: Vec<F::Middleware>,
}

impl<F: Framework> Default for RouteRegistry<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Framework> RouteRegistry<F> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            prefix: String::new(),
            group_middlewares: Vec::new(),
            global_middlewares: Vec::new(),
        }
    }

    /// Registers `handler` for `methods` at `path`, below the current group
    /// prefix.
    ///
    /// The stored middleware are the active global middleware, then the
    /// active group middleware, then `middlewares`.
    pub fn add(
        &mut self,
        methods: impl Into<Methods>,
        path: &str,
        handler: Handler<F>,
        middlewares: impl IntoIterator<Item = F::Middleware>,
    ) -> &mut Self {
        let Methods(methods) = methods.into();
        let path = join_path(&self.prefix, path);
        let middlewares = self
            .global_middlewares
            .iter()
            .chain(&self.group_middlewares)
            .cloned()
            .chain(middlewares)
            .collect();

        trace!(?methods, %path, "route registered");
        self.routes.push(RouteEntry {
            methods,
            path,
            handler,
            middlewares,
        });
        self
    }

    /// Registers a GET route.
    pub fn get(
        &mut self,
        path: &str,
        handler: Handler<F>,
        middlewares: impl IntoIterator<Item = F::Middleware>,
    ) -> &mut Self {
        self.add(HttpMethod::Get, path, handler, middlewares)
    }

    /// Registers a POST route.
    pub fn post(
        &mut self,
        path: &str,
        handler: Handler<F>,
        middlewares: impl IntoIterator<Item = F::Middleware>,
    ) -> &mut Self {
        self.add(HttpMethod::Post, path, handler, middlewares)
    }

    /// Registers a PUT route.
    pub fn put(
        &mut self,
        path: &str,
        handler: Handler<F>,
        middlewares: impl IntoIterator<Item = F::Middleware>,
    ) -> &mut Self {
        self.add(HttpMethod::Put, path, handler, middlewares)
    }

    /// Registers a DELETE route.
    pub fn delete(
        &mut self,
        path: &str,
        handler: Handler<F>,
        middlewares: impl IntoIterator<Item = F::Middleware>,
    ) -> &mut Self {
        self.add(HttpMethod::Delete, path, handler, middlewares)
    }

    /// Registers a PATCH route.
    pub fn patch(
        &mut self,
        path: &str,
        handler: Handler<F>,
        middlewares: impl IntoIterator<Item = F::Middleware>,
    ) -> &mut Self {
        self.add(HttpMethod::Patch, path, handler, middlewares)
    }

    /// Registers an OPTIONS route.
    pub fn options(
        &mut self,
        path: &str,
        handler: Handler<F>,
        middlewares: impl IntoIterator<Item = F::Middleware>,
    ) -> &mut Self {
        self.add(HttpMethod::Options, path, handler, middlewares)
    }

    /// Registers a HEAD route.
    pub fn head(
        &mut self,
        path: &str,
        handler: Handler<F>,
        middlewares: impl IntoIterator<Item = F::Middleware>,
    ) -> &mut Self {
        self.add(HttpMethod::Head, path, handler, middlewares)
    }

    /// Runs `routes` with `prefix` appended to the current prefix.
    ///
    /// See [`RouteRegistry::group_with`].
    pub fn group<R>(&mut self, prefix: &str, routes: impl FnOnce(&mut Self) -> R) -> R {
        self.group_with(prefix, [], routes)
    }

    /// Runs `routes` with `prefix` appended to the current prefix and
    /// `middlewares` appended to the group middleware.
    ///
    /// Both are restored when `routes` returns, whether it returns normally,
    /// returns an error value, or panics.
    pub fn group_with<R>(
        &mut self,
        prefix: &str,
        middlewares: impl IntoIterator<Item = F::Middleware>,
        routes: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let saved = self.save();
        self.prefix = join_path(&saved.prefix, prefix);
        self.group_middlewares.extend(middlewares);
        self.scoped(saved, routes)
    }

    /// Runs `routes` with `middlewares` appended to the global middleware.
    ///
    /// Global middleware run before any group middleware, including for
    /// routes declared in groups nested inside `routes`.
    pub fn middleware<R>(
        &mut self,
        middlewares: impl IntoIterator<Item = F::Middleware>,
        routes: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let saved = self.save();
        self.global_middlewares.extend(middlewares);
        self.scoped(saved, routes)
    }

    /// Projects every route, in registration order.
    pub fn all_routes(&self) -> Vec<RouteInfo> {
        self.routes.iter().map(RouteEntry::info).collect()
    }

    /// The registered routes, in registration order.
    pub fn routes(&self) -> &[RouteEntry<F>] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Drops every route and clears the prefix and middleware stacks.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// The prefix applied to routes registered now.
    pub fn current_prefix(&self) -> &str {
        if self.prefix.is_empty() {
            "/"
        } else {
            &self.prefix
        }
    }

    fn save(&self) -> Scope<F> {
        Scope {
            prefix: self.prefix.clone(),
            group_middlewares: self.group_middlewares.clone(),
            global_middlewares: self.global_middlewares.clone(),
        }
    }

    fn scoped<R>(&mut self, saved: Scope<F>, routes: impl FnOnce(&mut Self) -> R) -> R {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| routes(&mut *self)));

        self.prefix = saved.prefix;
        self.group_middlewares = saved.group_middlewares;
        self.global_middlewares = saved.global_middlewares;

        match outcome {
            Ok(value) => value,
            Err(payload) => panic::resume_unwind(payload),
        }
    }
}

impl<F: Framework> fmt::Debug for RouteRegistry<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteRegistry")
            .field("routes", &self.routes)
            .field("prefix", &self.current_prefix())
            .finish_non_exhaustive()
    }
}
