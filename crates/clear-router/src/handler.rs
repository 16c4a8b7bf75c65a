//! Route handlers.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;

use crate::controller::ControllerRef;
use crate::error::BoxError;
use crate::framework::{Framework, HandlerFn};

/// Wraps an async closure as a [`HandlerFn`].
pub fn handler_fn<C, O, H, Fut>(f: H) -> HandlerFn<C, O>
where
    C: 'static,
    O: 'static,
    H: Fn(C) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, BoxError>> + Send + 'static,
{
    Arc::new(move |ctx| Box::pin(f(ctx)))
}

/// Wraps an async closure as a [`HandlerFn`] bound to `receiver`.
///
/// Used by [`Controller`](crate::Controller) implementations to hand out
/// instance actions.
pub fn bound_fn<T, C, O, H, Fut>(receiver: Arc<T>, f: H) -> HandlerFn<C, O>
where
    T: ?Sized + Send + Sync + 'static,
    C: 'static,
    O: 'static,
    H: Fn(Arc<T>, C) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, BoxError>> + Send + 'static,
{
    Arc::new(move |ctx| Box::pin(f(Arc::clone(&receiver), ctx)))
}

/// What a route invokes: a plain function, or an action looked up on a
/// controller when the routes are applied.
pub enum Handler<F: Framework> {
    /// A callable taking the framework context.
    Function(HandlerFn<F::Context, F::Output>),
    /// A `(controller, method name)` reference.
    Controller {
        controller: ControllerRef<F>,
        method: String,
    },
}

impl<F: Framework> Handler<F> {
    /// Creates a handler from an async closure.
    pub fn from_fn<H, Fut>(f: H) -> Self
    where
        H: Fn(F::Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<F::Output, BoxError>> + Send + 'static,
    {
        Self::Function(handler_fn(f))
    }

    /// Creates a reference to the action `method` of `controller`.
    pub fn action(controller: ControllerRef<F>, method: impl Into<String>) -> Self {
        Self::Controller {
            controller,
            method: method.into(),
        }
    }

    pub fn handler_type(&self) -> HandlerType {
        match self {
            Self::Function(_) => HandlerType::Function,
            Self::Controller { .. } => HandlerType::Controller,
        }
    }
}

/// Shorthand for [`Handler::from_fn`].
pub fn handler<F, H, Fut>(f: H) -> Handler<F>
where
    F: Framework,
    H: Fn(F::Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<F::Output, BoxError>> + Send + 'static,
{
    Handler::from_fn(f)
}

impl<F: Framework> Clone for Handler<F> {
    fn clone(&self) -> Self {
        match self {
            Self::Function(f) => Self::Function(Arc::clone(f)),
            Self::Controller { controller, method } => Self::Controller {
                controller: controller.clone(),
                method: method.clone(),
            },
        }
    }
}

impl<F: Framework> fmt::Debug for Handler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(_) => f.write_str("Handler::Function"),
            Self::Controller { controller, method } => f
                .debug_struct("Handler::Controller")
                .field("controller", &controller.name())
                .field("method", method)
                .finish(),
        }
    }
}

impl<F: Framework, M: Into<String>> From<(ControllerRef<F>, M)> for Handler<F> {
    fn from((controller, method): (ControllerRef<F>, M)) -> Self {
        Self::action(controller, method)
    }
}

/// How a route's handler was declared, as reported by
/// [`RouteRegistry::all_routes`](crate::RouteRegistry::all_routes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerType {
    Function,
    Controller,
}
