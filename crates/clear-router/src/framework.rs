//! The seam between the framework-agnostic core and a concrete router.
//!
//! An adapter supplies two things: a [`Framework`] marker naming the types its
//! handlers and middleware use, and a [`Binding`] implementation for the
//! router it targets. Everything else (registry, resolution, ordering,
//! validation) is shared.

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::{BoxError, Result};
use crate::method::HttpMethod;

/// A resolved route handler: one context in, a response (or error) out.
pub type HandlerFn<C, O> = Arc<dyn Fn(C) -> BoxFuture<'static, std::result::Result<O, BoxError>> + Send + Sync>;

/// Names the types a framework adapter works with.
pub trait Framework: Send + Sync + 'static {
    /// Uniform context handed to every handler.
    type Context: Send + 'static;
    /// What a successful handler produces.
    type Output: Send + 'static;
    /// The framework's native middleware value.
    type Middleware: Clone + Send + Sync + 'static;
}

/// A router that routes can be bound onto.
///
/// `bind` registers `handler` behind `middlewares` (in the given order) for
/// `method` and `path`. The implementation wraps `handler`: it builds the
/// framework's [`Framework::Context`] from the native invocation, awaits the
/// handler, and forwards an `Err` into the framework's error channel.
///
/// Routers are taken and returned by value so builder-style routers work
/// unchanged.
pub trait Binding<F: Framework>: Sized {
    /// Registers one method of one route.
    fn bind(
        self,
        method: &HttpMethod,
        path: &str,
        middlewares: &[F::Middleware],
        handler: HandlerFn<F::Context, F::Output>,
    ) -> Result<Self>;
}
