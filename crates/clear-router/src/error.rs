//! Error types for registration and binding.

use thiserror::Error;

use crate::method::HttpMethod;

/// Boxed error returned by route handlers.
///
/// Anything implementing [`std::error::Error`] converts into it, so handlers
/// can use `?` freely.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Configuration errors raised while binding routes onto a router.
///
/// These abort [`RouteRegistry::apply`](crate::RouteRegistry::apply); they are
/// never per-request failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A controller reference names an action the controller does not have.
    #[error("method \"{method}\" not found in controller \"{controller}\" for route {path}")]
    MissingAction {
        /// The action name that failed to resolve.
        method: String,
        /// The controller's name.
        controller: String,
        /// Path of the route holding the reference.
        path: String,
    },

    /// A handler is not a usable callable or controller reference.
    #[error("invalid handler format for route: {path}")]
    InvalidHandler {
        /// Path of the offending route.
        path: String,
    },

    /// The route uses a method outside the bindable set.
    #[error("invalid HTTP method: {method} for route: {path}")]
    UnsupportedMethod {
        /// The rejected method.
        method: HttpMethod,
        /// Path of the offending route.
        path: String,
    },

    /// The same method and path were registered twice.
    #[error("duplicate route: {method} {path}")]
    DuplicateRoute {
        /// The repeated method.
        method: HttpMethod,
        /// The repeated path.
        path: String,
    },

    /// The underlying router cannot accept the path.
    #[error("invalid path for route {path}: {reason}")]
    InvalidPath {
        /// The rejected path.
        path: String,
        /// Why the router refused it.
        reason: String,
    },
}

/// Result type alias for binding operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// A request-time error that carries an HTTP status.
///
/// Adapters answer with `status` instead of `500` when a handler fails with
/// this error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HttpError {
    /// Status code of the error response.
    pub status: u16,
    /// Message placed in the error body.
    pub message: String,
}

impl HttpError {
    /// Creates an error answered with `status`.
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Finds the status to answer a handler error with.
    pub fn status_of(err: &BoxError) -> u16 {
        err.downcast_ref::<Self>().map_or(500, |e| e.status)
    }
}
