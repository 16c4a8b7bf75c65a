//! Routing errors.

use thiserror::Error;

/// Boxed error forwarded through a chain with [`Next::fail`](crate::Next::fail).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("no route matched: {method} {path}")]
    NotFound { method: String, path: String },

    /// The path matched, but only under other methods.
    #[error("method not allowed: {method} for {path}")]
    MethodNotAllowed { method: String, path: String },

    /// A route pattern failed to compile.
    #[error("invalid path pattern {pattern}: {reason}")]
    InvalidPattern {
        pattern: String,
        reason: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, RouterError>;
