//! Framework adapters.
//!
//! Each adapter is behind a cargo feature of the same name; both are enabled
//! by default.

#[cfg(feature = "axum")]
pub mod axum;
#[cfg(feature = "chain")]
pub mod chain;
