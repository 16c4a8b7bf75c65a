//! # chain-router
//!
//! A small HTTP router whose routes are continuation chains: each middleware
//! receives `(request, response, next)` and either calls `next.run(..)`,
//! answers directly, or hands an error to `next.fail(..)`.
//!
//! This crate provides:
//! - Path pattern matching with `{param}` and `{*rest}` segments
//! - Per-route middleware stacks
//! - A replaceable error handler, reached through [`Next::fail`]
//!
//! ## Quick Start
//!
//! ```ignore
//! use chain_router::{middleware, Request, Response, Router};
//!
//! let hello = middleware(|_req, res: Response, _next| async move {
//!     res.send_json(&serde_json::json!({"message": "hi"}))
//! });
//!
//! let router = Router::new().get("/hello", [], hello)?;
//!
//! let response = router.handle(Request::get("/hello")).await;
//! assert_eq!(response.status, 200);
//! ```

mod chain;
mod error;
mod path;
mod request;
mod response;
mod router;

pub use chain::{default_error_handler, middleware, ErrorHandler, Middleware, Next};
pub use error::{BoxError, Result, RouterError};
pub use path::PathPattern;
pub use request::{Method, PathParams, Request};
pub use response::Response;
pub use router::{Route, Router};
