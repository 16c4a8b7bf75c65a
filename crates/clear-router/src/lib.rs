//! # clear-router
//!
//! Declarative routes, bound onto a router you already have.
//!
//! This crate provides:
//! - A route registry with nested path-prefix groups and middleware scopes
//! - Handlers that are plain async functions or named controller actions
//! - Conventional CRUD routes for a controller (`api_resource`)
//! - A binder that resolves every handler and registers the routes, in order,
//!   on an [`axum::Router`](::axum::Router) or a [`chain_router::Router`]
//!
//! ## Quick Start
//!
//! ```ignore
//! use clear_router::adapters::axum::{Axum, Event};
//! use clear_router::{handler, ControllerRef, ResourceOptions, RouteRegistry};
//!
//! let mut routes = RouteRegistry::<Axum>::new();
//!
//! routes.get("/hello", handler(|_event: Event| async move {
//!     Ok(Json(json!({"message": "hi"})).into_response())
//! }), []);
//!
//! routes.group_with("/api", [auth], |r| {
//!     r.api_resource("/users", ControllerRef::of::<UserController>(), ResourceOptions::new());
//! });
//!
//! let app = routes.apply(axum::Router::new())?;
//! ```
//!
//! ## Middleware Order
//!
//! A route's middleware run in this order: those of enclosing
//! [`RouteRegistry::middleware`] scopes, outermost first; then those of
//! enclosing groups, outermost first; then the route's own.
//!
//! ## Controllers
//!
//! Controller actions are looked up by name when the routes are applied, so a
//! misspelt action fails [`RouteRegistry::apply`] with
//! [`ConfigError::MissingAction`] instead of surfacing on the first request.
//! See [`ControllerRef`].
//!
//! ## Adapters
//!
//! The core is generic over a [`Framework`] marker; each adapter implements
//! [`Binding`] for its router. Adapters are selected with the `axum` and
//! `chain` cargo features.

pub mod adapters;
mod binder;
mod controller;
mod error;
mod framework;
mod handler;
mod method;
mod path;
mod registry;
mod resolver;
mod resource;

#[cfg(test)]
mod testing;

pub use controller::{Controller, ControllerRef, ControllerType};
pub use error::{BoxError, ConfigError, HttpError, Result};
pub use framework::{Binding, Framework, HandlerFn};
pub use handler::{bound_fn, handler, handler_fn, Handler, HandlerType};
pub use method::{HttpMethod, Methods};
pub use path::normalize_path;
pub use registry::{RouteEntry, RouteInfo, RouteRegistry};
pub use resource::{ResourceAction, ResourceOptions};
