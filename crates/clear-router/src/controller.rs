//! Controllers: named actions looked up when routes are applied.
//!
//! A controller is referenced in one of two ways:
//!
//! - [`ControllerRef::shared`] wraps an existing value. Actions are looked up
//!   on that value directly (an object of functions, or a ready instance).
//! - [`ControllerRef::of`] names a controller *type*. Class-level actions
//!   ([`ControllerType::static_action`]) are looked up first; if none matches,
//!   a fresh instance is constructed and its instance actions are searched.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use clear_router::{bound_fn, Controller, ControllerRef, ControllerType, HandlerFn};
//! use clear_router::adapters::axum::{Axum, Event};
//!
//! #[derive(Default)]
//! struct UserController;
//!
//! impl Controller<Axum> for UserController {
//!     fn action(self: Arc<Self>, name: &str) -> Option<HandlerFn<Event, Response>> {
//!         match name {
//!             "index" => Some(bound_fn(self, |this, event| async move { this.index(event).await })),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! impl ControllerType<Axum> for UserController {}
//!
//! registry.get("/users", ControllerRef::of::<UserController>().action("index"), []);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::framework::{Framework, HandlerFn};
use crate::handler::Handler;

/// A value exposing actions by name.
pub trait Controller<F: Framework>: Send + Sync + 'static {
    /// Returns the action named `name`, bound to this controller.
    fn action(self: Arc<Self>, name: &str) -> Option<HandlerFn<F::Context, F::Output>>;
}

/// A controller type that can be instantiated on demand.
pub trait ControllerType<F: Framework>: Controller<F> + Default {
    /// Class-level actions, consulted before any instance is constructed.
    fn static_action(name: &str) -> Option<HandlerFn<F::Context, F::Output>> {
        let _ = name;
        None
    }
}

enum Target<F: Framework> {
    Shared(Arc<dyn Controller<F>>),
    Type {
        statics: fn(&str) -> Option<HandlerFn<F::Context, F::Output>>,
        construct: fn() -> Arc<dyn Controller<F>>,
    },
}

/// A reference to a controller, resolved by name at bind time.
pub struct ControllerRef<F: Framework> {
    name: String,
    target: Target<F>,
}

fn construct<F: Framework, T: ControllerType<F>>() -> Arc<dyn Controller<F>> {
    Arc::new(T::default())
}

fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

impl<F: Framework> ControllerRef<F> {
    /// References an existing controller value.
    pub fn shared<T: Controller<F>>(controller: T) -> Self {
        Self::from_arc(Arc::new(controller))
    }

    /// References an existing, already shared controller value.
    pub fn from_arc<T: Controller<F>>(controller: Arc<T>) -> Self {
        Self {
            name: short_type_name::<T>(),
            target: Target::Shared(controller),
        }
    }

    /// References a controller type: class-level actions first, then an
    /// instance built with [`Default`].
    pub fn of<T: ControllerType<F>>() -> Self {
        Self {
            name: short_type_name::<T>(),
            target: Target::Type {
                statics: <T as ControllerType<F>>::static_action,
                construct: construct::<F, T>,
            },
        }
    }

    /// Overrides the name reported in configuration errors.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The controller's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds a handler referencing the action `method`.
    pub fn action(&self, method: impl Into<String>) -> Handler<F> {
        Handler::action(self.clone(), method)
    }

    /// Looks up `method`, returning it bound to its receiver.
    pub fn resolve(&self, method: &str) -> Option<HandlerFn<F::Context, F::Output>> {
        match &self.target {
            Target::Shared(controller) => Arc::clone(controller).action(method),
            Target::Type { statics, construct } => {
                statics(method).or_else(|| construct().action(method))
            }
        }
    }

    /// Whether `method` resolves to an action.
    pub fn responds_to(&self, method: &str) -> bool {
        self.resolve(method).is_some()
    }
}

impl<F: Framework> Clone for ControllerRef<F> {
    fn clone(&self) -> Self {
        let target = match &self.target {
            Target::Shared(controller) => Target::Shared(Arc::clone(controller)),
            Target::Type { statics, construct } => Target::Type {
                statics: *statics,
                construct: *construct,
            },
        };
        Self {
            name: self.name.clone(),
            target,
        }
    }
}

impl<F: Framework> fmt::Debug for ControllerRef<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.target {
            Target::Shared(_) => "shared",
            Target::Type { .. } => "type",
        };
        f.debug_struct("ControllerRef")
            .field("name", &self.name)
            .field("kind", &kind)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{bound_fn, handler_fn};
    use crate::testing::Probe;

    #[derive(Default)]
    struct Greeter {
        greeting: &'static str,
    }

    impl Controller<Probe> for Greeter {
        fn action(self: Arc<Self>, name: &str) -> Option<HandlerFn<String, String>> {
            match name {
                "greet" | "shadowed" => Some(bound_fn(self, |this: Arc<Self>, who: String| async move {
                    Ok(format!("{}instance {who}", this.greeting))
                })),
                _ => None,
            }
        }
    }

    impl ControllerType<Probe> for Greeter {
        fn static_action(name: &str) -> Option<HandlerFn<String, String>> {
            match name {
                "shadowed" | "class_only" => {
                    Some(handler_fn(|who: String| async move { Ok(format!("static {who}")) }))
                }
                _ => None,
            }
        }
    }

    async fn call(f: HandlerFn<String, String>, arg: &str) -> String {
        f(arg.to_string()).await.unwrap()
    }

    #[tokio::test]
    async fn test_type_prefers_static_actions() {
        let ctrl = ControllerRef::<Probe>::of::<Greeter>();
        assert_eq!(ctrl.name(), "Greeter");
        assert_eq!(call(ctrl.resolve("shadowed").unwrap(), "a").await, "static a");
        assert_eq!(call(ctrl.resolve("class_only").unwrap(), "b").await, "static b");
        assert_eq!(call(ctrl.resolve("greet").unwrap(), "c").await, "instance c");
        assert!(ctrl.resolve("missing").is_none());
    }

    #[tokio::test]
    async fn test_shared_uses_the_given_instance() {
        let ctrl = ControllerRef::<Probe>::shared(Greeter { greeting: "hi " });
        assert_eq!(call(ctrl.resolve("greet").unwrap(), "x").await, "hi instance x");
        // Class-level actions belong to the type, not the shared value.
        assert!(!ctrl.responds_to("class_only"));
    }

    #[test]
    fn test_named_override() {
        let ctrl = ControllerRef::<Probe>::of::<Greeter>().named("Greetings");
        assert_eq!(ctrl.name(), "Greetings");
        assert_eq!(ctrl.clone().name(), "Greetings");
    }
}
