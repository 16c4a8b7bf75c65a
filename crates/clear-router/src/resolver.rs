//! Turns a route's [`Handler`] into the callable that gets bound.

use tracing::error;

use crate::error::{ConfigError, Result};
use crate::framework::{Framework, HandlerFn};
use crate::handler::Handler;
use crate::registry::RouteEntry;

/// Resolves the handler of `entry`.
///
/// Functions pass through. Controller references are looked up by action
/// name, reporting the route path when the lookup fails.
pub(crate) fn resolve<F: Framework>(
    entry: &RouteEntry<F>,
) -> Result<HandlerFn<F::Context, F::Output>> {
    resolve_handler(entry.handler(), entry.path()).inspect_err(|err| {
        error!(target: "clear_router", path = entry.path(), %err, "failed to resolve handler");
    })
}

fn resolve_handler<F: Framework>(
    handler: &Handler<F>,
    path: &str,
) -> Result<HandlerFn<F::Context, F::Output>> {
    match handler {
        Handler::Function(f) => Ok(f.clone()),
        Handler::Controller { method, .. } if method.trim().is_empty() => {
            Err(ConfigError::InvalidHandler {
                path: path.to_string(),
            })
        }
        Handler::Controller { controller, method } => {
            controller
                .resolve(method)
                .ok_or_else(|| ConfigError::MissingAction {
                    method: method.clone(),
                    controller: controller.name().to_string(),
                    path: path.to_string(),
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ControllerRef;
    use crate::handler::handler;
    use crate::registry::RouteRegistry;
    use crate::testing::{Echo, Probe};

    fn only_entry(registry: &RouteRegistry<Probe>) -> &RouteEntry<Probe> {
        &registry.routes()[0]
    }

    #[tokio::test]
    async fn test_function_passes_through() {
        let mut r = RouteRegistry::<Probe>::new();
        r.get("/f", handler(|ctx: String| async move { Ok(ctx.to_uppercase()) }), []);
        let f = resolve(only_entry(&r)).unwrap();
        assert_eq!(f("abc".to_string()).await.unwrap(), "ABC");
    }

    #[tokio::test]
    async fn test_controller_action_is_bound() {
        let mut r = RouteRegistry::<Probe>::new();
        r.get("/users", ControllerRef::<Probe>::of::<Echo>().action("index"), []);
        let f = resolve(only_entry(&r)).unwrap();
        assert_eq!(f("req".to_string()).await.unwrap(), "index:req");
    }

    #[test]
    fn test_missing_action() {
        let mut r = RouteRegistry::<Probe>::new();
        r.get("/users", (ControllerRef::<Probe>::of::<Echo>(), "missing").into(), []);
        match resolve(only_entry(&r)) {
            Err(ConfigError::MissingAction {
                method,
                controller,
                path,
            }) => {
                assert_eq!(method, "missing");
                assert_eq!(controller, "Echo");
                assert_eq!(path, "/users");
            }
            other => panic!("expected MissingAction, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_empty_action_name_is_invalid() {
        let mut r = RouteRegistry::<Probe>::new();
        r.get("/bad", ControllerRef::<Probe>::shared(Echo).action(""), []);
        assert!(matches!(
            resolve(only_entry(&r)),
            Err(ConfigError::InvalidHandler { path }) if path == "/bad"
        ));
    }
}
