//! Binding the route table onto a router.

use std::collections::HashSet;

use tracing::{debug, error, info};

use crate::error::{ConfigError, Result};
use crate::framework::{Binding, Framework};
use crate::method::HttpMethod;
use crate::registry::RouteRegistry;
use crate::resolver::resolve;

impl<F: Framework> RouteRegistry<F> {
    /// Binds every route onto `router`, in registration order.
    ///
    /// Controller actions are looked up here. Any configuration error aborts
    /// the bind and drops `router`, so a partially configured router is never
    /// returned. The registry is left untouched; applying it again to another
    /// router yields an independent copy of the routes.
    pub fn apply<R: Binding<F>>(&self, mut router: R) -> Result<R> {
        let mut seen: HashSet<(&HttpMethod, &str)> = HashSet::new();
        let mut bound = 0usize;

        for entry in self.routes() {
            let handler = resolve(entry)?;

            for method in entry.methods() {
                if !method.is_bindable() {
                    return Err(fail(ConfigError::UnsupportedMethod {
                        method: method.clone(),
                        path: entry.path().to_string(),
                    }));
                }
                if !seen.insert((method, entry.path())) {
                    return Err(fail(ConfigError::DuplicateRoute {
                        method: method.clone(),
                        path: entry.path().to_string(),
                    }));
                }

                debug!(
                    target: "clear_router",
                    %method,
                    path = entry.path(),
                    middlewares = entry.middlewares().len(),
                    "binding route"
                );
                router = router
                    .bind(method, entry.path(), entry.middlewares(), handler.clone())
                    .inspect_err(|err| error!(target: "clear_router", %err, "router rejected route"))?;
                bound += 1;
            }
        }

        info!(target: "clear_router", routes = bound, "routes applied");
        Ok(router)
    }
}

fn fail(err: ConfigError) -> ConfigError {
    error!(target: "clear_router", %err, "route configuration error");
    err
}
