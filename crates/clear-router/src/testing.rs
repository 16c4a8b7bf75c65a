//! A framework whose router records bindings, for unit tests.

use std::sync::Arc;

use crate::controller::{Controller, ControllerType};
use crate::error::Result;
use crate::framework::{Binding, Framework, HandlerFn};
use crate::handler::handler_fn;
use crate::method::HttpMethod;

/// Handlers take and return strings; middleware are labels.
pub(crate) struct Probe;

impl Framework for Probe {
    type Context = String;
    type Output = String;
    type Middleware = &'static str;
}

pub(crate) struct Bound {
    pub method: HttpMethod,
    pub path: String,
    pub middlewares: Vec<&'static str>,
    pub handler: HandlerFn<String, String>,
}

#[derive(Default)]
pub(crate) struct Recorder {
    pub bound: Vec<Bound>,
}

impl Binding<Probe> for Recorder {
    fn bind(
        mut self,
        method: &HttpMethod,
        path: &str,
        middlewares: &[&'static str],
        handler: HandlerFn<String, String>,
    ) -> Result<Self> {
        self.bound.push(Bound {
            method: method.clone(),
            path: path.to_string(),
            middlewares: middlewares.to_vec(),
            handler,
        });
        Ok(self)
    }
}

/// Answers a fixed set of action names with `"<action>:<context>"`.
#[derive(Default)]
pub(crate) struct Echo;

impl Echo {
    pub const ACTIONS: [&'static str; 5] = ["index", "show", "create", "update", "destroy"];
}

impl Controller<Probe> for Echo {
    fn action(self: Arc<Self>, name: &str) -> Option<HandlerFn<String, String>> {
        let name = Self::ACTIONS.into_iter().find(|a| *a == name)?;
        Some(handler_fn(move |ctx: String| async move { Ok(format!("{name}:{ctx}")) }))
    }
}

impl ControllerType<Probe> for Echo {}
