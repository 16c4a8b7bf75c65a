//! Conventional CRUD routes for a controller.

use serde::Serialize;

use crate::controller::ControllerRef;
use crate::framework::Framework;
use crate::method::HttpMethod;
use crate::registry::RouteRegistry;

/// One of the five resource actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceAction {
    Index,
    Show,
    Create,
    Update,
    Destroy,
}

impl ResourceAction {
    /// Every action, in registration order.
    pub const ALL: [Self; 5] = [
        Self::Index,
        Self::Show,
        Self::Create,
        Self::Update,
        Self::Destroy,
    ];

    /// The controller action name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Show => "show",
            Self::Create => "create",
            Self::Update => "update",
            Self::Destroy => "destroy",
        }
    }

    pub const fn method(self) -> HttpMethod {
        match self {
            Self::Index | Self::Show => HttpMethod::Get,
            Self::Create => HttpMethod::Post,
            Self::Update => HttpMethod::Put,
            Self::Destroy => HttpMethod::Delete,
        }
    }

    /// Path below the resource base.
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Index | Self::Create => "/",
            Self::Show | Self::Update | Self::Destroy => "/{id}",
        }
    }
}

/// Filters the actions [`RouteRegistry::api_resource`] registers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceOptions {
    only: Option<Vec<ResourceAction>>,
    except: Vec<ResourceAction>,
}

impl ResourceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers only `actions`, in the given order.
    #[must_use]
    pub fn only(mut self, actions: impl IntoIterator<Item = ResourceAction>) -> Self {
        self.only = Some(actions.into_iter().collect());
        self
    }

    /// Skips `actions`.
    #[must_use]
    pub fn except(mut self, actions: impl IntoIterator<Item = ResourceAction>) -> Self {
        self.except.extend(actions);
        self
    }

    fn selected(&self) -> impl Iterator<Item = ResourceAction> + '_ {
        self.only
            .as_deref()
            .unwrap_or(&ResourceAction::ALL)
            .iter()
            .copied()
            .filter(|action| !self.except.contains(action))
    }
}

impl<F: Framework> RouteRegistry<F> {
    /// Registers the resource routes of `controller` under `base_path`.
    ///
    /// | action  | method | path          |
    /// |---------|--------|---------------|
    /// | index   | GET    | `base`        |
    /// | show    | GET    | `base/{id}`   |
    /// | create  | POST   | `base`        |
    /// | update  | PUT    | `base/{id}`   |
    /// | destroy | DELETE | `base/{id}`   |
    ///
    /// Actions the controller does not respond to are skipped, as are those
    /// filtered out by `options`.
    pub fn api_resource(
        &mut self,
        base_path: &str,
        controller: ControllerRef<F>,
        options: ResourceOptions,
    ) -> &mut Self {
        for action in options.selected() {
            if !controller.responds_to(action.name()) {
                continue;
            }
            let path = format!("{base_path}{}", action.suffix());
            self.add(action.method(), &path, controller.action(action.name()), []);
        }
        self
    }
}
