//! The demo routes on axum.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use clear_router::adapters::axum::{middleware, Axum, Event};
use clear_router::{
    bound_fn, handler, handler_fn, BoxError, Controller, ControllerRef, ControllerType,
    HandlerFn, ResourceOptions, RouteInfo, RouteRegistry,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::store::{not_found, parse_id, UserInput, UserStore};

fn describe(event: &Event) -> Value {
    json!({
        "method": event.method().as_str(),
        "path": event.path(),
        "params": event.params(),
        "query": event.query::<HashMap<String, String>>().unwrap_or_default(),
    })
}

fn reply(event: &Event, message: &str) -> Response {
    Json(json!({
        "status": true,
        "code": 200,
        "message": message,
        "request": describe(event),
    }))
    .into_response()
}

async fn unprotected(req: Request, next: Next) -> Response {
    debug!(path = req.uri().path(), "unprotected route");
    next.run(req).await
}

/// Lets the request through only with `?id=12345678`.
async fn protected(req: Request, next: Next) -> Response {
    let id = req
        .uri()
        .query()
        .and_then(|query| query.split('&').find_map(|pair| pair.strip_prefix("id=")));
    if id == Some("12345678") {
        return next.run(req).await;
    }
    let body = json!({"status": false, "code": 403, "message": "Forbidden"});
    (StatusCode::FORBIDDEN, Json(body)).into_response()
}

async fn directly(event: Event) -> Result<Response, BoxError> {
    Ok(reply(&event, "Route handler with directly function"))
}

async fn protected_directly(event: Event) -> Result<Response, BoxError> {
    Ok(reply(&event, "Route handler with directly function + protected middleware"))
}

/// A plain value exposing actions.
struct Showcase;

impl Controller<Axum> for Showcase {
    fn action(self: Arc<Self>, name: &str) -> Option<HandlerFn<Event, Response>> {
        let message = match name {
            "index" => "Route handler with object",
            "protected" => "Route handler with object + protected middleware",
            _ => return None,
        };
        Some(handler_fn(move |event: Event| async move { Ok(reply(&event, message)) }))
    }
}

/// Actions live on instances, built when the routes are applied.
struct InstanceController {
    label: &'static str,
}

impl Default for InstanceController {
    fn default() -> Self {
        Self {
            label: "instance class",
        }
    }
}

impl InstanceController {
    async fn index(self: Arc<Self>, event: Event) -> Result<Response, BoxError> {
        Ok(reply(&event, &format!("Route handler with {}", self.label)))
    }

    async fn protected(self: Arc<Self>, event: Event) -> Result<Response, BoxError> {
        Ok(reply(&event, &format!("Route handler with {} + protected middleware", self.label)))
    }
}

impl Controller<Axum> for InstanceController {
    fn action(self: Arc<Self>, name: &str) -> Option<HandlerFn<Event, Response>> {
        match name {
            "index" => Some(bound_fn(self, Self::index)),
            "protected" => Some(bound_fn(self, Self::protected)),
            _ => None,
        }
    }
}

impl ControllerType<Axum> for InstanceController {}

/// Actions live on the type itself.
#[derive(Default)]
struct StaticController;

impl Controller<Axum> for StaticController {
    fn action(self: Arc<Self>, _name: &str) -> Option<HandlerFn<Event, Response>> {
        None
    }
}

impl ControllerType<Axum> for StaticController {
    fn static_action(name: &str) -> Option<HandlerFn<Event, Response>> {
        let message = match name {
            "index" => "Route handler with static class",
            "protected" => "Route handler with static class + protected middleware",
            _ => return None,
        };
        Some(handler_fn(move |event: Event| async move { Ok(reply(&event, message)) }))
    }
}

struct UserController {
    store: Arc<UserStore>,
}

impl UserController {
    async fn index(self: Arc<Self>, _event: Event) -> Result<Response, BoxError> {
        Ok(Json(self.store.list()).into_response())
    }

    async fn show(self: Arc<Self>, event: Event) -> Result<Response, BoxError> {
        let id = parse_id(event.param("id"))?;
        let user = self.store.get(id).ok_or_else(|| not_found(id))?;
        Ok(Json(user).into_response())
    }

    async fn create(self: Arc<Self>, mut event: Event) -> Result<Response, BoxError> {
        let input: UserInput = event.json().await?;
        let user = self.store.insert(input);
        info!(id = user.id, "user created");
        Ok((StatusCode::CREATED, Json(user)).into_response())
    }

    async fn update(self: Arc<Self>, mut event: Event) -> Result<Response, BoxError> {
        let id = parse_id(event.param("id"))?;
        let input: UserInput = event.json().await?;
        let user = self.store.update(id, input).ok_or_else(|| not_found(id))?;
        Ok(Json(user).into_response())
    }

    async fn destroy(self: Arc<Self>, event: Event) -> Result<Response, BoxError> {
        let id = parse_id(event.param("id"))?;
        self.store.remove(id).ok_or_else(|| not_found(id))?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}

impl Controller<Axum> for UserController {
    fn action(self: Arc<Self>, name: &str) -> Option<HandlerFn<Event, Response>> {
        match name {
            "index" => Some(bound_fn(self, Self::index)),
            "show" => Some(bound_fn(self, Self::show)),
            "create" => Some(bound_fn(self, Self::create)),
            "update" => Some(bound_fn(self, Self::update)),
            "destroy" => Some(bound_fn(self, Self::destroy)),
            _ => None,
        }
    }
}

/// Declares the demo routes.
pub fn routes(store: Arc<UserStore>) -> RouteRegistry<Axum> {
    let showcase = ControllerRef::shared(Showcase);
    let instance = ControllerRef::of::<InstanceController>();
    let class = ControllerRef::of::<StaticController>();

    let mut routes = RouteRegistry::<Axum>::new();

    routes.middleware([middleware(unprotected)], |r| {
        r.get("directly", handler(directly), []);
        r.get("object", showcase.action("index"), []);
        r.get("instance", instance.action("index"), []);
        r.get("static", class.action("index"), []);
    });

    routes.middleware([middleware(protected)], |r| {
        r.group("protected", |r| {
            r.get("directly", handler(protected_directly), []);
            r.get("object", showcase.action("protected"), []);
            r.get("instance", instance.action("protected"), []);
            r.get("static", class.action("protected"), []);
        });
    });

    routes.group("api", |r| {
        r.api_resource(
            "users",
            ControllerRef::shared(UserController { store }).named("Users"),
            ResourceOptions::new(),
        );
    });

    let table: Arc<OnceLock<Vec<RouteInfo>>> = Arc::default();
    let info = Arc::clone(&table);
    routes.get(
        "routes-info",
        handler(move |_event: Event| {
            let info = Arc::clone(&info);
            async move {
                let routes = info.get().cloned().unwrap_or_default();
                Ok(Json(json!({"total": routes.len(), "routes": routes})).into_response())
            }
        }),
        [],
    );
    table.get_or_init(|| routes.all_routes());

    routes
}

/// Binds `routes` onto an axum router and serves it.
pub async fn serve(addr: SocketAddr, routes: &RouteRegistry<Axum>) -> anyhow::Result<()> {
    let app: axum::Router = routes.apply(axum::Router::new())?;

    let listener = TcpListener::bind(addr).await?;
    info!("axum backend listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;

    async fn call(uri: &str) -> (StatusCode, Value) {
        let app: axum::Router = routes(Arc::new(UserStore::default()))
            .apply(axum::Router::new())
            .unwrap();
        let request = axum::http::Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_handler_styles() {
        for (uri, message) in [
            ("/directly", "Route handler with directly function"),
            ("/object", "Route handler with object"),
            ("/instance", "Route handler with instance class"),
            ("/static", "Route handler with static class"),
        ] {
            let (status, body) = call(uri).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(body["message"], message);
        }
    }

    #[tokio::test]
    async fn test_protected_group() {
        let (status, body) = call("/protected/static").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Forbidden");

        let (status, body) = call("/protected/instance?id=12345678").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["request"]["query"]["id"], "12345678");
    }

    #[tokio::test]
    async fn test_routes_info() {
        let (status, body) = call("/routes-info").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 14);
        assert_eq!(body["routes"][4]["path"], "/protected/directly");
        assert_eq!(body["routes"][4]["middlewareCount"], 1);
    }

    #[tokio::test]
    async fn test_users_resource() {
        let (status, body) = call("/api/users/1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Ada Lovelace");

        let (status, body) = call("/api/users/7").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], 404);
    }
}
