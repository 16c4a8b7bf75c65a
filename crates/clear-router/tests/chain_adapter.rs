//! Integration tests for the chain adapter.
//!
//! Routes are applied to a `chain_router::Router` using the adapter's error
//! handler and driven with `Router::handle`.

use std::sync::{Arc, Mutex};

use chain_router::{middleware, Middleware, Next, Request, Response};
use clear_router::adapters::chain::{error_handler, Chain, HttpContext};
use clear_router::{
    bound_fn, handler, BoxError, ConfigError, Controller, ControllerRef, ControllerType,
    HandlerFn, HttpError, ResourceOptions, RouteRegistry,
};
use serde_json::{json, Value};

// =============================================================================
// Fixtures
// =============================================================================

fn router() -> chain_router::Router {
    chain_router::Router::new().on_error(error_handler)
}

fn body(res: &Response) -> Value {
    res.body_json().unwrap_or(Value::Null)
}

#[derive(Default)]
struct PostController;

impl PostController {
    async fn index(self: Arc<Self>, ctx: HttpContext) -> Result<Response, BoxError> {
        Ok(ctx.res.send_json(&json!([{"id": 1}])))
    }

    async fn show(self: Arc<Self>, ctx: HttpContext) -> Result<Response, BoxError> {
        match ctx.req.param("id") {
            Some("1") => Ok(ctx.res.send_json(&json!({"id": 1}))),
            Some(id) => Err(HttpError::new(404, format!("post {id} not found")).into()),
            None => Err("missing id".into()),
        }
    }

    async fn destroy(self: Arc<Self>, ctx: HttpContext) -> Result<Response, BoxError> {
        Ok(ctx.res.status(204))
    }
}

impl Controller<Chain> for PostController {
    fn action(self: Arc<Self>, name: &str) -> Option<HandlerFn<HttpContext, Response>> {
        match name {
            "index" => Some(bound_fn(self, Self::index)),
            "show" => Some(bound_fn(self, Self::show)),
            "destroy" => Some(bound_fn(self, Self::destroy)),
            _ => None,
        }
    }
}

impl ControllerType<Chain> for PostController {}

async fn create(ctx: HttpContext) -> Result<Response, BoxError> {
    let input: Value = ctx.req.json()?;
    Ok(ctx.res.status(201).send_json(&input))
}

fn step(trace: &Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> Middleware {
    let trace = Arc::clone(trace);
    middleware(move |req: Request, res: Response, next: Next| {
        let trace = Arc::clone(&trace);
        async move {
            trace.lock().unwrap().push(name);
            next.run(req, res).await
        }
    })
}

fn require_id() -> Middleware {
    middleware(|req: Request, res: Response, next: Next| async move {
        if req.get_query("id") == Some("12345678") {
            next.run(req, res).await
        } else {
            res.status(403).send_json(&json!({"message": "Forbidden"}))
        }
    })
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_function_handler() {
    let mut routes = RouteRegistry::<Chain>::new();
    routes.get(
        "/hello",
        handler(|ctx: HttpContext| async move { Ok(ctx.res.send_json(&json!({"message": "hi"}))) }),
        [],
    );
    routes.post("/posts", handler(create), []);
    let app = routes.apply(router()).unwrap();

    let res = app.handle(Request::get("/hello")).await;
    assert_eq!(res.status, 200);
    assert_eq!(body(&res), json!({"message": "hi"}));

    let res = app
        .handle(Request::post("/posts").json_body(&json!({"title": "t"})))
        .await;
    assert_eq!(res.status, 201);
    assert_eq!(body(&res)["title"], "t");
}

#[tokio::test]
async fn test_middleware_order_and_short_circuit() {
    let trace = Arc::new(Mutex::new(Vec::new()));
    let mut routes = RouteRegistry::<Chain>::new();

    routes.middleware([step(&trace, "global")], |r| {
        r.group_with("/protected", [step(&trace, "group"), require_id()], |r| {
            let seen = Arc::clone(&trace);
            r.get(
                "/",
                handler(move |ctx: HttpContext| {
                    let seen = Arc::clone(&seen);
                    async move {
                        seen.lock().unwrap().push("handler");
                        Ok(ctx.res.send_text("ok"))
                    }
                }),
                [step(&trace, "route")],
            );
        });
    });
    let app = routes.apply(router()).unwrap();

    let res = app.handle(Request::get("/protected?id=1")).await;
    assert_eq!(res.status, 403);
    assert_eq!(body(&res), json!({"message": "Forbidden"}));
    assert_eq!(*trace.lock().unwrap(), ["global", "group"]);

    trace.lock().unwrap().clear();
    let res = app.handle(Request::get("/protected?id=12345678")).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body_string().as_deref(), Some("ok"));
    assert_eq!(*trace.lock().unwrap(), ["global", "group", "route", "handler"]);
}

#[tokio::test]
async fn test_api_resource_and_errors() {
    let mut routes = RouteRegistry::<Chain>::new();
    routes.api_resource("/posts", ControllerRef::of::<PostController>(), ResourceOptions::new());
    let app = routes.apply(router()).unwrap();

    // create and update are not implemented
    assert_eq!(app.routes().len(), 3);

    let res = app.handle(Request::get("/posts/1")).await;
    assert_eq!(res.status, 200);
    assert_eq!(body(&res)["id"], 1);

    let res = app.handle(Request::get("/posts/2")).await;
    assert_eq!(res.status, 404);
    assert_eq!(body(&res), json!({"error": "post 2 not found", "status": 404}));

    let res = app
        .handle(Request::new(chain_router::Method::Delete, "/posts/1"))
        .await;
    assert_eq!(res.status, 204);

    let res = app.handle(Request::post("/posts")).await;
    assert_eq!(res.status, 405);
}

#[tokio::test]
async fn test_plain_error_is_500() {
    let mut routes = RouteRegistry::<Chain>::new();
    routes.post("/posts", handler(create), []);
    let app = routes.apply(router()).unwrap();

    let res = app.handle(Request::post("/posts").body("{oops")).await;
    assert_eq!(res.status, 500);
    assert_eq!(body(&res)["status"], 500);
}

#[test]
fn test_configuration_errors() {
    let mut routes = RouteRegistry::<Chain>::new();
    routes.get("/posts", ControllerRef::of::<PostController>().action("archive"), []);
    assert!(matches!(
        routes.apply(router()),
        Err(ConfigError::MissingAction { ref method, .. }) if method == "archive"
    ));

    routes.reset();
    routes.get("/files/{*rest}/more", handler(create), []);
    assert!(matches!(
        routes.apply(router()),
        Err(ConfigError::InvalidPath { .. })
    ));

    routes.reset();
    routes.get("/a", handler(create), []);
    routes.get("/a/", handler(create), []);
    assert!(matches!(
        routes.apply(router()),
        Err(ConfigError::DuplicateRoute { .. })
    ));
}
