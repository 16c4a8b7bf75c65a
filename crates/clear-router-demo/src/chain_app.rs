//! The demo routes on chain-router, served with hyper.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use chain_router::{middleware, Method, Next, Request, Response, Router};
use clear_router::adapters::chain::{error_handler, Chain, HttpContext};
use clear_router::{
    bound_fn, handler, handler_fn, BoxError, Controller, ControllerRef, ControllerType,
    HandlerFn, HttpError, ResourceOptions, RouteInfo, RouteRegistry,
};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes, Incoming};
use hyper::header::{HeaderName, HeaderValue};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::StatusCode;
use hyper_util::rt::TokioIo;
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::store::{not_found, parse_id, UserInput, UserStore};

/// Largest request body the server buffers, matching the axum backend.
const BODY_LIMIT: usize = 2 * 1024 * 1024;

fn describe(req: &Request) -> Value {
    let params: Map<String, Value> = req
        .params
        .iter()
        .map(|(key, value)| (key.to_string(), Value::from(value)))
        .collect();
    json!({
        "method": req.method.as_str(),
        "path": req.path,
        "params": params,
        "query": req.query,
    })
}

fn user_input(req: &Request) -> Result<UserInput, HttpError> {
    req.json()
        .map_err(|err| HttpError::new(400, format!("invalid user: {err}")))
}

fn reply(ctx: HttpContext, message: &str) -> Response {
    let request = describe(&ctx.req);
    ctx.res.send_json(&json!({
        "status": true,
        "code": 200,
        "message": message,
        "request": request,
    }))
}

async fn directly(ctx: HttpContext) -> Result<Response, BoxError> {
    Ok(reply(ctx, "Route handler with directly function"))
}

async fn protected_directly(ctx: HttpContext) -> Result<Response, BoxError> {
    Ok(reply(ctx, "Route handler with directly function + protected middleware"))
}

struct Showcase;

impl Controller<Chain> for Showcase {
    fn action(self: Arc<Self>, name: &str) -> Option<HandlerFn<HttpContext, Response>> {
        let message = match name {
            "index" => "Route handler with object",
            "protected" => "Route handler with object + protected middleware",
            _ => return None,
        };
        Some(handler_fn(move |ctx: HttpContext| async move { Ok(reply(ctx, message)) }))
    }
}

#[derive(Default)]
struct InstanceController;

impl InstanceController {
    async fn index(self: Arc<Self>, ctx: HttpContext) -> Result<Response, BoxError> {
        Ok(reply(ctx, "Route handler with instance class"))
    }

    async fn protected(self: Arc<Self>, ctx: HttpContext) -> Result<Response, BoxError> {
        Ok(reply(ctx, "Route handler with instance class + protected middleware"))
    }
}

impl Controller<Chain> for InstanceController {
    fn action(self: Arc<Self>, name: &str) -> Option<HandlerFn<HttpContext, Response>> {
        match name {
            "index" => Some(bound_fn(self, Self::index)),
            "protected" => Some(bound_fn(self, Self::protected)),
            _ => None,
        }
    }
}

impl ControllerType<Chain> for InstanceController {}

#[derive(Default)]
struct StaticController;

impl Controller<Chain> for StaticController {
    fn action(self: Arc<Self>, _name: &str) -> Option<HandlerFn<HttpContext, Response>> {
        None
    }
}

impl ControllerType<Chain> for StaticController {
    fn static_action(name: &str) -> Option<HandlerFn<HttpContext, Response>> {
        let message = match name {
            "index" => "Route handler with static class",
            "protected" => "Route handler with static class + protected middleware",
            _ => return None,
        };
        Some(handler_fn(move |ctx: HttpContext| async move { Ok(reply(ctx, message)) }))
    }
}

struct UserController {
    store: Arc<UserStore>,
}

impl UserController {
    async fn index(self: Arc<Self>, ctx: HttpContext) -> Result<Response, BoxError> {
        Ok(ctx.res.send_json(&self.store.list()))
    }

    async fn show(self: Arc<Self>, ctx: HttpContext) -> Result<Response, BoxError> {
        let id = parse_id(ctx.req.param("id"))?;
        let user = self.store.get(id).ok_or_else(|| not_found(id))?;
        Ok(ctx.res.send_json(&user))
    }

    async fn create(self: Arc<Self>, ctx: HttpContext) -> Result<Response, BoxError> {
        let input = user_input(&ctx.req)?;
        let user = self.store.insert(input);
        info!(id = user.id, "user created");
        Ok(ctx.res.status(201).send_json(&user))
    }

    async fn update(self: Arc<Self>, ctx: HttpContext) -> Result<Response, BoxError> {
        let id = parse_id(ctx.req.param("id"))?;
        let input = user_input(&ctx.req)?;
        let user = self.store.update(id, input).ok_or_else(|| not_found(id))?;
        Ok(ctx.res.send_json(&user))
    }

    async fn destroy(self: Arc<Self>, ctx: HttpContext) -> Result<Response, BoxError> {
        let id = parse_id(ctx.req.param("id"))?;
        self.store.remove(id).ok_or_else(|| not_found(id))?;
        Ok(ctx.res.status(204))
    }
}

impl Controller<Chain> for UserController {
    fn action(self: Arc<Self>, name: &str) -> Option<HandlerFn<HttpContext, Response>> {
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
pub fn routes(store: Arc<UserStore>) -> RouteRegistry<Chain> {
    let unprotected = middleware(|req: Request, res: Response, next: Next| async move {
        debug!(path = %req.path, "unprotected route");
        next.run(req, res).await
    });
    let protected = middleware(|req: Request, res: Response, next: Next| async move {
        if req.get_query("id") == Some("12345678") {
            return next.run(req, res).await;
        }
        res.status(403)
            .send_json(&json!({"status": false, "code": 403, "message": "Forbidden"}))
    });

    let showcase = ControllerRef::shared(Showcase);
    let instance = ControllerRef::of::<InstanceController>();
    let class = ControllerRef::of::<StaticController>();

    let mut routes = RouteRegistry::<Chain>::new();

    routes.middleware([unprotected], |r| {
        r.get("directly", handler(directly), []);
        r.get("object", showcase.action("index"), []);
        r.get("instance", instance.action("index"), []);
        r.get("static", class.action("index"), []);
    });

    routes.middleware([protected], |r| {
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
            ControllerRef::shared(UserController { store }),
            ResourceOptions::new(),
        );
    });

    let table: Arc<OnceLock<Vec<RouteInfo>>> = Arc::default();
    let info = Arc::clone(&table);
    routes.get(
        "routes-info",
        handler(move |ctx: HttpContext| {
            let info = Arc::clone(&info);
            async move {
                let routes = info.get().cloned().unwrap_or_default();
                Ok(ctx.res.send_json(&json!({"total": routes.len(), "routes": routes})))
            }
        }),
        [],
    );
    table.get_or_init(|| routes.all_routes());

    routes
}

/// Buffers a request body of at most [`BODY_LIMIT`] bytes, answering `413`
/// past the limit and `400` when the body cannot be read.
async fn read_body<B>(body: B) -> Result<Vec<u8>, u16>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    match Limited::new(body, BODY_LIMIT).collect().await {
        Ok(collected) => Ok(collected.to_bytes().to_vec()),
        Err(err) if err.is::<LengthLimitError>() => {
            debug!(limit = BODY_LIMIT, "request body too large");
            Err(413)
        }
        Err(err) => {
            error!(error = %err, "failed to read request body");
            Err(400)
        }
    }
}

/// Converts a hyper request, dispatches it and converts the response back.
async fn handle_request(
    req: hyper::Request<Incoming>,
    router: Arc<Router>,
) -> Result<hyper::Response<Full<Bytes>>, Infallible> {
    let Some(method) = Method::parse(req.method().as_str()) else {
        return Ok(into_hyper(Response::method_not_allowed()));
    };
    let target = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.uri().path().to_string(), ToString::to_string);
    let mut request = Request::new(method, target);

    for (key, value) in req.headers() {
        if let Ok(v) = value.to_str() {
            request.headers.insert(key.to_string(), v.to_string());
        }
    }

    request.body = match read_body(req.into_body()).await {
        Ok(body) => body,
        Err(status) => return Ok(into_hyper(Response::new(status))),
    };

    let response = router.handle(request).await;
    Ok(into_hyper(response))
}

fn into_hyper(response: Response) -> hyper::Response<Full<Bytes>> {
    let mut out = hyper::Response::new(Full::new(Bytes::from(response.body)));
    *out.status_mut() =
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    for (key, value) in &response.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            out.headers_mut().insert(name, value);
        }
    }
    out
}

/// Binds `routes` onto a chain router and serves it over HTTP/1.
pub async fn serve(addr: SocketAddr, routes: &RouteRegistry<Chain>) -> anyhow::Result<()> {
    let router = Arc::new(routes.apply(Router::new().on_error(error_handler))?);

    let listener = TcpListener::bind(addr).await?;
    info!("chain backend listening on http://{addr}");

    loop {
        let (stream, _) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let router = Arc::clone(&router);

        tokio::task::spawn(async move {
            let service = service_fn(move |req| handle_request(req, Arc::clone(&router)));

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                error!(error = %err, "error serving connection");
            }
        });
    }
}
