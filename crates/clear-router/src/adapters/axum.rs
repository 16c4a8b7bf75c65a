//! Adapter for [`axum`], whose handlers receive a single request value.
//!
//! Handlers get an [`Event`] and return an axum [`Response`]. Middleware are
//! [`AxumMiddleware`] values, installed as `from_fn` layers on each route so
//! they run in registration order before the handler. A handler error is
//! answered by [`error_response`].
//!
//! ```ignore
//! use clear_router::adapters::axum::{middleware, Axum, Event};
//!
//! let auth = middleware(|req, next| async move {
//!     if req.headers().contains_key("authorization") {
//!         next.run(req).await
//!     } else {
//!         StatusCode::FORBIDDEN.into_response()
//!     }
//! });
//!
//! let mut routes = RouteRegistry::<Axum>::new();
//! routes.group_with("/admin", [auth], |r| {
//!     r.get("/stats", handler(|event: Event| async move { ... }), []);
//! });
//! let app = routes.apply(axum::Router::new())?;
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use ::axum::body::{to_bytes, Body, Bytes};
use ::axum::extract::{FromRequestParts, Query, RawPathParams, Request};
use ::axum::http::{HeaderMap, Method, StatusCode, Uri};
use ::axum::middleware::{from_fn, Next};
use ::axum::response::{IntoResponse, Response};
use ::axum::routing::{on, MethodFilter, MethodRouter};
use ::axum::Json;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::error::{BoxError, ConfigError, HttpError, Result};
use crate::framework::{Binding, Framework, HandlerFn};
use crate::method::HttpMethod;

/// Largest request body [`Event`] will buffer.
pub const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// An axum middleware: the request and the rest of the stack in, a response
/// out.
pub type AxumMiddleware = Arc<dyn Fn(Request, Next) -> BoxFuture<'static, Response> + Send + Sync>;

/// Wraps an async closure as an [`AxumMiddleware`].
pub fn middleware<F, Fut>(f: F) -> AxumMiddleware
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |req, next| Box::pin(f(req, next)))
}

/// Framework marker for [`axum::Router`](::axum::Router).
#[derive(Debug, Clone, Copy, Default)]
pub struct Axum;

impl Framework for Axum {
    type Context = Event;
    type Output = Response;
    type Middleware = AxumMiddleware;
}

/// The request seen by an axum handler, with its path parameters.
#[derive(Debug)]
pub struct Event {
    request: Request,
    params: HashMap<String, String>,
    body: Option<Bytes>,
}

impl Event {
    pub fn new(request: Request, params: HashMap<String, String>) -> Self {
        Self {
            request,
            params,
            body: None,
        }
    }

    pub fn method(&self) -> &Method {
        self.request.method()
    }

    pub fn uri(&self) -> &Uri {
        self.request.uri()
    }

    pub fn path(&self) -> &str {
        self.request.uri().path()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.request.headers()
    }

    /// A header value, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers().get(name).and_then(|v| v.to_str().ok())
    }

    /// A path parameter captured by a `{name}` segment.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Deserializes the query string, answering `400` when it does not fit
    /// `T`.
    pub fn query<T: DeserializeOwned>(&self) -> std::result::Result<T, BoxError> {
        Query::<T>::try_from_uri(self.uri())
            .map(|Query(query)| query)
            .map_err(|rejection| HttpError::new(400, rejection.body_text()).into())
    }

    /// A single query parameter.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query::<HashMap<String, String>>()
            .ok()
            .and_then(|mut query| query.remove(name))
    }

    /// Reads the request body, up to [`BODY_LIMIT`] bytes.
    ///
    /// The body is buffered on first read; later reads return the same bytes.
    pub async fn bytes(&mut self) -> std::result::Result<Bytes, BoxError> {
        if let Some(body) = &self.body {
            return Ok(body.clone());
        }
        let body = std::mem::take(self.request.body_mut());
        let bytes = to_bytes(body, BODY_LIMIT)
            .await
            .map_err(|err| HttpError::new(413, format!("failed to read request body: {err}")))?;
        self.body = Some(bytes.clone());
        Ok(bytes)
    }

    pub async fn text(&mut self) -> std::result::Result<String, BoxError> {
        let bytes = self.bytes().await?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| HttpError::new(400, "request body is not valid UTF-8").into())
    }

    /// Deserializes a JSON body, answering `400` when it is malformed.
    pub async fn json<T: DeserializeOwned>(&mut self) -> std::result::Result<T, BoxError> {
        let bytes = self.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|err| HttpError::new(400, format!("invalid JSON body: {err}")).into())
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Hands back the underlying request. A buffered body is put back.
    pub fn into_request(self) -> Request {
        let mut request = self.request;
        if let Some(body) = self.body {
            *request.body_mut() = Body::from(body);
        }
        request
    }
}

/// Answers a handler error with `{"error": message, "status": code}`.
///
/// The status is taken from an [`HttpError`], or `500` for anything else.
pub fn error_response(err: &BoxError) -> Response {
    let status = StatusCode::from_u16(HttpError::status_of(err))
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(target: "clear_router", status = status.as_u16(), error = %err, "request failed");
    } else {
        debug!(target: "clear_router", status = status.as_u16(), error = %err, "request rejected");
    }
    let body = serde_json::json!({
        "error": err.to_string(),
        "status": status.as_u16(),
    });
    (status, Json(body)).into_response()
}

fn method_filter(method: &HttpMethod) -> Option<MethodFilter> {
    match method {
        HttpMethod::Get => Some(MethodFilter::GET),
        HttpMethod::Post => Some(MethodFilter::POST),
        HttpMethod::Put => Some(MethodFilter::PUT),
        HttpMethod::Delete => Some(MethodFilter::DELETE),
        HttpMethod::Patch => Some(MethodFilter::PATCH),
        HttpMethod::Options => Some(MethodFilter::OPTIONS),
        HttpMethod::Head => Some(MethodFilter::HEAD),
        HttpMethod::Other(_) => None,
    }
}

/// Rejects paths axum refuses to route. Captures are `{name}` or `{*name}`,
/// each spanning a whole segment, with `{*name}` last.
fn validate_path(path: &str) -> Result<()> {
    let invalid = |reason: &str| ConfigError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    let segments: Vec<&str> = path.split('/').collect();
    let mut names: Vec<&str> = Vec::new();
    for (index, segment) in segments.iter().enumerate() {
        if segment.starts_with(':') {
            return Err(invalid("`:name` captures are written `{name}`"));
        }
        if segment.starts_with('*') {
            return Err(invalid("`*name` wildcards are written `{*name}`"));
        }
        if !segment.contains(['{', '}']) {
            continue;
        }
        let Some(inner) = segment
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .filter(|inner| !inner.contains(['{', '}']))
        else {
            return Err(invalid("captures must span a whole segment"));
        };
        let (name, catch_all) = match inner.strip_prefix('*') {
            Some(name) => (name, true),
            None => (inner, false),
        };
        if name.is_empty() {
            return Err(invalid("empty capture name"));
        }
        if catch_all && index + 1 != segments.len() {
            return Err(invalid("`{*name}` must be the last segment"));
        }
        if names.contains(&name) {
            return Err(invalid("repeated capture name"));
        }
        names.push(name);
    }
    Ok(())
}

/// Adds `route` at `path`. axum panics when the path conflicts with one
/// already on the router (the same segment captured under another name, an
/// overlapping method); that panic becomes [`ConfigError::InvalidPath`].
fn insert_route<S>(
    router: ::axum::Router<S>,
    path: &str,
    route: MethodRouter<S>,
) -> Result<::axum::Router<S>>
where
    S: Clone + Send + Sync + 'static,
{
    panic::catch_unwind(AssertUnwindSafe(|| router.route(path, route))).map_err(|payload| {
        let reason = payload
            .downcast_ref::<String>()
            .map(String::as_str)
            .or_else(|| payload.downcast_ref::<&str>().copied())
            .unwrap_or("rejected by axum");
        ConfigError::InvalidPath {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    })
}

async fn path_params(request: Request) -> (Request, HashMap<String, String>) {
    let (mut parts, body) = request.into_parts();
    let params = RawPathParams::from_request_parts(&mut parts, &())
        .await
        .map(|raw| {
            raw.iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect()
        })
        .unwrap_or_default();
    (Request::from_parts(parts, body), params)
}

impl<S> Binding<Axum> for ::axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn bind(
        self,
        method: &HttpMethod,
        path: &str,
        middlewares: &[AxumMiddleware],
        handler: HandlerFn<Event, Response>,
    ) -> Result<Self> {
        let Some(filter) = method_filter(method) else {
            return Err(ConfigError::UnsupportedMethod {
                method: method.clone(),
                path: path.to_string(),
            });
        };
        validate_path(path)?;

        let endpoint = move |request: Request| {
            let handler = Arc::clone(&handler);
            async move {
                let (request, params) = path_params(request).await;
                match handler(Event::new(request, params)).await {
                    Ok(response) => response,
                    Err(err) => error_response(&err),
                }
            }
        };

        // The last layer added runs first. Route layers leave the 405
        // fallback of a path shared by several methods unwrapped.
        let mut route = on(filter, endpoint);
        for mw in middlewares.iter().rev() {
            let mw = Arc::clone(mw);
            route = route.route_layer(from_fn(move |req: Request, next: Next| mw(req, next)));
        }

        insert_route(self, path, route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejection(path: &str) -> String {
        match validate_path(path) {
            Err(ConfigError::InvalidPath { path: rejected, reason }) => {
                assert_eq!(rejected, path);
                reason
            }
            other => panic!("expected InvalidPath for {path}, got {other:?}"),
        }
    }

    #[test]
    fn test_accepts_brace_captures() {
        for path in ["/", "/users/{id}", "/files/{*rest}", "/a/{x}/b/{y}", "/static/app.js"] {
            assert!(validate_path(path).is_ok(), "{path}");
        }
    }

    #[test]
    fn test_rejects_colon_and_star_segments() {
        assert!(rejection("/users/:id").contains("{name}"));
        assert!(rejection("/files/*rest").contains("{*name}"));
    }

    #[test]
    fn test_rejects_malformed_captures() {
        assert_eq!(rejection("/a/{}"), "empty capture name");
        assert_eq!(rejection("/a/{*}"), "empty capture name");
        assert_eq!(rejection("/files/{*rest}/x"), "`{*name}` must be the last segment");
        assert_eq!(rejection("/users/{id}.json"), "captures must span a whole segment");
        assert_eq!(rejection("/users/{id"), "captures must span a whole segment");
        assert_eq!(rejection("/users/{{id}}"), "captures must span a whole segment");
        assert_eq!(rejection("/a/{id}/b/{id}"), "repeated capture name");
    }

    #[test]
    fn test_conflicting_capture_names_are_config_errors() {
        let ok = |_: Event| async move { Ok::<_, BoxError>(StatusCode::OK.into_response()) };
        let router = ::axum::Router::<()>::new();
        let router = router
            .bind(&HttpMethod::Get, "/users/{id}", &[], crate::handler_fn(ok))
            .unwrap();
        let err = router
            .bind(&HttpMethod::Delete, "/users/{user_id}", &[], crate::handler_fn(ok))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            ConfigError::InvalidPath { ref path, ref reason }
                if path == "/users/{user_id}" && reason.contains("conflict")
        ));
    }

    #[test]
    fn test_error_response_status() {
        let forbidden: BoxError = Box::new(HttpError::new(403, "Forbidden"));
        assert_eq!(error_response(&forbidden).status(), StatusCode::FORBIDDEN);

        let other: BoxError = "boom".into();
        assert_eq!(error_response(&other).status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bogus: BoxError = Box::new(HttpError::new(42, "not a status"));
        assert_eq!(error_response(&bogus).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_event_accessors() {
        let request = ::axum::http::Request::builder()
            .method("POST")
            .uri("/users/7?sort=name&page=2")
            .header("x-token", "abc")
            .body(Body::from(r#"{"name":"ada"}"#))
            .unwrap();
        let params = HashMap::from([("id".to_string(), "7".to_string())]);
        let mut event = Event::new(request, params);

        assert_eq!(event.method(), Method::POST);
        assert_eq!(event.path(), "/users/7");
        assert_eq!(event.param("id"), Some("7"));
        assert_eq!(event.header("x-token"), Some("abc"));
        assert_eq!(event.query_param("page").as_deref(), Some("2"));

        let body: serde_json::Value = event.json().await.unwrap();
        assert_eq!(body["name"], "ada");
        // Buffered: a second read sees the same body.
        assert_eq!(event.text().await.unwrap(), r#"{"name":"ada"}"#);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let request = ::axum::http::Request::builder().uri("/").body(Body::from("{")).unwrap();
        let mut event = Event::new(request, HashMap::new());
        let err = event.json::<serde_json::Value>().await.unwrap_err();
        assert_eq!(HttpError::status_of(&err), 400);
    }
}
