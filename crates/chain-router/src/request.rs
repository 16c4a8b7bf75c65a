//! Requests as seen by chain elements.

use std::collections::HashMap;

/// The methods a route can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl Method {
    /// Every method, in registration-surface order.
    pub const ALL: [Self; 7] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Delete,
        Self::Patch,
        Self::Options,
        Self::Head,
    ];

    /// Parses a method name, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
    }

    /// Upper-case method token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values captured by `{name}` segments of the matched pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    params: HashMap<String, String>,
}

impl PathParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a captured value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    /// The value captured for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// The value captured for `key`, parsed; `None` if absent or unparsable.
    pub fn parse<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// An HTTP request travelling down a chain.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Request path, without the query string.
    pub path: String,
    /// Filled in by the router once a route matches.
    pub params: PathParams,
    /// Decoded query string.
    pub query: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl Request {
    /// Builds a request for `target`.
    ///
    /// A query string in `target` (`/search?q=rust`) is split off and parsed
    /// into [`Request::query`].
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        let target = target.into();
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path.to_string(), Self::parse_query_string(query)),
            None => (target, HashMap::new()),
        };
        Self {
            method,
            path,
            params: PathParams::new(),
            query,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Shorthand for a `GET` of `target`.
    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::Get, target)
    }

    /// Shorthand for a `POST` to `target`.
    pub fn post(target: impl Into<String>) -> Self {
        Self::new(Method::Post, target)
    }

    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a JSON body and the matching content type.
    #[must_use]
    pub fn json_body<T: serde::Serialize>(self, value: &T) -> Self {
        let body = serde_json::to_vec(value).unwrap_or_default();
        self.header("Content-Type", "application/json").body(body)
    }

    /// Adds a decoded query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Header lookup, case-insensitive on the name.
    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Shorthand for `self.params.get(key)`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key)
    }

    pub fn get_query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// The body, if it is valid UTF-8.
    pub fn body_string(&self) -> Option<String> {
        String::from_utf8(self.body.clone()).ok()
    }

    /// Deserializes the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Splits `a=1&b=2` into decoded pairs. Later duplicates win.
    pub fn parse_query_string(query: &str) -> HashMap<String, String> {
        query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (percent_decode(key), percent_decode(value))
            })
            .collect()
    }
}

/// Decodes `%XX` escapes and `+` in a form-encoded component.
fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
                match hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                    Some(byte) => {
                        out.push(byte);
                        i += 3;
                        continue;
                    }
                    None => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse_ignores_case() {
        assert_eq!(Method::parse("delete"), Some(Method::Delete));
        assert_eq!(Method::parse("Options"), Some(Method::Options));
        assert_eq!(Method::parse("TRACE"), None);
        assert!(Method::ALL.iter().all(|m| Method::parse(m.as_str()) == Some(*m)));
    }

    #[test]
    fn test_captured_params() {
        let mut params = PathParams::new();
        params.insert("post", "42");
        params.insert("slug", "hello-world");

        assert_eq!(params.parse::<u32>("post"), Some(42));
        assert_eq!(params.parse::<u32>("slug"), None);
        assert_eq!(params.get("comment"), None);
        assert_eq!(params.iter().count(), 2);
    }

    #[test]
    fn test_builders_and_lookups() {
        let req = Request::post("/api/users")
            .header("X-Request-Id", "abc")
            .query_param("dry_run", "true");

        assert_eq!(req.method, Method::Post);
        assert_eq!(req.get_header("x-request-id"), Some("abc"));
        assert_eq!(req.get_query("dry_run"), Some("true"));
        assert!(req.params.is_empty());
    }

    #[test]
    fn test_target_with_query() {
        let req = Request::get("/protected/directly?id=12345678");
        assert_eq!(req.path, "/protected/directly");
        assert_eq!(req.get_query("id"), Some("12345678"));
    }

    #[test]
    fn test_query_decoding() {
        let query = Request::parse_query_string("q=rust+router&tag=a%2Fb&caf%C3%A9=1&flag&bad=%zz&");
        assert_eq!(query["q"], "rust router");
        assert_eq!(query["tag"], "a/b");
        assert_eq!(query["café"], "1");
        assert_eq!(query["flag"], "");
        assert_eq!(query["bad"], "%zz");
        assert_eq!(query.len(), 5);
    }

    #[test]
    fn test_json_body() {
        let req = Request::post("/echo").json_body(&serde_json::json!({"x": 1}));
        assert_eq!(req.get_header("content-type"), Some("application/json"));
        let value: serde_json::Value = req.json().unwrap();
        assert_eq!(value, serde_json::json!({"x": 1}));
    }
}
