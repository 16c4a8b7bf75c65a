//! Responses threaded through a chain.
//!
//! A fresh `200 OK` response is handed to the first element of every chain;
//! each middleware or endpoint passes it along (possibly modified) or returns
//! its own.

use std::collections::HashMap;

/// Status, headers and body of the reply being built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl Response {
    /// An empty response with `status`.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(200)
    }

    /// `200` with `data` as the JSON body.
    pub fn json<T: serde::Serialize>(data: &T) -> Self {
        Self::ok().send_json(data)
    }

    /// `200` with a plain text body.
    pub fn text(body: impl Into<String>) -> Self {
        Self::ok().send_text(body)
    }

    /// `200` with an HTML body.
    pub fn html(body: impl Into<String>) -> Self {
        Self::ok().send_html(body)
    }

    /// Answer for a path no route matches.
    pub fn not_found() -> Self {
        Self::new(404).send_text("Not Found")
    }

    /// Answer for a path matched only under other methods.
    pub fn method_not_allowed() -> Self {
        Self::new(405).send_text("Method Not Allowed")
    }

    pub fn internal_server_error() -> Self {
        Self::new(500).send_text("Internal Server Error")
    }

    /// Replaces the body with serialized JSON, keeping the current status.
    ///
    /// Serialization failure turns the response into a 500.
    #[must_use]
    pub fn send_json<T: serde::Serialize>(self, data: &T) -> Self {
        match serde_json::to_vec(data) {
            Ok(body) => self.header("Content-Type", "application/json").body(body),
            Err(_) => Self::internal_server_error(),
        }
    }

    /// Replaces the body with plain text, keeping the current status.
    #[must_use]
    pub fn send_text(self, body: impl Into<String>) -> Self {
        self.header("Content-Type", "text/plain; charset=utf-8")
            .body(body.into().into_bytes())
    }

    /// Replaces the body with HTML, keeping the current status.
    #[must_use]
    pub fn send_html(self, body: impl Into<String>) -> Self {
        self.header("Content-Type", "text/html; charset=utf-8")
            .body(body.into().into_bytes())
    }

    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// The body, if it is valid UTF-8.
    pub fn body_string(&self) -> Option<String> {
        String::from_utf8(self.body.clone()).ok()
    }

    /// Deserializes the body as JSON.
    pub fn body_json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::ok()
    }
}
