//! HTTP methods accepted during registration.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// An HTTP method attached to a route.
///
/// Registration accepts any method name; only the seven variants other than
/// [`HttpMethod::Other`] can be bound by
/// [`RouteRegistry::apply`](crate::RouteRegistry::apply).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    /// Any other method token, stored upper-cased.
    Other(String),
}

impl HttpMethod {
    /// The methods a route can be bound with.
    pub const BINDABLE: [Self; 7] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Delete,
        Self::Patch,
        Self::Options,
        Self::Head,
    ];

    /// Parses a method name, ignoring case. Unknown names become
    /// [`HttpMethod::Other`].
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            "PATCH" => Self::Patch,
            "OPTIONS" => Self::Options,
            "HEAD" => Self::Head,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the upper-case method name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
            Self::Other(name) => name,
        }
    }

    /// Whether [`apply`](crate::RouteRegistry::apply) can bind this method.
    pub fn is_bindable(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for HttpMethod {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

/// Route tables report methods in lower case (`"get"`, `"post"`, ...).
impl Serialize for HttpMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_str().to_ascii_lowercase())
    }
}

/// One or more methods sharing a single route entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Methods(pub Vec<HttpMethod>);

impl From<HttpMethod> for Methods {
    fn from(method: HttpMethod) -> Self {
        Self(vec![method])
    }
}

impl From<Vec<HttpMethod>> for Methods {
    fn from(methods: Vec<HttpMethod>) -> Self {
        Self(methods)
    }
}

impl<const N: usize> From<[HttpMethod; N]> for Methods {
    fn from(methods: [HttpMethod; N]) -> Self {
        Self(methods.into())
    }
}

impl From<&str> for Methods {
    fn from(method: &str) -> Self {
        Self(vec![HttpMethod::parse(method)])
    }
}

impl<const N: usize> From<[&str; N]> for Methods {
    fn from(methods: [&str; N]) -> Self {
        Self(methods.into_iter().map(HttpMethod::parse).collect())
    }
}
