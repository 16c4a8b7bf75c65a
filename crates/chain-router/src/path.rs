//! Route patterns: literal segments, `{name}` captures and a trailing
//! `{*rest}` capture.

use regex::Regex;

use crate::error::{Result, RouterError};
use crate::request::PathParams;

/// A route pattern compiled to an anchored regex.
#[derive(Debug, Clone)]
pub struct PathPattern {
    pattern: String,
    regex: Regex,
    /// Capture names, in the order their groups appear in `regex`.
    param_names: Vec<String>,
}

impl PathPattern {
    /// Compiles `pattern`.
    ///
    /// A `{name}` segment captures one path segment; `{*name}` captures the
    /// rest of the path and must come last. Empty, repeated or partial-segment
    /// captures are rejected.
    ///
    /// ```
    /// use chain_router::PathPattern;
    ///
    /// let pattern = PathPattern::parse("/api/users/{id}").unwrap();
    /// let params = pattern.match_path("/api/users/7").unwrap();
    /// assert_eq!(params.get("id"), Some("7"));
    /// assert!(pattern.match_path("/api/users").is_none());
    /// ```
    pub fn parse(pattern: &str) -> Result<Self> {
        let mut param_names: Vec<String> = Vec::new();
        let mut regex_str = String::from("^");
        let parts: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();

        let invalid = |reason| RouterError::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };

        for (i, part) in parts.iter().enumerate() {
            regex_str.push('/');

            if let Some(param) = part.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                let (name, wildcard) = match param.strip_prefix('*') {
                    Some(name) => (name, true),
                    None => (param, false),
                };
                if name.is_empty() {
                    return Err(invalid("empty capture name"));
                }
                if param_names.iter().any(|n| n == name) {
                    return Err(invalid("repeated capture name"));
                }
                if wildcard && i + 1 != parts.len() {
                    return Err(invalid("`{*name}` must be the last segment"));
                }
                param_names.push(name.to_string());
                regex_str.push_str(if wildcard { "(.+)" } else { "([^/]+)" });
            } else if part.contains(['{', '}']) {
                return Err(invalid("captures must span a whole segment"));
            } else {
                regex_str.push_str(&regex::escape(part));
            }
        }

        regex_str.push_str("/?$");

        let regex = Regex::new(&regex_str).map_err(|_| invalid("does not compile"))?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            param_names,
        })
    }

    /// The captures of `path`, or `None` if it does not match. A single
    /// trailing slash is tolerated.
    pub fn match_path(&self, path: &str) -> Option<PathParams> {
        let caps = self.regex.captures(path)?;

        let mut params = PathParams::new();

        for (i, name) in self.param_names.iter().enumerate() {
            if let Some(value) = caps.get(i + 1) {
                params.insert(name.clone(), value.as_str().to_string());
            }
        }

        Some(params)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_segments() {
        let pattern = PathPattern::parse("/routes-info").unwrap();
        assert!(pattern.match_path("/routes-info").unwrap().is_empty());
        assert!(pattern.match_path("/routes-info/").is_some());
        assert!(pattern.match_path("/routes").is_none());
        assert_eq!(pattern.pattern(), "/routes-info");
    }

    #[test]
    fn test_root() {
        let pattern = PathPattern::parse("/").unwrap();
        assert!(pattern.match_path("/").is_some());
        assert!(pattern.match_path("/directly").is_none());
    }

    #[test]
    fn test_captures() {
        let pattern = PathPattern::parse("/api/{resource}/{id}").unwrap();
        let params = pattern.match_path("/api/users/12").unwrap();
        assert_eq!(params.get("resource"), Some("users"));
        assert_eq!(params.get("id"), Some("12"));
        assert_eq!(pattern.param_names(), ["resource", "id"]);
        assert!(pattern.match_path("/api/users/12/extra").is_none());
    }

    #[test]
    fn test_rest_capture() {
        let pattern = PathPattern::parse("/assets/{*file}").unwrap();
        let params = pattern.match_path("/assets/css/site.css").unwrap();
        assert_eq!(params.get("file"), Some("css/site.css"));
        assert!(pattern.match_path("/assets").is_none());
    }

    #[test]
    fn test_rejected_patterns() {
        for bad in ["/a/{*rest}/b", "/a/{}", "/a/{id}/{id}", "/a/v{id}", "/a/{id"] {
            assert!(PathPattern::parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_literal_is_escaped() {
        let pattern = PathPattern::parse("/v1.0/status").unwrap();
        assert!(pattern.match_path("/v1x0/status").is_none());
    }
}
