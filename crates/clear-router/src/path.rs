//! Path normalization.

/// Normalizes a route path.
///
/// Runs of `/` collapse, empty segments disappear, the result starts with a
/// single `/` and never ends with one unless it is the bare root.
///
/// ```
/// use clear_router::normalize_path;
///
/// assert_eq!(normalize_path("//a//b/"), "/a/b");
/// assert_eq!(normalize_path("a/b"), "/a/b");
/// assert_eq!(normalize_path(""), "/");
/// ```
pub fn normalize_path(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len() + 1);
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        normalized.push('/');
        normalized.push_str(segment);
    }
    if normalized.is_empty() {
        normalized.push('/');
    }
    normalized
}

/// Joins `path` under `prefix` and normalizes the result.
pub(crate) fn join_path(prefix: &str, path: &str) -> String {
    normalize_path(&format!("{prefix}/{path}"))
}
