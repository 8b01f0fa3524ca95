use std::fmt;
use std::sync::Arc;

use regex::Regex;

/// Pure path transformation applied before a request is forwarded
///
/// Receives the path and query string of the incoming request and returns
/// the one sent upstream.
#[derive(Clone)]
pub struct PathRewrite(Arc<dyn Fn(&str) -> String + Send + Sync>);

impl PathRewrite {
    pub fn new<F>(rewrite: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(rewrite))
    }

    /// Replace the first match of `pattern` with `replacement`
    ///
    /// `replacement` may reference capture groups as `$1` or `$name`.
    ///
    /// # Errors
    ///
    /// Returns an error if `pattern` is not a valid regex
    pub fn regex(pattern: &str, replacement: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(pattern)?;
        let replacement = replacement.to_string();

        Ok(Self::new(move |path| pattern.replace(path, replacement.as_str()).into_owned()))
    }

    /// Remove `prefix` from the start of the path, once
    pub fn strip_prefix(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self::new(move |path| path.strip_prefix(prefix.as_str()).unwrap_or(path).to_string())
    }

    pub fn apply(&self, path: &str) -> String {
        (self.0)(path)
    }
}

impl fmt::Debug for PathRewrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PathRewrite(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_rewrite() -> PathRewrite {
        PathRewrite::regex("^/api", "").unwrap()
    }

    #[test]
    fn strips_leading_api_once() {
        let rewrite = api_rewrite();
        assert_eq!(rewrite.apply("/api/users/1"), "/users/1");
        assert_eq!(rewrite.apply("/api/api/users"), "/api/users");
        assert_eq!(rewrite.apply("/api"), "");
        assert_eq!(rewrite.apply("/api/search?q=/api"), "/search?q=/api");
    }

    #[test]
    fn leaves_paths_without_prefix_unchanged() {
        let rewrite = api_rewrite();
        for path in ["/users/1", "/", "", "/v1/api/users", "/health"] {
            assert_eq!(rewrite.apply(path), path);
        }
    }

    #[test]
    fn already_rewritten_path_is_stable() {
        let rewrite = api_rewrite();
        let once = rewrite.apply("/api/users/1");
        assert_eq!(rewrite.apply(&once), once);
    }

    #[test]
    fn capture_groups_in_replacement() {
        let rewrite = PathRewrite::regex(r"^/api/v(\d+)", "/v$1/api").unwrap();
        assert_eq!(rewrite.apply("/api/v2/items"), "/v2/api/items");
    }

    #[test]
    fn strip_prefix_matches_regex_behaviour() {
        let rewrite = PathRewrite::strip_prefix("/api");
        assert_eq!(rewrite.apply("/api/users/1"), "/users/1");
        assert_eq!(rewrite.apply("/users/1"), "/users/1");
    }

    #[test]
    fn custom_function() {
        let rewrite = PathRewrite::new(str::to_uppercase);
        assert_eq!(rewrite.apply("/api/x"), "/API/X");
    }
}
