use regex::Regex;

/// How a proxy context selects requests
///
/// Contexts starting with `^` are regular expressions; anything else is a
/// plain prefix. Both are tested against the path and query string.
#[derive(Debug, Clone)]
pub enum ContextMatcher {
    Prefix(String),
    Pattern(Regex),
}

impl ContextMatcher {
    /// Parse a context key from `server.proxy`
    ///
    /// # Errors
    ///
    /// Returns an error if a `^` context is not a valid regex
    pub fn parse(context: &str) -> Result<Self, regex::Error> {
        if context.starts_with('^') {
            Regex::new(context).map(Self::Pattern)
        } else {
            Ok(Self::Prefix(context.to_string()))
        }
    }

    pub fn matches(&self, path_and_query: &str) -> bool {
        match self {
            Self::Prefix(prefix) => path_and_query.starts_with(prefix.as_str()),
            Self::Pattern(pattern) => pattern.is_match(path_and_query),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_matches_start_of_path_only() {
        let matcher = ContextMatcher::parse("/api").unwrap();
        assert!(matcher.matches("/api"));
        assert!(matcher.matches("/api/users/1"));
        assert!(matcher.matches("/api?debug=1"));
        assert!(!matcher.matches("/app/api"));
        assert!(!matcher.matches("/"));
        assert!(!matcher.matches("/assets/index.js"));
    }

    #[test]
    fn caret_context_is_a_regex() {
        let matcher = ContextMatcher::parse(r"^/v\d+/").unwrap();
        assert!(matches!(matcher, ContextMatcher::Pattern(_)));
        assert!(matcher.matches("/v2/items"));
        assert!(!matcher.matches("/vx/items"));
    }

    #[test]
    fn invalid_regex_context() {
        assert!(ContextMatcher::parse("^/api/(").is_err());
    }
}
