use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::headers::HeaderRuleConfig;

/// A single proxy rule, keyed by its context in `server.proxy`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProxyRuleConfig {
    /// Upstream base address
    pub target: Url,
    /// Rewrite the outgoing `Host` header to the target's authority
    #[serde(default)]
    pub change_origin: bool,
    /// Path rewrite applied before forwarding
    #[serde(default)]
    pub rewrite: Option<RewriteConfig>,
    /// Header rules applied to every outgoing request, in order
    #[serde(default)]
    pub headers: Vec<HeaderRuleConfig>,
    /// Add `x-forwarded-*` headers
    #[serde(default)]
    pub xfwd: bool,
    /// Upstream request timeout, e.g. `"30s"`
    #[serde(default)]
    pub timeout: Option<String>,
}

/// Regex path rewrite
///
/// Only the first match is replaced, so `^/api` strips the prefix exactly once.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RewriteConfig {
    pub pattern: String,
    #[serde(default)]
    pub replacement: String,
}

impl ProxyRuleConfig {
    /// Rule forwarding to `target` with no rewrite or header rules
    pub fn new(target: Url) -> Self {
        Self {
            target,
            change_origin: false,
            rewrite: None,
            headers: Vec::new(),
            xfwd: false,
            timeout: None,
        }
    }

    pub(crate) fn builtin_api() -> Self {
        let target = Url::parse("http://localhost:5000").expect("must be valid URL");

        Self {
            change_origin: true,
            rewrite: Some(RewriteConfig {
                pattern: "^/api".to_string(),
                replacement: String::new(),
            }),
            headers: vec![HeaderRuleConfig::insert("origin", "http://localhost:3000")],
            ..Self::new(target)
        }
    }

    /// Parse the configured timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout is not a valid duration string
    pub fn timeout_duration(&self) -> anyhow::Result<Option<Duration>> {
        self.timeout
            .as_deref()
            .map(|s| duration_str::parse(s).map_err(|e| anyhow::anyhow!("invalid timeout '{s}': {e}")))
            .transpose()
    }
}
