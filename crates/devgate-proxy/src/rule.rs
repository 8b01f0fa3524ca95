use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use devgate_config::ProxyRuleConfig;
use devgate_core::headers::{HeaderRule, apply_header_rules};
use http::{HeaderMap, HeaderValue};
use url::Url;

use crate::{ContextMatcher, PathRewrite, ProxyError};

/// Callback run on the outgoing headers of every forwarded request
///
/// Hooks run after hop-by-hop removal, `Host` rewriting and
/// `x-forwarded-*` headers, immediately before the request is sent.
pub type RequestHook = Arc<dyn Fn(&mut HeaderMap) + Send + Sync>;

/// A routing entry: which requests to forward, where, and how
#[derive(Clone)]
pub struct ProxyRule {
    context: String,
    matcher: ContextMatcher,
    target: Url,
    change_origin: bool,
    rewrite: Option<PathRewrite>,
    hooks: Vec<RequestHook>,
    xfwd: bool,
    timeout: Option<Duration>,
}

impl ProxyRule {
    pub fn builder(context: impl Into<String>, target: Url) -> ProxyRuleBuilder {
        ProxyRuleBuilder {
            context: context.into(),
            target,
            change_origin: false,
            rewrite: None,
            hooks: Vec::new(),
            xfwd: false,
            timeout: None,
        }
    }

    /// Build a rule from its `server.proxy` entry
    ///
    /// Configured header rules become a single request hook.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Config`] if the context, rewrite, header rules
    /// or timeout are invalid
    pub fn from_config(context: &str, config: &ProxyRuleConfig) -> crate::Result<Self> {
        let mut builder = Self::builder(context, config.target.clone())
            .change_origin(config.change_origin)
            .xfwd(config.xfwd);

        if let Some(ref rewrite) = config.rewrite {
            let rewrite = PathRewrite::regex(&rewrite.pattern, &rewrite.replacement)
                .map_err(|e| ProxyError::Config(format!("invalid rewrite pattern for '{context}': {e}")))?;
            builder = builder.rewrite(rewrite);
        }

        if !config.headers.is_empty() {
            let rules = config
                .headers
                .iter()
                .map(HeaderRule::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| ProxyError::Config(format!("proxy rule '{context}': {e}")))?;
            builder = builder.header_rules(rules);
        }

        if let Some(timeout) = config
            .timeout_duration()
            .map_err(|e| ProxyError::Config(format!("proxy rule '{context}': {e}")))?
        {
            builder = builder.timeout(timeout);
        }

        builder.build()
    }

    /// The context key this rule was registered under
    pub fn context(&self) -> &str {
        &self.context
    }

    pub const fn target(&self) -> &Url {
        &self.target
    }

    pub const fn change_origin(&self) -> bool {
        self.change_origin
    }

    pub const fn xfwd(&self) -> bool {
        self.xfwd
    }

    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn matches(&self, path_and_query: &str) -> bool {
        self.matcher.matches(path_and_query)
    }

    /// Apply the rule's rewrite, or return the input unchanged
    pub fn rewrite_path(&self, path_and_query: &str) -> String {
        self.rewrite
            .as_ref()
            .map_or_else(|| path_and_query.to_string(), |rewrite| rewrite.apply(path_and_query))
    }

    /// Full upstream URL for an incoming path and query
    ///
    /// The rewritten path is appended to the target's own path; a rewrite
    /// that leaves no leading `/` gets one.
    pub fn upstream_url(&self, path_and_query: &str) -> Url {
        let rewritten = self.rewrite_path(path_and_query);
        let rewritten = if rewritten.starts_with('/') {
            rewritten
        } else {
            format!("/{rewritten}")
        };

        let (path, query) = match rewritten.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (rewritten.as_str(), None),
        };

        let mut url = self.target.clone();
        let base = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{base}{path}"));
        url.set_query(query);
        url.set_fragment(None);
        url
    }

    /// `Host` value for the target, with the port only when it is not the
    /// scheme default
    pub fn target_host(&self) -> Option<HeaderValue> {
        let host = self.target.host_str()?;
        let authority = match self.target.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        HeaderValue::try_from(authority).ok()
    }

    /// Run every request hook, in registration order
    pub fn run_hooks(&self, headers: &mut HeaderMap) {
        for hook in &self.hooks {
            hook(headers);
        }
    }
}

impl fmt::Debug for ProxyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyRule")
            .field("context", &self.context)
            .field("target", &self.target.as_str())
            .field("change_origin", &self.change_origin)
            .field("rewrite", &self.rewrite.is_some())
            .field("hooks", &self.hooks.len())
            .field("xfwd", &self.xfwd)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Builder for [`ProxyRule`]
pub struct ProxyRuleBuilder {
    context: String,
    target: Url,
    change_origin: bool,
    rewrite: Option<PathRewrite>,
    hooks: Vec<RequestHook>,
    xfwd: bool,
    timeout: Option<Duration>,
}

impl ProxyRuleBuilder {
    #[must_use]
    pub const fn change_origin(mut self, enabled: bool) -> Self {
        self.change_origin = enabled;
        self
    }

    #[must_use]
    pub fn rewrite(mut self, rewrite: PathRewrite) -> Self {
        self.rewrite = Some(rewrite);
        self
    }

    /// Register a hook that mutates outgoing headers
    #[must_use]
    pub fn on_proxy_request<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut HeaderMap) + Send + Sync + 'static,
    {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Register header rules as one hook
    #[must_use]
    pub fn header_rules(self, rules: Vec<HeaderRule>) -> Self {
        self.on_proxy_request(move |headers| apply_header_rules(headers, &rules))
    }

    #[must_use]
    pub const fn xfwd(mut self, enabled: bool) -> Self {
        self.xfwd = enabled;
        self
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// # Errors
    ///
    /// Returns [`ProxyError::Config`] if the context is empty or an invalid
    /// `^` pattern, or the target is not an http(s) URL with a host
    pub fn build(self) -> crate::Result<ProxyRule> {
        if self.context.is_empty() {
            return Err(ProxyError::Config("proxy context must not be empty".to_string()));
        }

        if !matches!(self.target.scheme(), "http" | "https") || self.target.host_str().is_none() {
            return Err(ProxyError::Config(format!(
                "proxy target for '{}' must be an http(s) URL with a host",
                self.context
            )));
        }

        let matcher = ContextMatcher::parse(&self.context)
            .map_err(|e| ProxyError::Config(format!("invalid proxy context pattern '{}': {e}", self.context)))?;

        Ok(ProxyRule {
            context: self.context,
            matcher,
            target: self.target,
            change_origin: self.change_origin,
            rewrite: self.rewrite,
            hooks: self.hooks,
            xfwd: self.xfwd,
            timeout: self.timeout,
        })
    }
}
