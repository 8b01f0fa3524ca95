//! Programmatic configuration builder for integration tests

use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

use devgate_config::{Config, CorsConfig, ProxyRuleConfig, ServerConfig};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// A config with no proxy rules, bound to loopback on an ephemeral port
    pub fn new() -> Self {
        Self {
            config: Config {
                plugins: Vec::new(),
                server: ServerConfig {
                    host: IpAddr::V4(Ipv4Addr::LOCALHOST),
                    port: 0,
                    root: "/nonexistent/devgate-test-root".into(),
                    ..ServerConfig::default()
                },
                telemetry: None,
            },
        }
    }

    /// The built-in `/api` rule, pointed at `target` instead of port 5000
    pub fn with_builtin_api(mut self, target: &str) -> Self {
        let mut rule = Config::builtin().server.proxy["/api"].clone();
        rule.target = target.parse().expect("valid URL");
        self.config.server.proxy.insert("/api".to_owned(), rule);
        self
    }

    /// Add a proxy rule
    pub fn with_proxy(mut self, context: &str, rule: ProxyRuleConfig) -> Self {
        self.config.server.proxy.insert(context.to_owned(), rule);
        self
    }

    /// Serve static assets from `root`
    pub fn with_root(mut self, root: &Path) -> Self {
        self.config.server.root = root.to_path_buf();
        self
    }

    pub fn without_spa_fallback(mut self) -> Self {
        self.config.server.spa_fallback = false;
        self
    }

    pub fn with_health(mut self) -> Self {
        self.config.server.health.enabled = true;
        self
    }

    pub fn with_cors(mut self, config: CorsConfig) -> Self {
        self.config.server.cors = Some(config);
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}

/// A plain rule forwarding to `target`
pub fn rule(target: &str) -> ProxyRuleConfig {
    ProxyRuleConfig::new(target.parse().expect("valid URL"))
}
