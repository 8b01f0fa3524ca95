#![allow(clippy::must_use_candidate)]

pub mod cors;
mod env;
pub mod headers;
pub mod health;
mod loader;
pub mod plugin;
pub mod proxy;
pub mod server;
pub mod telemetry;

use serde::Deserialize;

pub use cors::*;
pub use headers::*;
pub use health::*;
pub use plugin::*;
pub use proxy::*;
pub use server::*;
pub use telemetry::{ExportProtocol, ExporterConfig, TelemetryConfig, TracingConfig};

/// Top-level devgate configuration
///
/// Built once at startup, either from [`Config::builtin`] or from a TOML
/// file via [`Config::load`], and never mutated once the server is running.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Framework plugin descriptors, in declaration order
    #[serde(default)]
    pub plugins: Vec<PluginConfig>,
    /// Dev server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}

impl Config {
    /// The stock front-end setup: a `vue` plugin, port 3000, and `/api`
    /// forwarded to a backend on port 5000
    ///
    /// Unlike [`Config::default`], which is what an empty TOML file
    /// deserializes to, this always carries the `/api` rule.
    pub fn builtin() -> Self {
        Self {
            plugins: vec![PluginConfig::named("vue")],
            server: ServerConfig::builtin(),
            telemetry: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    use super::*;

    #[test]
    fn builtin_listens_on_port_3000() {
        let config = Config::builtin();
        assert_eq!(
            config.server.listen_address(),
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000)
        );
    }

    #[test]
    fn builtin_forwards_api_to_backend() {
        let config = Config::builtin();
        assert_eq!(config.server.proxy.len(), 1);

        let (context, rule) = config.server.proxy.first().unwrap();
        assert_eq!(context, "/api");
        assert_eq!(rule.target.as_str(), "http://localhost:5000/");
        assert!(rule.change_origin);

        let rewrite = rule.rewrite.as_ref().unwrap();
        assert_eq!(rewrite.pattern, "^/api");
        assert_eq!(rewrite.replacement, "");

        assert_eq!(rule.headers, [HeaderRuleConfig::insert("origin", "http://localhost:3000")]);
    }

    #[test]
    fn builtin_declares_vue_plugin() {
        let config = Config::builtin();
        let names: Vec<_> = config.plugins.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["vue"]);
    }

    #[test]
    fn builtin_passes_validation() {
        Config::builtin().validate().unwrap();
    }

    #[test]
    fn empty_toml_has_no_proxy_rules() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.server.proxy.is_empty());
        assert_eq!(config.server.port, 3000);
    }
}
