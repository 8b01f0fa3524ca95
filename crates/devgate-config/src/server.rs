use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::{cors::CorsConfig, health::HealthConfig, proxy::ProxyRuleConfig};

/// Default dev server port
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: IpAddr,
    /// TCP port to bind
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory served for requests no proxy rule claims
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Serve `index.html` for unknown asset paths
    #[serde(default = "default_spa_fallback")]
    pub spa_fallback: bool,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub cors: Option<CorsConfig>,
    /// Proxy rules keyed by context, matched in declaration order
    #[serde(default)]
    pub proxy: IndexMap<String, ProxyRuleConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: DEFAULT_PORT,
            root: default_root(),
            spa_fallback: true,
            health: HealthConfig::default(),
            cors: None,
            proxy: IndexMap::new(),
        }
    }
}

impl ServerConfig {
    pub(crate) fn builtin() -> Self {
        let mut proxy = IndexMap::new();
        proxy.insert("/api".to_string(), ProxyRuleConfig::builtin_api());

        Self { proxy, ..Self::default() }
    }

    /// Socket address the dev server binds
    pub const fn listen_address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

#[allow(clippy::missing_const_for_fn)]
fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

#[allow(clippy::missing_const_for_fn)]
fn default_spa_fallback() -> bool {
    true
}
