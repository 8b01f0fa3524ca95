//! HTTP front of the dev server
//!
//! Request flow, outermost first: CORS (when configured), request tracing,
//! the proxy middleware, then local routes and static assets.

mod assets;
mod cors;
mod health;
mod proxy;

use std::net::SocketAddr;

use axum::Router;
use axum::routing::get;
use devgate_config::{Config, PluginConfig, ServerConfig};
use devgate_proxy::{Proxy, ProxyTable};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

/// A configured dev server, ready to bind
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
    plugins: Vec<PluginConfig>,
}

impl Server {
    /// # Errors
    ///
    /// Returns an error if a proxy rule is invalid or the upstream HTTP
    /// client cannot be built
    pub fn new(config: Config) -> anyhow::Result<Self> {
        for plugin in &config.plugins {
            tracing::info!(plugin = %plugin.name, options = plugin.options.len(), "plugin registered");
        }

        let table = ProxyTable::from_config(&config.server)?;
        for rule in table.rules() {
            tracing::info!(
                context = rule.context(),
                target = %rule.target(),
                change_origin = rule.change_origin(),
                "proxy rule registered"
            );
        }

        Ok(Self {
            router: build_router(&config.server, Proxy::new(table)?),
            listen_address: config.server.listen_address(),
            plugins: config.plugins,
        })
    }

    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Plugin descriptors, in declaration order
    #[must_use]
    pub fn plugins(&self) -> &[PluginConfig] {
        &self.plugins
    }

    /// The assembled router, for callers that bind their own listener
    #[must_use]
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Bind the configured address and serve until `shutdown` fires
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound or the accept loop
    /// fails
    pub async fn serve(self, shutdown: CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address)
            .await
            .map_err(|e| anyhow::anyhow!("failed to bind {}: {e}", self.listen_address))?;

        let local_addr = listener.local_addr()?;
        tracing::info!(url = %format!("http://{local_addr}/"), "dev server ready");

        // Client addresses feed `x-forwarded-for`
        let service = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, service)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("draining connections");
            })
            .await?;

        Ok(())
    }
}

fn build_router(config: &ServerConfig, forwarder: Proxy) -> Router {
    let mut app = Router::new();

    if config.health.enabled {
        app = app.route(&config.health.path, get(health::health_handler));
    }

    app = assets::with_assets(app, config)
        .layer(axum::middleware::from_fn_with_state(forwarder, proxy::proxy_middleware))
        .layer(TraceLayer::new_for_http());

    match config.cors {
        Some(ref cors) => app.layer(cors::cors_layer(cors)),
        None => app,
    }
}
