use axum::Router;
use devgate_config::ServerConfig;
use tower_http::services::{ServeDir, ServeFile};

/// Serve `server.root` for every request no route or proxy rule claims
///
/// With SPA fallback, unknown paths get `index.html` so client-side routing
/// works; without it they get a 404.
pub fn with_assets(router: Router, config: &ServerConfig) -> Router {
    let root = &config.root;

    if config.spa_fallback {
        let index = ServeFile::new(root.join("index.html"));
        router.fallback_service(ServeDir::new(root).fallback(index))
    } else {
        router.fallback_service(ServeDir::new(root))
    }
}
