use axum::response::IntoResponse;
use http::{StatusCode, header};

/// Liveness probe; answers as long as the dev server is accepting requests
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, [(header::CACHE_CONTROL, "no-store")], "ok")
}
