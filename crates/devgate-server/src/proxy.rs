use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use devgate_proxy::Proxy;

/// Forward requests claimed by a proxy rule; everything else falls through
/// to the rest of the router
pub async fn proxy_middleware(State(proxy): State<Proxy>, request: Request, next: Next) -> Response {
    let Some(rule) = proxy.route(request.uri()) else {
        return next.run(request).await;
    };

    let client_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    match proxy.forward(rule, request, client_addr).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(context = rule.context(), error = %e, "proxy request failed");
            e.into_response()
        }
    }
}
