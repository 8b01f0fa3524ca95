use std::time::Duration;

use reqwest::{Client, redirect};

use crate::ProxyError;

/// HTTP client shared by every forwarded request
///
/// Redirects are passed back to the browser rather than followed, system
/// proxy settings are ignored, and no global timeout is set; rules opt in
/// to a timeout individually.
pub fn build_client() -> crate::Result<Client> {
    Client::builder()
        .redirect(redirect::Policy::none())
        .no_proxy()
        .pool_idle_timeout(Some(Duration::from_secs(30)))
        .tcp_nodelay(true)
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .build()
        .map_err(|e| ProxyError::Config(format!("failed to build upstream HTTP client: {e}")))
}
