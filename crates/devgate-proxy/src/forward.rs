use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::response::Response;
use devgate_core::headers::strip_hop_by_hop;
use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use http::request::Parts;
use http::{Request, Uri};

use crate::{ProxyError, ProxyRule, ProxyTable, http_client::build_client};

/// Largest request body buffered before forwarding
const BODY_LIMIT_BYTES: usize = 32 * 1024 * 1024;

const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
const X_FORWARDED_PORT: HeaderName = HeaderName::from_static("x-forwarded-port");
const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Forwards matched requests to their upstream
///
/// Cheap to clone; the routing table and connection pool are shared.
#[derive(Clone)]
pub struct Proxy {
    table: Arc<ProxyTable>,
    client: reqwest::Client,
}

impl Proxy {
    /// # Errors
    ///
    /// Returns an error if the upstream HTTP client cannot be built
    pub fn new(table: ProxyTable) -> crate::Result<Self> {
        Ok(Self {
            table: Arc::new(table),
            client: build_client()?,
        })
    }

    pub fn table(&self) -> &ProxyTable {
        &self.table
    }

    /// Rule responsible for a request URI, if any
    pub fn route(&self, uri: &Uri) -> Option<&ProxyRule> {
        self.table.find(path_and_query(uri))
    }

    /// Forward a request through `rule` and stream the upstream response back
    ///
    /// # Errors
    ///
    /// Returns an error if the request body cannot be read, or the upstream
    /// is unreachable, times out or fails before sending response headers
    pub async fn forward(
        &self,
        rule: &ProxyRule,
        request: Request<Body>,
        client_addr: Option<SocketAddr>,
    ) -> crate::Result<Response> {
        let (parts, body) = request.into_parts();

        let url = rule.upstream_url(path_and_query(&parts.uri));
        let headers = outgoing_headers(rule, &parts, client_addr);

        let body = axum::body::to_bytes(body, BODY_LIMIT_BYTES).await.map_err(|err| {
            if std::error::Error::source(&err).is_some_and(|source| source.is::<http_body_util::LengthLimitError>()) {
                ProxyError::BodyTooLarge(BODY_LIMIT_BYTES)
            } else {
                ProxyError::InvalidBody(err.to_string())
            }
        })?;

        tracing::debug!(
            context = rule.context(),
            method = %parts.method,
            path = %parts.uri,
            upstream = %url,
            "forwarding request"
        );

        let mut builder = self.client.request(parts.method.clone(), url.clone()).headers(headers);

        if !body.is_empty() || parts.headers.contains_key(header::CONTENT_LENGTH) {
            builder = builder.body(body);
        }

        if let Some(timeout) = rule.timeout() {
            builder = builder.timeout(timeout);
        }

        let upstream = builder.send().await.map_err(|e| {
            tracing::error!(context = rule.context(), upstream = %url, error = %e, "upstream request failed");
            ProxyError::from_reqwest(&e, rule.target().as_str())
        })?;

        tracing::debug!(upstream = %url, status = %upstream.status(), "upstream responded");

        Ok(into_response(upstream))
    }
}

fn path_and_query(uri: &Uri) -> &str {
    uri.path_and_query().map_or("/", http::uri::PathAndQuery::as_str)
}

/// Build the header set sent upstream
///
/// Hop-by-hop headers are dropped and `content-length` is left to the HTTP
/// client. Request hooks run last so they override everything else.
pub(crate) fn outgoing_headers(rule: &ProxyRule, parts: &Parts, client_addr: Option<SocketAddr>) -> HeaderMap {
    let mut headers = parts.headers.clone();
    strip_hop_by_hop(&mut headers);
    headers.remove(header::CONTENT_LENGTH);

    if rule.change_origin()
        && let Some(host) = rule.target_host()
    {
        headers.insert(header::HOST, host);
    }

    if rule.xfwd() {
        append_forwarded(&mut headers, parts, client_addr);
    }

    rule.run_hooks(&mut headers);

    headers
}

/// Add `x-forwarded-*` headers, extending any set by an earlier proxy
fn append_forwarded(headers: &mut HeaderMap, parts: &Parts, client_addr: Option<SocketAddr>) {
    let original_host = parts
        .headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| parts.uri.authority().map(ToString::to_string));

    let port = original_host
        .as_deref()
        .and_then(|host| host.rsplit_once(':'))
        .and_then(|(_, port)| port.parse::<u16>().ok())
        .unwrap_or(80);

    let mut extend = |name: HeaderName, value: String| {
        let combined = match headers.get(&name).and_then(|existing| existing.to_str().ok()) {
            Some(existing) => format!("{existing},{value}"),
            None => value,
        };
        if let Ok(value) = HeaderValue::try_from(combined) {
            headers.insert(name, value);
        }
    };

    if let Some(addr) = client_addr {
        extend(X_FORWARDED_FOR, addr.ip().to_string());
    }
    extend(X_FORWARDED_PORT, port.to_string());
    extend(X_FORWARDED_PROTO, "http".to_string());

    if !headers.contains_key(&X_FORWARDED_HOST)
        && let Some(host) = original_host.and_then(|host| HeaderValue::try_from(host).ok())
    {
        headers.insert(X_FORWARDED_HOST, host);
    }
}

fn into_response(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let mut headers = upstream.headers().clone();
    strip_hop_by_hop(&mut headers);

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
