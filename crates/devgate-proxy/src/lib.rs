//! Reverse-proxy engine for the devgate dev server
//!
//! A [`ProxyTable`] holds [`ProxyRule`]s in declaration order. The first rule
//! whose context matches a request's path wins; [`Proxy::forward`] rewrites
//! the path, prepares outgoing headers (hop-by-hop removal, `Host` rewrite,
//! `x-forwarded-*`, request hooks) and streams the upstream response back.

#![allow(clippy::must_use_candidate)]

mod error;
mod forward;
mod http_client;
mod matcher;
mod rewrite;
mod rule;
mod table;

pub use error::{ProxyError, Result};
pub use forward::Proxy;
pub use matcher::ContextMatcher;
pub use rewrite::PathRewrite;
pub use rule::{ProxyRule, ProxyRuleBuilder, RequestHook};
pub use table::ProxyTable;
