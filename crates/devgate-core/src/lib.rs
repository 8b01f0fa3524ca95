//! Shared HTTP building blocks for devgate
//!
//! Header rules for outgoing proxied requests, the hop-by-hop header list,
//! and the [`HttpError`] trait implemented by domain errors.

pub mod error;
pub mod headers;

pub use error::HttpError;
