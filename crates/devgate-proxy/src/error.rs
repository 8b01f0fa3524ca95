use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use devgate_core::HttpError;
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProxyError>;

/// Errors raised while building proxy rules or forwarding a request
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Invalid proxy rule configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Upstream could not be reached
    #[error("Upstream {target} unreachable: {message}")]
    Connection { target: String, message: String },

    /// Upstream did not answer within the rule's timeout
    #[error("Upstream {0} timed out")]
    Timeout(String),

    /// Upstream failed after the connection was made
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Request body exceeded the buffering limit
    #[error("Request body is too large, limit is {0} bytes")]
    BodyTooLarge(usize),

    /// Request body could not be read from the client
    #[error("Failed to read request body: {0}")]
    InvalidBody(String),
}

impl ProxyError {
    pub(crate) fn from_reqwest(error: &reqwest::Error, target: &str) -> Self {
        if error.is_timeout() {
            Self::Timeout(target.to_string())
        } else if error.is_connect() {
            Self::Connection {
                target: target.to_string(),
                message: error.to_string(),
            }
        } else {
            Self::Upstream(error.to_string())
        }
    }
}

impl HttpError for ProxyError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Connection { .. } | Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::BodyTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::Config(_) => "internal_error",
            Self::Connection { .. } | Self::Upstream(_) => "bad_gateway",
            Self::Timeout(_) => "gateway_timeout",
            Self::BodyTooLarge(_) | Self::InvalidBody(_) => "invalid_request_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Config(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorDetails,
}

#[derive(Debug, Serialize)]
struct ErrorDetails {
    message: String,
    r#type: String,
    code: u16,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error_response = ErrorResponse {
            error: ErrorDetails {
                message: self.client_message(),
                r#type: self.error_type().to_string(),
                code: status.as_u16(),
            },
        };

        (status, Json(error_response)).into_response()
    }
}
