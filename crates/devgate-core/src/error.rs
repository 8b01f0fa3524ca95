use http::StatusCode;

/// Trait for domain errors that can be converted to HTTP responses
///
/// Keeps error classification independent of axum; the crate that owns the
/// error decides how to render it.
pub trait HttpError: std::error::Error {
    /// HTTP status code for this error
    fn status_code(&self) -> StatusCode;

    /// Machine-readable error type (e.g. `bad_gateway`)
    fn error_type(&self) -> &str;

    /// Message safe to expose to the browser
    fn client_message(&self) -> String;
}
