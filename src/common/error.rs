use thiserror::Error;

/// Errors raised while setting up mock servers and handlers.
///
/// Requests that do not match any handler are not errors. They resolve to
/// [Resolution::NotFound](crate::Resolution::NotFound) and are answered with a 404.
#[derive(Error, Debug)]
pub enum Error {
    #[error("a mock server is already registered for base URL {0}")]
    DuplicateBaseUrl(String),
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("invalid path pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("path pattern '{pattern}' does not declare a path parameter named '{name}'")]
    UnknownPathParam { pattern: String, name: String },
    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),
    #[error("invalid HTTP status code: {0}")]
    InvalidStatus(u16),
    #[error("invalid response header: {0}")]
    InvalidHeader(String),
    #[error("the mock server for base URL {0} has been disposed")]
    ServerDisposed(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("cannot serialize JSON body: {0}")]
    Json(#[from] serde_json::Error),
}
