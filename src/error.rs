//! Error types for dispatchd

use hyper::Method;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("route already exists: {path} {method}")]
    DuplicateRoute { path: String, method: Method },

    #[error("invalid route: {0}")]
    InvalidRoute(String),

    #[error(transparent)]
    ParseForm(#[from] FormError),

    #[error("invalid request {path} / {method}")]
    RouteNotFound { path: String, method: Method },

    #[error("params are not matched or empty: {0}")]
    MissingParameter(String),

    #[error("invalid api response: {0}")]
    InvalidEnvelope(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("logging setup failed: {0}")]
    Logging(String),
}

/// Failure to decode a query string or form-encoded request body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("invalid URL escape {0:?}")]
    InvalidEscape(String),

    #[error("invalid semicolon separator in query")]
    InvalidSemicolon,

    #[error("request body too large (limit {0} bytes)")]
    BodyTooLarge(u64),

    #[error("invalid content type: {0}")]
    InvalidContentType(String),

    #[error("failed to read request body: {0}")]
    Body(String),
}

pub type Result<T> = std::result::Result<T, Error>;
