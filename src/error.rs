use thiserror::Error;

/// Errors that can occur while producing a summary.
#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Streaming error: {0}")]
    Streaming(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Content blocked by safety filter: {0}")]
    ContentFiltered(String),

    #[error("Text must not be empty")]
    EmptyInput,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request cancelled")]
    Cancelled,
}

/// Coarse classification used to pick a response status and log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caused by the caller; detected before any network call.
    Validation,
    /// Missing or malformed startup configuration.
    Configuration,
    /// The provider or the network between us failed.
    Upstream,
    /// The caller went away or cancelled the request.
    Cancelled,
}

impl Error {
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    pub fn streaming(message: impl Into<String>) -> Self {
        Error::Streaming(message.into())
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Error::InvalidRequest(message.into())
    }

    pub fn content_filtered(reason: impl Into<String>) -> Self {
        Error::ContentFiltered(reason.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EmptyInput | Error::InvalidRequest(_) => ErrorKind::Validation,
            Error::Config(_) => ErrorKind::Configuration,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::Http(_)
            | Error::Serialization(_)
            | Error::Provider { .. }
            | Error::Streaming(_)
            | Error::RateLimit(_)
            | Error::ContentFiltered(_) => ErrorKind::Upstream,
        }
    }
}
