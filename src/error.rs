use std::io;

/// Custom error type for usewebhook operations
#[derive(Debug, thiserror::Error)]
pub enum UseWebhookError {
    #[error("invalid URL format")]
    InvalidUrlFormat,

    #[error("invalid webhook ID")]
    InvalidWebhookId,

    #[error("unable to determine config file path")]
    ConfigPathUnavailable,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("unable to fetch webhook data (status code {0})")]
    UnexpectedStatus(u16),

    #[error("Malformed forward request: {0}")]
    MalformedRequest(String),

    #[error("Base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Helper type for Results that use UseWebhookError
pub type Result<T> = std::result::Result<T, UseWebhookError>;
