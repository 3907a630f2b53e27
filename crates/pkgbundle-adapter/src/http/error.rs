/*
[INPUT]:  Error sources (HTTP, API, serialization, I/O)
[OUTPUT]: Structured error types with context and retry hints
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the pkgbundle adapter
#[derive(Error, Debug)]
pub enum BundleError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error (code {code}): {message}")]
    Api { code: u16, message: String },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local file operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BundleError {
    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            BundleError::Http(_)
            | BundleError::Serialization(_)
            | BundleError::InvalidResponse(_) => true,
            BundleError::Api { code, .. } => *code >= 500,
            _ => false,
        }
    }

    /// Check if the service reported the resource as missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, BundleError::Api { code: 404, .. })
    }

    /// Message suitable for showing to a user.
    ///
    /// API errors yield the service-provided detail verbatim.
    pub fn user_message(&self) -> String {
        match self {
            BundleError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        BundleError::Api {
            code: status.as_u16(),
            message: message.into(),
        }
    }
}

/// Result type alias for pkgbundle operations
pub type Result<T> = std::result::Result<T, BundleError>;
