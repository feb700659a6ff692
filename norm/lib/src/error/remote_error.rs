//! Notion API and network errors.

use thiserror::Error;

/// Errors from the remote document-database client.
///
/// `NotFound`, `Unauthorized` and `Validation` are permanent classifications
/// and are never retried. Transient failures (5xx, 429, connection problems)
/// are retried by the client's retry envelope before they surface here.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The requested database or page does not exist or is not shared with
    /// the integration.
    #[error("{object} '{id}' not found (is it shared with the integration?)")]
    NotFound {
        /// Kind of object requested (`database` or `page`).
        object: &'static str,
        /// Identifier that was requested.
        id: String,
    },

    /// The integration token was rejected.
    #[error("Unauthorized: {message}. Check that NOTION_TOKEN holds a valid integration token")]
    Unauthorized {
        /// Message returned by the service.
        message: String,
    },

    /// The service rejected the request body (`validation_error`).
    #[error("Notion rejected the request ({code}): {message}")]
    Validation {
        /// Notion error code.
        code: String,
        /// Message returned by the service.
        message: String,
    },

    /// Any other non-success status.
    #[error("HTTP {status} ({code}): {message}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Notion error code, or `unknown` if the body carried none.
        code: String,
        /// Message returned by the service.
        message: String,
    },

    /// HTTP request failed due to a network or protocol error.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The request did not complete within the configured deadline.
    #[error("Request timeout after {duration_ms}ms")]
    Timeout {
        /// The deadline in milliseconds.
        duration_ms: u64,
    },

    /// The response body could not be decoded.
    #[error("Failed to decode Notion response: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Returns `true` if the retry envelope should try this request again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            Self::Request(e) => e.is_timeout() || e.is_connect(),
            Self::NotFound { .. }
            | Self::Unauthorized { .. }
            | Self::Validation { .. }
            | Self::Timeout { .. }
            | Self::Decode(_) => false,
        }
    }

    /// Returns `true` for the definitive not-found classification.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns the Notion error code if the service supplied one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::NotFound { .. } => Some("object_not_found"),
            Self::Unauthorized { .. } => Some("unauthorized"),
            Self::Validation { code, .. } | Self::HttpStatus { code, .. } => Some(code),
            _ => None,
        }
    }
}
