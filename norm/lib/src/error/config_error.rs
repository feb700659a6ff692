//! Configuration errors.

use thiserror::Error;

/// Errors in client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configured base URL could not be parsed.
    #[error("Invalid base URL '{value}': {source}")]
    InvalidBaseUrl {
        /// The rejected value.
        value: String,
        #[source]
        source: url::ParseError,
    },

    /// No integration token was supplied.
    #[error("Missing Notion integration token (set {})", .env_vars.join(" or "))]
    MissingToken {
        /// Environment variables that were checked.
        env_vars: Vec<String>,
    },

    /// A header value could not be constructed from configuration.
    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader {
        /// Header name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}
