//! Explicit runtime configuration.
//!
//! The library never reads the process environment on its own. Applications
//! build a [`NormConfig`] once at their boundary (usually with
//! [`NormConfig::from_env`]) and pass it to the constructors that need it.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::warn;
use url::Url;

use crate::error::ConfigError;

/// Notion REST API base URL.
pub const NOTION_API_BASE_URL: &str = "https://api.notion.com/v1/";

/// Notion API version sent in the `Notion-Version` header.
pub const NOTION_API_VERSION: &str = "2022-06-28";

/// Primary environment variable for the integration token.
pub const NOTION_TOKEN_ENV: &str = "NOTION_TOKEN";

/// Alternative environment variable for the integration token.
pub const NOTION_TOKEN_ALT_ENV: &str = "NOTION_API_KEY";

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Language used for user-facing messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
}

/// Bounded retry envelope applied to every remote call.
///
/// Attempts are separated by a linearly increasing delay: the pause after
/// attempt `n` (1-based) is `n × base_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Unit of the linear backoff.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// A policy that performs a single attempt.
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay to wait after the given 1-based attempt failed.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

/// Configuration injected into the client, the validator and query builders.
#[derive(Debug, Clone)]
pub struct NormConfig {
    /// Notion integration token.
    pub token: Option<String>,
    /// API base URL (always ends with `/`).
    pub base_url: Url,
    /// Value of the `Notion-Version` header.
    pub notion_version: String,
    /// Language for user-facing messages.
    pub locale: Locale,
    /// Promotes compiled queries and request bodies to `info` level logs.
    pub debug: bool,
    /// Per-request deadline.
    pub timeout: Duration,
    /// Retry envelope for remote calls.
    pub retry: RetryPolicy,
}

impl Default for NormConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: Url::parse(NOTION_API_BASE_URL).expect("NOTION_API_BASE_URL is a valid URL"),
            notion_version: NOTION_API_VERSION.to_string(),
            locale: Locale::default(),
            debug: false,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

impl NormConfig {
    /// Builds a configuration from environment variables.
    ///
    /// | Variable | Effect |
    /// |---|---|
    /// | `NOTION_TOKEN` / `NOTION_API_KEY` | integration token |
    /// | `NOTION_BASE_URL` | API base URL |
    /// | `NOTION_VERSION` | `Notion-Version` header |
    /// | `NORM_LOCALE` | `en` or `es` |
    /// | `NORM_DEBUG` | `1`, `true` or `yes` enables debug output |
    ///
    /// ## Errors
    ///
    /// Returns `ConfigError::InvalidBaseUrl` if `NOTION_BASE_URL` is not a URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self {
            token: env::var(NOTION_TOKEN_ENV)
                .or_else(|_| env::var(NOTION_TOKEN_ALT_ENV))
                .ok()
                .filter(|t| !t.trim().is_empty()),
            ..Self::default()
        };

        if let Ok(base_url) = env::var("NOTION_BASE_URL") {
            config = config.with_base_url(&base_url)?;
        }
        if let Ok(version) = env::var("NOTION_VERSION") {
            config.notion_version = version;
        }
        if let Ok(locale) = env::var("NORM_LOCALE") {
            config.locale = locale.parse().unwrap_or_else(|_| {
                warn!(locale = %locale, "Unknown NORM_LOCALE, falling back to en");
                Locale::En
            });
        }
        if let Ok(debug) = env::var("NORM_DEBUG") {
            config.debug = matches!(debug.to_lowercase().as_str(), "1" | "true" | "yes");
        }

        Ok(config)
    }

    /// Returns the configuration with the given integration token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Returns the configuration pointed at a different base URL.
    ///
    /// A trailing `/` is added when missing so relative endpoint paths join
    /// underneath it.
    ///
    /// ## Errors
    ///
    /// Returns `ConfigError::InvalidBaseUrl` if `base_url` is not a URL.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        self.base_url = Url::parse(&normalized).map_err(|source| ConfigError::InvalidBaseUrl {
            value: base_url.to_string(),
            source,
        })?;
        Ok(self)
    }

    /// Returns the token, or an error naming the variables to set.
    pub fn require_token(&self) -> Result<&str, ConfigError> {
        self.token.as_deref().ok_or_else(|| ConfigError::MissingToken {
            env_vars: vec![NOTION_TOKEN_ENV.to_string(), NOTION_TOKEN_ALT_ENV.to_string()],
        })
    }
}
