//! HTTP implementation of [`NotionApi`] with tracing instrumentation.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{Span, debug, error, info, instrument};
use url::Url;

use super::retry::with_retry;
use super::types::{DatabaseDescriptor, Page, QueryResponse};
use super::NotionApi;
use crate::config::{NOTION_API_VERSION, NormConfig, RetryPolicy};
use crate::error::{ConfigError, NormError, RemoteError};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Error body returned by Notion for non-success statuses.
#[derive(Debug, Deserialize)]
struct NotionErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Builder for configuring a [`NotionClient`].
#[derive(Debug)]
pub struct NotionClientBuilder {
    base_url: Url,
    timeout: Duration,
    token: Option<String>,
    notion_version: String,
    retry: RetryPolicy,
    debug: bool,
}

impl NotionClientBuilder {
    fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            token: None,
            notion_version: NOTION_API_VERSION.to_string(),
            retry: RetryPolicy::default(),
            debug: false,
        }
    }

    /// Sets the per-request deadline. A request exceeding it fails with
    /// `RemoteError::Timeout` and is not retried.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the integration token sent as a bearer token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Overrides the `Notion-Version` header.
    pub fn notion_version(mut self, version: impl Into<String>) -> Self {
        self.notion_version = version.into();
        self
    }

    /// Sets the retry envelope.
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Logs request bodies at `info` instead of `debug`.
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Builds the [`NotionClient`].
    ///
    /// ## Errors
    ///
    /// Returns an error if a header value is invalid or the HTTP client cannot
    /// be constructed.
    pub fn build(self) -> Result<NotionClient, NormError> {
        let mut headers = HeaderMap::new();
        let version = HeaderValue::try_from(self.notion_version.as_str()).map_err(|e| {
            ConfigError::InvalidHeader {
                name: "Notion-Version",
                reason: e.to_string(),
            }
        })?;
        headers.insert("Notion-Version", version);

        if let Some(token) = &self.token {
            let mut value = HeaderValue::try_from(format!("Bearer {token}")).map_err(|e| {
                ConfigError::InvalidHeader {
                    name: "Authorization",
                    reason: e.to_string(),
                }
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .default_headers(headers)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(RemoteError::Request)?;

        Ok(NotionClient {
            client,
            base_url: self.base_url,
            timeout: self.timeout,
            retry: self.retry,
            debug: self.debug,
        })
    }
}

/// Async Notion API client.
///
/// Wraps `reqwest::Client` with connection pooling, bearer authentication,
/// the `Notion-Version` header, error classification and the retry envelope.
#[derive(Debug, Clone)]
pub struct NotionClient {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    retry: RetryPolicy,
    debug: bool,
}

impl NotionClient {
    /// Creates a new builder for the given base URL.
    pub fn builder(base_url: Url) -> NotionClientBuilder {
        NotionClientBuilder::new(base_url)
    }

    /// Creates a client from explicit configuration.
    ///
    /// ## Errors
    ///
    /// Returns `ConfigError::MissingToken` if the configuration carries no
    /// token, or any error from [`NotionClientBuilder::build`].
    pub fn from_config(config: &NormConfig) -> Result<Self, NormError> {
        let token = config.require_token()?;
        Self::builder(config.base_url.clone())
            .token(token)
            .notion_version(config.notion_version.clone())
            .timeout(config.timeout)
            .retry(config.retry)
            .debug(config.debug)
            .build()
    }

    /// Returns the base URL for this client.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Sends one request and decodes the JSON response.
    #[instrument(
        name = "notion_request",
        skip(self, body),
        fields(
            http.method = %method,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
            otel.kind = "client",
            otel.status_code = tracing::field::Empty,
        )
    )]
    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        object: &'static str,
        id: &str,
    ) -> Result<T, RemoteError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| RemoteError::Decode(format!("invalid request URL '{path}': {e}")))?;
        Span::current().record("http.url", url.as_str());

        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            if self.debug {
                info!(body = %body, "Notion request body");
            } else {
                debug!(body = %body, "Notion request body");
            }
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| self.classify_transport(e))?;
        let status = response.status();
        Span::current().record("http.status_code", status.as_u16());

        if !status.is_success() {
            let otel_status = if status.is_server_error() { "ERROR" } else { "UNSET" };
            Span::current().record("otel.status_code", otel_status);

            let text = response
                .text()
                .await
                .unwrap_or_else(|_| status.to_string());
            let err = classify_status(status, &text, object, id);
            error!(status = status.as_u16(), code = ?err.code(), "Notion request failed: {err}");
            return Err(err);
        }

        Span::current().record("otel.status_code", "OK");

        let bytes = response.bytes().await.map_err(|e| self.classify_transport(e))?;
        serde_json::from_slice(&bytes).map_err(|e| RemoteError::Decode(e.to_string()))
    }

    fn classify_transport(&self, err: reqwest::Error) -> RemoteError {
        if err.is_timeout() {
            RemoteError::Timeout {
                duration_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else {
            RemoteError::Request(err)
        }
    }
}

/// Maps a non-success response to a [`RemoteError`].
fn classify_status(status: StatusCode, body: &str, object: &'static str, id: &str) -> RemoteError {
    let parsed: Option<NotionErrorBody> = serde_json::from_str(body).ok();
    let code = parsed.as_ref().and_then(|b| b.code.clone());
    let message = parsed
        .and_then(|b| b.message)
        .unwrap_or_else(|| body.to_string());

    match (status, code.as_deref()) {
        (StatusCode::NOT_FOUND, _) | (_, Some("object_not_found")) => RemoteError::NotFound {
            object,
            id: id.to_string(),
        },
        (StatusCode::UNAUTHORIZED, _) | (_, Some("unauthorized")) => {
            RemoteError::Unauthorized { message }
        }
        (_, Some("validation_error")) => RemoteError::Validation {
            code: "validation_error".to_string(),
            message,
        },
        _ => RemoteError::HttpStatus {
            status: status.as_u16(),
            code: code.unwrap_or_else(|| "unknown".to_string()),
            message,
        },
    }
}

impl NotionApi for NotionClient {
    async fn retrieve_database(&self, database_id: &str) -> Result<DatabaseDescriptor, RemoteError> {
        let path = format!("databases/{database_id}");
        with_retry(self.retry, "retrieve_database", || {
            self.send(Method::GET, &path, None, "database", database_id)
        })
        .await
    }

    async fn query_database(&self, query: &Value) -> Result<QueryResponse, RemoteError> {
        let database_id = query
            .get("database_id")
            .and_then(Value::as_str)
            .ok_or_else(|| RemoteError::Decode("query is missing database_id".to_string()))?;
        let mut body = query.clone();
        if let Some(map) = body.as_object_mut() {
            map.remove("database_id");
        }

        let path = format!("databases/{database_id}/query");
        with_retry(self.retry, "query_database", || {
            self.send(Method::POST, &path, Some(&body), "database", database_id)
        })
        .await
    }

    async fn retrieve_page(&self, page_id: &str) -> Result<Page, RemoteError> {
        let path = format!("pages/{page_id}");
        with_retry(self.retry, "retrieve_page", || {
            self.send(Method::GET, &path, None, "page", page_id)
        })
        .await
    }
}
