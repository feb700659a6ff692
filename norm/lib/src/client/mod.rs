//! Notion API client.
//!
//! The core talks to Notion only through the [`NotionApi`] trait, so the
//! validator and query builders can run against the HTTP [`NotionClient`] or
//! an in-memory implementation in tests.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use norm_lib::client::{NotionApi, NotionClient};
//! use norm_lib::config::NormConfig;
//!
//! # async fn run() -> Result<(), norm_lib::error::NormError> {
//! let config = NormConfig::from_env()?;
//! let client = NotionClient::from_config(&config)?;
//!
//! let database = client.retrieve_database("d9824bdc-8445-4327-be8b-5b47500af6ce").await?;
//! for property in database.properties.values() {
//!     println!("{}: {}", property.name, property.kind);
//! }
//! # Ok(())
//! # }
//! ```

mod http;
mod retry;
mod types;

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use crate::error::RemoteError;

pub use http::{NotionClient, NotionClientBuilder};
pub use retry::with_retry;
pub use types::{DatabaseDescriptor, Page, QueryResponse, RemoteProperty, RichText};

/// Remote operations the core depends on.
///
/// Implementations are expected to apply their own retry envelope; callers
/// never retry.
///
/// ## Native Async Traits
///
/// Methods are declared as `impl Future + Send` so implementors can write
/// plain `async fn`s and builders can hold any implementation behind an `Arc`.
pub trait NotionApi: Send + Sync {
    /// Fetches a database definition.
    ///
    /// ## Errors
    ///
    /// `RemoteError::NotFound`, `RemoteError::Unauthorized`, or any other
    /// remote failure.
    fn retrieve_database(
        &self,
        database_id: &str,
    ) -> impl Future<Output = Result<DatabaseDescriptor, RemoteError>> + Send;

    /// Runs a compiled query (`{database_id, filter?, sorts?, page_size?,
    /// start_cursor?}`).
    ///
    /// ## Errors
    ///
    /// `RemoteError::Validation` when the service rejects the query body, or
    /// any other remote failure.
    fn query_database(
        &self,
        query: &Value,
    ) -> impl Future<Output = Result<QueryResponse, RemoteError>> + Send;

    /// Fetches a single page (record).
    ///
    /// ## Errors
    ///
    /// `RemoteError::NotFound`, or any other remote failure.
    fn retrieve_page(&self, page_id: &str)
    -> impl Future<Output = Result<Page, RemoteError>> + Send;
}

impl<T: NotionApi> NotionApi for Arc<T> {
    async fn retrieve_database(&self, database_id: &str) -> Result<DatabaseDescriptor, RemoteError> {
        self.as_ref().retrieve_database(database_id).await
    }

    async fn query_database(&self, query: &Value) -> Result<QueryResponse, RemoteError> {
        self.as_ref().query_database(query).await
    }

    async fn retrieve_page(&self, page_id: &str) -> Result<Page, RemoteError> {
        self.as_ref().retrieve_page(page_id).await
    }
}
