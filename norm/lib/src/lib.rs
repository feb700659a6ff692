//! Schema compiler and query engine for Notion-backed data models.
//!
//! A schema file declares models bound to Notion databases. This library
//! parses that text, checks it against the live databases, and runs typed
//! queries against them.
//!
//! ## Pipeline
//!
//! - [`parser::parse`] - Schema text to [`schema::Schema`]
//! - [`sync::validate_and_sync`] - Checks each model against its live database
//! - [`schema::Schema::binding`] - Per-model query configuration
//! - [`query::QueryBuilder`] - Filters, sorts, relation includes and execution
//! - [`codec::decode_property`] - Notion property JSON to [`value::PropertyValue`]
//!
//! ## Remote Access
//!
//! Everything remote goes through the [`client::NotionApi`] trait;
//! [`client::NotionClient`] is the HTTP implementation, configured from a
//! [`config::NormConfig`].
//!
//! ## Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use norm_lib::client::NotionClient;
//! use norm_lib::config::NormConfig;
//! use norm_lib::{parser, sync};
//!
//! # async fn run() -> Result<(), norm_lib::NormError> {
//! let schema = parser::parse(&std::fs::read_to_string("schema.norm").unwrap_or_default())?;
//! let client = Arc::new(NotionClient::from_config(&NormConfig::from_env()?)?);
//!
//! sync::validate_and_sync(&schema, client.as_ref()).await?;
//!
//! let done = schema
//!     .binding("Task")?
//!     .query(client)
//!     .filter("done", "equals", true)
//!     .execute()
//!     .await?;
//! println!("{} done", done.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod parser;
pub mod query;
pub mod reconcile;
pub mod schema;
pub mod sync;
pub mod value;

pub use error::NormError;
pub use parser::{SkippedLine, parse, parse_with_diagnostics};
pub use query::{QueryBuilder, SortDirection};
pub use schema::{Field, Model, NotionPropertyType, Schema};
pub use sync::{SyncReport, validate_and_sync};
pub use value::{PropertyValue, Record};
