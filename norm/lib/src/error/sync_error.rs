//! Schema validation errors.

use std::fmt;

use thiserror::Error;

use super::RemoteError;

/// A single field whose declared type disagrees with the live database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMismatch {
    /// Local field name.
    pub field: String,
    /// Remote property type tag the schema expects.
    pub expected: String,
    /// Remote property type tag found, or `not found`.
    pub got: String,
}

impl fmt::Display for TypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: expected {}, got {}", self.field, self.expected, self.got)
    }
}

/// Errors from validating a parsed schema against live database definitions.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The model has no database id to validate against.
    #[error("model '{model}' has no Notion database id")]
    MissingDatabaseId {
        /// Model name.
        model: String,
    },

    /// Every record has exactly one title property, so a model must bind
    /// exactly one field to it.
    #[error("model '{model}' declares {count} title fields, expected exactly one")]
    TitleProperty {
        /// Model name.
        model: String,
        /// Number of title fields found.
        count: usize,
    },

    /// The remote database does not exist or is not shared.
    #[error("database '{database_id}' for model '{model}' not found")]
    DatabaseNotFound {
        /// Model name.
        model: String,
        /// Database id that was requested.
        database_id: String,
    },

    /// One or more fields disagree with the live database. Every mismatch of
    /// the model is listed.
    #[error(
        "model '{model}' does not match its Notion database:\n{}",
        .mismatches.iter().map(|m| format!("  {m}")).collect::<Vec<_>>().join("\n")
    )]
    TypeMismatches {
        /// Model name.
        model: String,
        /// All mismatches found for the model, in field order.
        mismatches: Vec<TypeMismatch>,
    },

    /// Fetching the database definition failed.
    #[error("failed to retrieve database '{database_id}' for model '{model}': {source}")]
    Remote {
        /// Model name.
        model: String,
        /// Database id that was requested.
        database_id: String,
        #[source]
        source: RemoteError,
    },
}
