//! Top-level library error type.

use thiserror::Error;

use super::{ConfigError, MappingError, ParseError, RemoteError, SyncError};

/// Top-level error type for all norm operations.
///
/// This enum aggregates all error categories, enabling unified error handling
/// while preserving the ability to match on specific error types.
///
/// ## Examples
///
/// ```
/// use norm_lib::error::{NormError, ParseError};
///
/// fn describe(err: &NormError) -> &'static str {
///     match err {
///         NormError::Parse(_) => "fix the schema file",
///         NormError::Mapping(_) => "fix the query",
///         NormError::Sync(_) => "fix the schema or the database",
///         NormError::Remote(_) => "check the network or credentials",
///         NormError::Config(_) => "fix the configuration",
///     }
/// }
///
/// assert_eq!(describe(&ParseError::NoModels.into()), "fix the schema file");
/// ```
#[derive(Debug, Error)]
pub enum NormError {
    /// Malformed schema text.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Invalid query construction.
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// Schema does not match the live databases.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// Remote service failure.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
