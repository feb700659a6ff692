//! Layered error types for the norm library.
//!
//! The error hierarchy is structured for actionable diagnostics. Every variant
//! carries the model, field, database id or remote error code it concerns so
//! a failure can be acted on without a stack trace.
//!
//! - [`NormError`] - Top-level error type for all library operations
//! - [`ParseError`] - Malformed schema text
//! - [`MappingError`] - Query construction mistakes (relation filters)
//! - [`SyncError`] - Schema validation against live database definitions
//! - [`RemoteError`] - Network and service failures from the Notion API
//! - [`ConfigError`] - Invalid or incomplete configuration

mod config_error;
mod mapping_error;
mod norm_error;
mod parse_error;
mod remote_error;
mod sync_error;

pub use config_error::ConfigError;
pub use mapping_error::MappingError;
pub use norm_error::NormError;
pub use parse_error::ParseError;
pub use remote_error::RemoteError;
pub use sync_error::{SyncError, TypeMismatch};
