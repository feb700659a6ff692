//! CLI error type.

use std::path::PathBuf;

use norm_lib::NormError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read schema file '{}': {source}", .path.display())]
    ReadSchema {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Norm(#[from] NormError),

    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}
