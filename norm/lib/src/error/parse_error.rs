//! Schema text parsing errors.

use thiserror::Error;

/// Errors produced while compiling schema text into models.
///
/// Parse errors are always fatal and never retried. Field lines that do not
/// match the field grammar are *not* errors; they are reported as skipped
/// lines instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A `model` header is missing its `@notionDatabase("...")` binding.
    #[error("line {line}: model header is missing @notionDatabase(\"<id>\"): `{text}`")]
    MissingDatabaseId {
        /// 1-based line number of the offending header.
        line: usize,
        /// The header line as written.
        text: String,
    },

    /// A model body was opened but never closed with `}`.
    #[error("line {line}: model '{model}' is never closed with '}}'")]
    UnterminatedModel {
        /// Name of the model whose body is unterminated.
        model: String,
        /// 1-based line number of the model header.
        line: usize,
    },

    /// The same model name was declared twice.
    #[error("line {line}: model '{model}' is declared more than once")]
    DuplicateModel {
        /// The duplicated model name.
        model: String,
        /// 1-based line number of the second declaration.
        line: usize,
    },

    /// The input contained no model blocks.
    #[error("no valid models found in schema")]
    NoModels,
}
