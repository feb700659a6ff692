//! Query construction errors.

use thiserror::Error;

/// Errors raised while building a query or deriving a model binding.
///
/// These are programmer errors: the caller must fix the query construction,
/// so they are raised before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// `filter_relation` was called for a property with no target database.
    #[error(
        "relation '{property}' on model '{model}' has no configured target database id"
    )]
    UnknownRelation {
        /// Model the query targets.
        model: String,
        /// The relation property as given by the caller.
        property: String,
    },

    /// A relation sub-query was configured without any condition.
    #[error("relation filter '{property}' on model '{model}' must have at least one condition")]
    EmptyRelationFilter {
        /// Model the query targets.
        model: String,
        /// The relation property as given by the caller.
        property: String,
    },

    /// A model binding was requested for a model the schema does not declare.
    #[error("model '{model}' is not declared in the schema")]
    UnknownModel {
        /// The requested model name.
        model: String,
    },
}
