//! Schema validator: checks a parsed schema against live database
//! definitions before any code generation or querying happens.

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::client::NotionApi;
use crate::error::SyncError;
use crate::reconcile::diff_model;
use crate::schema::{Model, Schema};

/// Outcome of a successful validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Validated models, in declaration order.
    pub models: Vec<ModelReport>,
}

impl SyncReport {
    /// Returns `true` if any model has advisory differences.
    pub fn has_advisories(&self) -> bool {
        self.models.iter().any(|m| !m.extra.is_empty())
    }
}

/// Per-model validation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelReport {
    pub model: String,
    pub database_id: String,
    /// Remote database title.
    pub title: String,
    /// Remote properties the model does not declare. Advisory only.
    pub extra: Vec<String>,
}

/// Validates every model of `schema` against its live database, in
/// declaration order.
///
/// Stops at the first model that fails. Properties the schema declares but the
/// database lacks are logged and reported as type mismatches with `got` set to
/// `not found`; all mismatches of a model are returned together.
///
/// ## Errors
///
/// - `SyncError::MissingDatabaseId` if a model has an empty database id
/// - `SyncError::TitleProperty` unless a model binds exactly one title field
/// - `SyncError::DatabaseNotFound` if the database does not exist
/// - `SyncError::TypeMismatches` with every mismatch of the failing model
/// - `SyncError::Remote` for any other remote failure
#[instrument(skip_all, fields(models = schema.models.len()))]
pub async fn validate_and_sync<C: NotionApi>(
    schema: &Schema,
    client: &C,
) -> Result<SyncReport, SyncError> {
    let mut report = SyncReport::default();
    for model in &schema.models {
        report.models.push(validate_model(model, client).await?);
    }
    info!(models = report.models.len(), "Schema matches Notion databases");
    Ok(report)
}

async fn validate_model<C: NotionApi>(model: &Model, client: &C) -> Result<ModelReport, SyncError> {
    if model.database_id.trim().is_empty() {
        return Err(SyncError::MissingDatabaseId {
            model: model.name.clone(),
        });
    }

    let titles = model.title_fields().count();
    if titles != 1 {
        return Err(SyncError::TitleProperty {
            model: model.name.clone(),
            count: titles,
        });
    }

    let descriptor = client
        .retrieve_database(&model.database_id)
        .await
        .map_err(|source| {
            if source.is_not_found() {
                SyncError::DatabaseNotFound {
                    model: model.name.clone(),
                    database_id: model.database_id.clone(),
                }
            } else {
                SyncError::Remote {
                    model: model.name.clone(),
                    database_id: model.database_id.clone(),
                    source,
                }
            }
        })?;

    let diff = diff_model(model, &descriptor);

    for name in &diff.missing {
        warn!(
            model = %model.name,
            database_id = %model.database_id,
            property = %name,
            "Property is declared in the schema but missing from the database"
        );
    }
    for name in &diff.extra {
        warn!(
            model = %model.name,
            property = %name,
            "Database property is not declared in the schema"
        );
    }

    if !diff.mismatches.is_empty() {
        return Err(SyncError::TypeMismatches {
            model: model.name.clone(),
            mismatches: diff.mismatches,
        });
    }

    info!(model = %model.name, database_id = %model.database_id, "Model validated");
    Ok(ModelReport {
        model: model.name.clone(),
        database_id: model.database_id.clone(),
        title: descriptor.title_text(),
        extra: diff.extra,
    })
}
