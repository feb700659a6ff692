//! Per-model query configuration derived from the schema.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use super::{NotionPropertyType, Schema};
use crate::client::NotionApi;
use crate::error::MappingError;
use crate::query::QueryBuilder;

/// Everything a query builder needs to know about one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelBinding {
    pub model: String,
    pub database_id: String,
    /// Local field name → remote property name.
    pub properties: HashMap<String, String>,
    /// Local relation field name → related model's database id.
    pub relations: HashMap<String, String>,
    /// Remote property name → type.
    pub property_types: HashMap<String, NotionPropertyType>,
}

impl ModelBinding {
    /// A query builder for this model.
    pub fn query<C: NotionApi>(&self, client: Arc<C>) -> QueryBuilder<C> {
        QueryBuilder::new(client, self.database_id.clone(), self.model.clone())
            .with_properties(self.properties.clone())
            .with_relations(self.relations.clone())
            .with_property_types(self.property_types.clone())
    }
}

impl Schema {
    /// Derives the binding for `model`.
    ///
    /// Relation fields whose target model is not declared are left out of the
    /// relation table with a warning; filtering on them fails at query time.
    ///
    /// ## Errors
    ///
    /// `MappingError::UnknownModel` if the schema does not declare `model`.
    ///
    /// ## Examples
    ///
    /// ```
    /// use norm_lib::parser::parse;
    ///
    /// let schema = parse(r#"
    /// model Task @notionDatabase("db1") {
    ///   name    String @title
    ///   project Project[] @map("Project")
    /// }
    /// model Project @notionDatabase("db2") {
    ///   name String @title
    /// }
    /// "#).unwrap();
    ///
    /// let binding = schema.binding("Task").unwrap();
    /// assert_eq!(binding.relations["project"], "db2");
    /// assert_eq!(binding.properties["project"], "Project");
    /// ```
    pub fn binding(&self, model: &str) -> Result<ModelBinding, MappingError> {
        let Some(found) = self.model(model) else {
            return Err(MappingError::UnknownModel {
                model: model.to_string(),
            });
        };

        let mut binding = ModelBinding {
            model: found.name.clone(),
            database_id: found.database_id.clone(),
            properties: HashMap::new(),
            relations: HashMap::new(),
            property_types: HashMap::new(),
        };

        for field in &found.fields {
            let remote = field.remote_name().to_string();
            binding.properties.insert(field.name.clone(), remote.clone());
            binding.property_types.insert(remote, field.property_type);

            let Some(target) = field.relation_target() else {
                continue;
            };
            match self.model(target) {
                Some(related) => {
                    binding
                        .relations
                        .insert(field.name.clone(), related.database_id.clone());
                }
                None => warn!(
                    model = %found.name,
                    field = %field.name,
                    target,
                    "Relation target is not declared in the schema"
                ),
            }
        }

        Ok(binding)
    }
}
