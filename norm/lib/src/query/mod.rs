//! Query builder: accumulates filters, sorts and includes through chained
//! calls, compiles them to the Notion query body, executes it and decodes the
//! results.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use norm_lib::client::NotionClient;
//! use norm_lib::config::NormConfig;
//! use norm_lib::query::{QueryBuilder, SortDirection};
//!
//! # async fn run() -> Result<(), norm_lib::error::NormError> {
//! let client = Arc::new(NotionClient::from_config(&NormConfig::from_env()?)?);
//!
//! let tasks = QueryBuilder::new(client, "db1", "Task")
//!     .filter("Status", "equals", "Doing")
//!     .filter("Due", "before", "2024-07-01")
//!     .order_by("Created At", SortDirection::Descending)
//!     .limit(20)
//!     .execute()
//!     .await?;
//!
//! for task in tasks {
//!     println!("{}", task.id);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Property types drive the clause shape of each filter. Builders derived
//! from a parsed schema (see [`crate::schema::ModelBinding`]) know every
//! type; otherwise types are inferred from property names by
//! [`infer_property_type`].

mod cache;
mod filter;
mod infer;
mod sort;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::try_join_all;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::{debug, error, info, instrument, warn};

use crate::client::NotionApi;
use crate::codec::decode_page;
use crate::error::{MappingError, RemoteError};
use crate::schema::NotionPropertyType;
use crate::value::{PropertyValue, Record};

pub use cache::RELATION_CACHE_TTL;
pub use filter::{FilterEntry, Operator};
pub use infer::{infer_property_type, looks_like_relation};
pub use sort::{SortDirection, SortEntry};

use cache::RelationCache;
use filter::{FilterContext, compile_filters};
use sort::compile_sort;

/// One page of decoded results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPage {
    pub records: Vec<Record>,
    /// Cursor for the next page, passed back through [`QueryBuilder::after`].
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// Builder for one query against one database.
///
/// Chaining methods map each local property name through the property table
/// (falling back to the name as given) and return the builder. Executing
/// consumes it; build a new one per query.
pub struct QueryBuilder<C> {
    client: Arc<C>,
    database_id: String,
    model: String,
    /// Local field name → remote property name.
    properties: HashMap<String, String>,
    /// Relation property name → related database id.
    relations: HashMap<String, String>,
    /// Remote property name → type.
    property_types: HashMap<String, NotionPropertyType>,
    filters: Vec<FilterEntry>,
    sorts: Vec<SortEntry>,
    includes: Vec<String>,
    page_size: Option<u32>,
    start_cursor: Option<String>,
    debug: bool,
    cache: RelationCache,
}

impl<C: NotionApi> QueryBuilder<C> {
    /// Creates an empty query against `database_id`. `model` names the
    /// target in diagnostics.
    pub fn new(client: Arc<C>, database_id: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            database_id: database_id.into(),
            model: model.into(),
            properties: HashMap::new(),
            relations: HashMap::new(),
            property_types: HashMap::new(),
            filters: Vec::new(),
            sorts: Vec::new(),
            includes: Vec::new(),
            page_size: None,
            start_cursor: None,
            debug: false,
            cache: RelationCache::default(),
        }
    }

    /// Sets the local → remote property name table.
    pub fn with_properties(mut self, properties: HashMap<String, String>) -> Self {
        self.properties = properties;
        self
    }

    /// Sets the relation property → related database id table used by
    /// [`filter_relation`](Self::filter_relation).
    pub fn with_relations(mut self, relations: HashMap<String, String>) -> Self {
        self.relations = relations;
        self
    }

    /// Sets explicit property types, keyed by remote name. Explicit types take
    /// precedence over name inference.
    pub fn with_property_types(mut self, types: HashMap<String, NotionPropertyType>) -> Self {
        self.property_types = types;
        self
    }

    /// Logs compiled queries at `info` instead of `debug`.
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Database the query targets.
    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    fn remote_name<'a>(&'a self, property: &'a str) -> &'a str {
        self.properties
            .get(property)
            .map(String::as_str)
            .unwrap_or(property)
    }

    /// Adds a condition. Conditions combine with `and`.
    ///
    /// `is_empty` and `is_not_empty` ignore `value`. Unrecognized operators
    /// compile as `equals` with a warning.
    pub fn filter(
        mut self,
        property: &str,
        operator: &str,
        value: impl Into<Value>,
    ) -> Self {
        let property = self.remote_name(property).to_string();
        self.filters.push(FilterEntry::Property {
            property,
            operator: Operator::from_name(operator),
            value: value.into(),
        });
        self
    }

    /// Adds a condition on a relation, configured on a sub-query against the
    /// related database.
    ///
    /// Only the first condition of the sub-query is used; the related page id
    /// it carries becomes `relation.contains`. Further conditions are dropped
    /// with a warning.
    ///
    /// ## Errors
    ///
    /// - `MappingError::UnknownRelation` if `property` has no related database
    /// - `MappingError::EmptyRelationFilter` if `configure` adds no condition
    pub fn filter_relation<F>(mut self, property: &str, configure: F) -> Result<Self, MappingError>
    where
        F: FnOnce(QueryBuilder<C>) -> QueryBuilder<C>,
    {
        let Some(target) = self.relations.get(property) else {
            return Err(MappingError::UnknownRelation {
                model: self.model.clone(),
                property: property.to_string(),
            });
        };

        let sub = configure(QueryBuilder::new(self.client.clone(), target.clone(), property));
        let mut conditions = sub.filters.into_iter();
        let Some(first) = conditions.next() else {
            return Err(MappingError::EmptyRelationFilter {
                model: self.model.clone(),
                property: property.to_string(),
            });
        };

        let dropped = conditions.count();
        if dropped > 0 {
            warn!(
                model = %self.model,
                relation = property,
                dropped,
                "Relation filters use only their first condition; dropping the rest"
            );
        }

        let value = match first {
            FilterEntry::Property { value, .. } | FilterEntry::Relation { value, .. } => value,
        };
        let property = self.remote_name(property).to_string();
        self.filters.push(FilterEntry::Relation { property, value });
        Ok(self)
    }

    /// Resolves a relation property on every result.
    pub fn include(mut self, relation: &str) -> Self {
        let relation = self.remote_name(relation).to_string();
        if !self.includes.contains(&relation) {
            self.includes.push(relation);
        }
        self
    }

    /// Adds a sort. `createdTime`/`Created At` and `lastEditedTime` sort by
    /// the system timestamps.
    pub fn order_by(mut self, property: &str, direction: SortDirection) -> Self {
        let property = self.remote_name(property).to_string();
        self.sorts.push(SortEntry {
            property,
            direction,
        });
        self
    }

    /// Sets the page size.
    pub fn limit(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Continues from a cursor returned by a previous page.
    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.start_cursor = Some(cursor.into());
        self
    }

    /// The query body: `{database_id, filter?, sorts?, page_size?,
    /// start_cursor?}`.
    pub fn compile(&self) -> Value {
        let ctx = FilterContext {
            relations: self
                .relations
                .keys()
                .flat_map(|k| [k.as_str(), self.remote_name(k)])
                .collect::<HashSet<_>>(),
            property_types: Some(&self.property_types),
        };

        let mut query = Map::new();
        query.insert("database_id".to_string(), json!(self.database_id));
        if let Some(filter) = compile_filters(&self.filters, &ctx) {
            query.insert("filter".to_string(), filter);
        }
        if !self.sorts.is_empty() {
            let sorts = self.sorts.iter().map(compile_sort).collect();
            query.insert("sorts".to_string(), Value::Array(sorts));
        }
        if let Some(page_size) = self.page_size {
            query.insert("page_size".to_string(), json!(page_size));
        }
        if let Some(cursor) = &self.start_cursor {
            query.insert("start_cursor".to_string(), json!(cursor));
        }
        Value::Object(query)
    }

    /// Runs the query and returns the decoded records.
    ///
    /// ## Errors
    ///
    /// Any `RemoteError` from the query or from fetching included relations.
    pub async fn execute(self) -> Result<Vec<Record>, RemoteError> {
        Ok(self.execute_page().await?.records)
    }

    /// Runs the query and returns the decoded records with paging state.
    ///
    /// ## Errors
    ///
    /// Any `RemoteError` from the query or from fetching included relations.
    #[instrument(skip(self), fields(model = %self.model, database_id = %self.database_id))]
    pub async fn execute_page(self) -> Result<QueryPage, RemoteError> {
        let query = self.compile();
        if self.debug {
            info!(%query, "Executing query");
        } else {
            debug!(%query, "Executing query");
        }

        let response = self
            .client
            .query_database(&query)
            .await
            .inspect_err(|e| self.log_failure(e, &query))?;

        let mut records: Vec<Record> = response.results.iter().map(decode_page).collect();
        if !self.includes.is_empty() {
            try_join_all(records.iter_mut().map(|r| self.load_relations(r))).await?;
        }

        debug!(count = records.len(), has_more = response.has_more, "Query returned");
        Ok(QueryPage {
            records,
            next_cursor: response.next_cursor,
            has_more: response.has_more,
        })
    }

    /// Runs the query and deserializes each record into `T`.
    ///
    /// Records serialize as flat objects: `id`, `createdTime`,
    /// `lastEditedTime`, then one key per remote property name.
    ///
    /// ## Errors
    ///
    /// `RemoteError::Decode` if a record does not fit `T`, or any error from
    /// [`execute`](Self::execute).
    pub async fn execute_as<T: DeserializeOwned>(self) -> Result<Vec<T>, RemoteError> {
        self.execute()
            .await?
            .into_iter()
            .map(|record| {
                serde_json::to_value(&record)
                    .and_then(serde_json::from_value)
                    .map_err(|e| RemoteError::Decode(e.to_string()))
            })
            .collect()
    }

    /// Replaces each included relation on `record` with the related records.
    ///
    /// A singular stored id becomes one record, a list of references becomes
    /// a list of records. Relations that are absent or empty are left as
    /// they are. Related records are served from this builder's cache within
    /// [`RELATION_CACHE_TTL`].
    ///
    /// ## Errors
    ///
    /// Any `RemoteError` from fetching a related page.
    pub async fn load_relations(&self, record: &mut Record) -> Result<(), RemoteError> {
        let mut pending = Vec::new();

        for name in &self.includes {
            let Some(value) = record.properties.get(name) else {
                continue;
            };
            if !value.is_present() {
                continue;
            }

            let (ids, singular) = match value {
                PropertyValue::Text(id) => (vec![id.clone()], true),
                PropertyValue::Relation(refs) => {
                    (refs.iter().map(|r| r.id.clone()).collect::<Vec<_>>(), false)
                }
                PropertyValue::Record(_) | PropertyValue::Records(_) => continue,
                _ => {
                    warn!(
                        model = %self.model,
                        relation = %name,
                        "Included property does not hold a relation"
                    );
                    continue;
                }
            };

            pending.push(async move {
                let related = try_join_all(ids.iter().map(|id| self.fetch_related(id))).await?;
                Ok::<_, RemoteError>((name, singular, related))
            });
        }

        for (name, singular, mut related) in try_join_all(pending).await? {
            let value = if singular {
                match related.pop() {
                    Some(one) => PropertyValue::Record(Box::new(one)),
                    None => continue,
                }
            } else {
                PropertyValue::Records(related)
            };
            record.properties.insert(name.clone(), value);
        }
        Ok(())
    }

    async fn fetch_related(&self, id: &str) -> Result<Record, RemoteError> {
        if let Some(record) = self.cache.get(id).await {
            return Ok(record);
        }

        let page = self.client.retrieve_page(id).await.inspect_err(|e| {
            error!(model = %self.model, page_id = id, error = %e, "Failed to load related page");
        })?;
        let record = decode_page(&page);
        self.cache.insert(id, record.clone()).await;
        Ok(record)
    }

    fn log_failure(&self, err: &RemoteError, query: &Value) {
        match err {
            RemoteError::Validation { code, message } => error!(
                model = %self.model,
                database_id = %self.database_id,
                code = %code,
                detail = %message,
                %query,
                "Notion rejected the compiled query"
            ),
            _ => error!(
                model = %self.model,
                database_id = %self.database_id,
                error = %err,
                "Query failed"
            ),
        }
    }
}
