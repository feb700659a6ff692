//! Filter entries and their wire form.

use std::collections::{HashMap, HashSet};

use serde_json::{Value, json};
use strum::EnumString;
use tracing::warn;

use super::infer::{infer_property_type, looks_like_relation};
use crate::schema::NotionPropertyType;

/// Filter operator.
///
/// Parses from both camelCase and snake_case spellings. Anything else becomes
/// [`Operator::Other`], which compiles as `equals` with a warning.
#[derive(Debug, Clone, PartialEq, Eq, EnumString)]
pub enum Operator {
    #[strum(serialize = "equals")]
    Equals,
    #[strum(serialize = "contains")]
    Contains,
    #[strum(serialize = "startsWith", serialize = "starts_with")]
    StartsWith,
    #[strum(serialize = "endsWith", serialize = "ends_with")]
    EndsWith,
    #[strum(serialize = "before")]
    Before,
    #[strum(serialize = "after")]
    After,
    #[strum(serialize = "onOrBefore", serialize = "on_or_before")]
    OnOrBefore,
    #[strum(serialize = "onOrAfter", serialize = "on_or_after")]
    OnOrAfter,
    #[strum(serialize = "isEmpty", serialize = "is_empty")]
    IsEmpty,
    #[strum(serialize = "isNotEmpty", serialize = "is_not_empty")]
    IsNotEmpty,
    #[strum(default)]
    Other(String),
}

impl Operator {
    /// Parses an operator name. Unknown names become [`Operator::Other`].
    pub fn from_name(name: &str) -> Self {
        name.parse()
            .unwrap_or_else(|_| Self::Other(name.to_string()))
    }

    /// Key of the operator inside a typed clause.
    pub fn wire_key(&self) -> &str {
        match self {
            Self::Equals => "equals",
            Self::Contains => "contains",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
            Self::Before => "before",
            Self::After => "after",
            Self::OnOrBefore => "on_or_before",
            Self::OnOrAfter => "on_or_after",
            Self::IsEmpty => "is_empty",
            Self::IsNotEmpty => "is_not_empty",
            Self::Other(name) => name,
        }
    }

    /// Date comparisons always compile under the `date` clause.
    pub fn is_date_comparison(&self) -> bool {
        matches!(
            self,
            Self::Before | Self::After | Self::OnOrBefore | Self::OnOrAfter
        )
    }
}

/// One accumulated filter condition. Property names are already mapped to
/// their remote names.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterEntry {
    /// `filter(property, operator, value)`.
    Property {
        property: String,
        operator: Operator,
        value: Value,
    },
    /// `filter_relation(property, ...)`: the outer property plus the value of
    /// the sub-query's first condition.
    Relation { property: String, value: Value },
}

/// What the compiler knows about the target database's properties.
#[derive(Debug, Default)]
pub(crate) struct FilterContext<'a> {
    /// Remote names of known relation properties.
    pub relations: HashSet<&'a str>,
    /// Explicit types keyed by remote name.
    pub property_types: Option<&'a HashMap<String, NotionPropertyType>>,
}

impl FilterContext<'_> {
    fn is_relation(&self, property: &str) -> bool {
        self.relations.contains(property)
            || self.explicit_type(property) == Some(NotionPropertyType::Relation)
            || looks_like_relation(property)
    }

    fn explicit_type(&self, property: &str) -> Option<NotionPropertyType> {
        self.property_types.and_then(|t| t.get(property).copied())
    }

    /// Formula, people and files filters need clause shapes this compiler
    /// does not build, so those types fall back to the name heuristic.
    fn property_type(&self, property: &str) -> NotionPropertyType {
        self.explicit_type(property)
            .filter(|t| {
                !matches!(
                    t,
                    NotionPropertyType::Formula
                        | NotionPropertyType::People
                        | NotionPropertyType::Files
                )
            })
            .unwrap_or_else(|| infer_property_type(property))
    }
}

/// Compiles one entry to its wire form.
///
/// Relation-typed properties always compile to `relation.contains`; the
/// requested operator does not apply to them.
pub(crate) fn compile_entry(entry: &FilterEntry, ctx: &FilterContext<'_>) -> Value {
    match entry {
        FilterEntry::Relation { property, value } => relation_clause(property, value),
        FilterEntry::Property {
            property,
            operator,
            value,
        } => {
            if ctx.is_relation(property) {
                return relation_clause(property, value);
            }

            let (key, condition) = match operator {
                Operator::IsEmpty | Operator::IsNotEmpty => {
                    (operator.wire_key().to_string(), Value::Bool(true))
                }
                Operator::Other(name) => {
                    warn!(
                        property = %property,
                        operator = %name,
                        "Unrecognized filter operator, falling back to equals"
                    );
                    ("equals".to_string(), value.clone())
                }
                _ => (operator.wire_key().to_string(), value.clone()),
            };

            let type_tag = if operator.is_date_comparison() {
                NotionPropertyType::Date.tag()
            } else {
                ctx.property_type(property).tag()
            };

            let mut clause = serde_json::Map::new();
            clause.insert(key, condition);

            let mut filter = serde_json::Map::new();
            filter.insert("property".to_string(), Value::String(property.clone()));
            filter.insert(type_tag.to_string(), Value::Object(clause));
            Value::Object(filter)
        }
    }
}

fn relation_clause(property: &str, value: &Value) -> Value {
    json!({ "property": property, "relation": { "contains": value } })
}

/// Combines entries as a conjunction: `None` for no entries, the bare clause
/// for one, `{and: [...]}` in entry order for more.
pub(crate) fn compile_filters(entries: &[FilterEntry], ctx: &FilterContext<'_>) -> Option<Value> {
    match entries {
        [] => None,
        [single] => Some(compile_entry(single, ctx)),
        many => Some(json!({
            "and": many.iter().map(|e| compile_entry(e, ctx)).collect::<Vec<_>>()
        })),
    }
}
