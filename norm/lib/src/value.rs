//! Decoded record values.

use std::collections::BTreeMap;

use serde::Serialize;

/// A person referenced by a `people` property.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Person {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// An unresolved reference to a related record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationRef {
    pub id: String,
}

/// Local value of one property.
///
/// Serializes untagged, so a [`Record`] turns into a flat JSON object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// `title`, `rich_text`, `select`, `formula`, `url`, `email`,
    /// `phone_number`, and unknown types.
    Text(String),
    Number(f64),
    Checkbox(bool),
    /// ISO start date, `None` when unset.
    Date(Option<String>),
    /// `multi_select` option names.
    List(Vec<String>),
    People(Vec<Person>),
    /// Relation stubs before resolution.
    Relation(Vec<RelationRef>),
    /// A resolved singular relation.
    Record(Box<Record>),
    /// A resolved plural relation.
    Records(Vec<Record>),
}

impl PropertyValue {
    /// Text content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Mirrors JavaScript truthiness for the value kinds a relation can hold.
    pub(crate) fn is_present(&self) -> bool {
        match self {
            Self::Text(text) => !text.is_empty(),
            Self::Date(date) => date.is_some(),
            Self::Number(n) => *n != 0.0,
            Self::Checkbox(b) => *b,
            _ => true,
        }
    }
}

/// A decoded page: system fields plus properties keyed by remote name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub created_time: String,
    pub last_edited_time: String,
    #[serde(flatten)]
    pub properties: BTreeMap<String, PropertyValue>,
}

impl Record {
    /// Looks up a property value by remote name.
    pub fn get(&self, property: &str) -> Option<&PropertyValue> {
        self.properties.get(property)
    }
}
