//! Wire types returned by the Notion API.
//!
//! Only the parts the core reads are modeled. Property values on pages are
//! kept as raw JSON and decoded by [`crate::codec`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A rich-text segment; only its plain text is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
}

/// Snapshot of a database definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseDescriptor {
    pub id: String,
    #[serde(default)]
    pub title: Vec<RichText>,
    /// Properties keyed by their display name.
    #[serde(default)]
    pub properties: BTreeMap<String, RemoteProperty>,
}

impl DatabaseDescriptor {
    /// Database title as plain text.
    pub fn title_text(&self) -> String {
        self.title.iter().map(|t| t.plain_text.as_str()).collect()
    }

    /// Finds a property by name, ignoring case.
    pub fn property(&self, name: &str) -> Option<&RemoteProperty> {
        let wanted = name.to_lowercase();
        self.properties
            .iter()
            .find(|(key, _)| key.to_lowercase() == wanted)
            .map(|(_, property)| property)
    }
}

/// One property of a database definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteProperty {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Type tag (`title`, `rich_text`, `select`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Type-specific configuration, keyed by the type tag.
    #[serde(flatten)]
    pub config: Map<String, Value>,
}

impl RemoteProperty {
    /// Option names for `select`, `multi_select` and `status` properties.
    pub fn options(&self) -> Vec<String> {
        self.config
            .get(&self.kind)
            .and_then(|c| c.get("options"))
            .and_then(Value::as_array)
            .map(|options| {
                options
                    .iter()
                    .filter_map(|o| o.get("name").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A record stored in a database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub created_time: String,
    #[serde(default)]
    pub last_edited_time: String,
    /// Raw property values keyed by property name.
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<Page>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}
