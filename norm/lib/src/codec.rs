//! Property value codec: Notion property JSON to local values.
//!
//! Decoding never fails. Missing or malformed payloads decode to the type's
//! empty value (`""`, `0`, `false`, `[]`, `None`) and unknown type tags decode
//! to an empty string with a warning.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::warn;

use crate::client::Page;
use crate::value::{Person, PropertyValue, RelationRef, Record};

/// Decodes one property value, dispatching on its `type` tag.
///
/// ## Examples
///
/// ```
/// use norm_lib::codec::decode_property;
/// use norm_lib::value::PropertyValue;
/// use serde_json::json;
///
/// let value = decode_property(&json!({"type": "checkbox", "checkbox": true}));
/// assert_eq!(value, PropertyValue::Checkbox(true));
///
/// let value = decode_property(&json!({"type": "title", "title": []}));
/// assert_eq!(value, PropertyValue::Text(String::new()));
/// ```
pub fn decode_property(property: &Value) -> PropertyValue {
    let kind = property.get("type").and_then(Value::as_str).unwrap_or_default();
    let payload = property.get(kind).unwrap_or(&Value::Null);

    match kind {
        "title" | "rich_text" => PropertyValue::Text(first_plain_text(payload)),
        "number" => PropertyValue::Number(payload.as_f64().unwrap_or(0.0)),
        "select" => PropertyValue::Text(option_name(payload).unwrap_or_default()),
        "multi_select" => PropertyValue::List(
            payload
                .as_array()
                .map(|options| options.iter().filter_map(option_name).collect())
                .unwrap_or_default(),
        ),
        "date" => PropertyValue::Date(
            payload
                .get("start")
                .and_then(Value::as_str)
                .map(str::to_string),
        ),
        "checkbox" => PropertyValue::Checkbox(payload.as_bool().unwrap_or(false)),
        "people" => PropertyValue::People(
            payload
                .as_array()
                .map(|people| people.iter().map(decode_person).collect())
                .unwrap_or_default(),
        ),
        "relation" => PropertyValue::Relation(
            payload
                .as_array()
                .map(|refs| {
                    refs.iter()
                        .filter_map(|r| r.get("id").and_then(Value::as_str))
                        .map(|id| RelationRef { id: id.to_string() })
                        .collect()
                })
                .unwrap_or_default(),
        ),
        "formula" => PropertyValue::Text(decode_formula(payload)),
        "files" => PropertyValue::List(
            payload
                .as_array()
                .map(|files| files.iter().filter_map(option_name).collect())
                .unwrap_or_default(),
        ),
        "url" | "email" | "phone_number" => {
            PropertyValue::Text(payload.as_str().unwrap_or_default().to_string())
        }
        other => {
            warn!(property_type = other, "Unknown Notion property type, decoding as empty string");
            PropertyValue::Text(String::new())
        }
    }
}

/// Decodes every property of a page, keyed by remote property name.
pub fn decode_properties(properties: &Map<String, Value>) -> BTreeMap<String, PropertyValue> {
    properties
        .iter()
        .map(|(name, value)| (name.clone(), decode_property(value)))
        .collect()
}

/// Decodes a page into a [`Record`] with its system fields attached.
pub fn decode_page(page: &Page) -> Record {
    Record {
        id: page.id.clone(),
        created_time: page.created_time.clone(),
        last_edited_time: page.last_edited_time.clone(),
        properties: decode_properties(&page.properties),
    }
}

fn first_plain_text(segments: &Value) -> String {
    segments
        .as_array()
        .and_then(|s| s.first())
        .and_then(|s| s.get("plain_text"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn option_name(option: &Value) -> Option<String> {
    option.get("name").and_then(Value::as_str).map(str::to_string)
}

fn decode_person(person: &Value) -> Person {
    Person {
        id: person
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        name: person
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        avatar_url: person
            .get("avatar_url")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

fn decode_formula(formula: &Value) -> String {
    if let Some(s) = formula.get("string").and_then(Value::as_str) {
        return s.to_string();
    }
    if let Some(n) = formula.get("number").and_then(Value::as_f64) {
        return n.to_string();
    }
    String::new()
}
