//! Sort entries and their wire form.

use serde_json::{Value, json};
use strum::{Display, EnumString};

/// Sort direction, in its wire spelling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
pub enum SortDirection {
    #[default]
    #[strum(to_string = "ascending", serialize = "asc")]
    Ascending,
    #[strum(to_string = "descending", serialize = "desc")]
    Descending,
}

/// One accumulated sort. The property name is already mapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortEntry {
    pub property: String,
    pub direction: SortDirection,
}

/// System timestamp a sort property stands for, if any.
fn system_timestamp(property: &str) -> Option<&'static str> {
    match property {
        "createdTime" | "Created At" | "created_time" => Some("created_time"),
        "lastEditedTime" | "last_edited_time" => Some("last_edited_time"),
        _ => None,
    }
}

/// Compiles a sort. System timestamps sort by `timestamp`, everything else by
/// `property`.
pub(crate) fn compile_sort(entry: &SortEntry) -> Value {
    let direction = entry.direction.to_string();
    match system_timestamp(&entry.property) {
        Some(timestamp) => json!({ "timestamp": timestamp, "direction": direction }),
        None => json!({ "property": entry.property, "direction": direction }),
    }
}
