//! Name-based property type inference.
//!
//! Used only when the builder has no explicit type for a property. Bindings
//! derived from a parsed schema carry explicit types, so these rules apply to
//! ad-hoc queries.

use crate::schema::NotionPropertyType;

/// Guesses a property's type from its name.
///
/// Rules, first match wins (case-insensitive):
///
/// | name                              | type           |
/// |-----------------------------------|----------------|
/// | `title` or `name`                 | `title`        |
/// | ends with `at`, contains `date`   | `date`         |
/// | starts with `is`, or `active`     | `checkbox`     |
/// | contains `tags`                   | `multi_select` |
/// | contains `status`                 | `select`       |
/// | anything else                     | `rich_text`    |
///
/// ## Examples
///
/// ```
/// use norm_lib::query::infer_property_type;
/// use norm_lib::schema::NotionPropertyType;
///
/// assert_eq!(infer_property_type("Created At"), NotionPropertyType::Date);
/// assert_eq!(infer_property_type("isArchived"), NotionPropertyType::Checkbox);
/// assert_eq!(infer_property_type("Notes"), NotionPropertyType::RichText);
/// ```
pub fn infer_property_type(property: &str) -> NotionPropertyType {
    let name = property.to_lowercase();

    if name == "title" || name == "name" {
        NotionPropertyType::Title
    } else if name.ends_with("at") || name.contains("date") {
        NotionPropertyType::Date
    } else if name.starts_with("is") || name == "active" {
        NotionPropertyType::Checkbox
    } else if name.contains("tags") {
        NotionPropertyType::MultiSelect
    } else if name.contains("status") {
        NotionPropertyType::Select
    } else {
        NotionPropertyType::RichText
    }
}

/// Returns `true` if a property name looks like a relation: exactly `domain`
/// or `documents`, or containing `relation` (case-insensitive).
pub fn looks_like_relation(property: &str) -> bool {
    let name = property.to_lowercase();
    name == "domain" || name == "documents" || name.contains("relation")
}
