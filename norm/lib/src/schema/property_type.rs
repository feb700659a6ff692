//! Notion property types and the declared-type resolution table.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use tracing::{debug, warn};

use super::Attribute;

/// Remote property types a schema field can resolve to.
///
/// The string form of each variant is the `type` tag Notion uses on the wire
/// (`rich_text`, `multi_select`, ...).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotionPropertyType {
    Title,
    RichText,
    Number,
    Select,
    MultiSelect,
    Date,
    Checkbox,
    Url,
    Email,
    PhoneNumber,
    People,
    Relation,
    Formula,
    Files,
}

impl NotionPropertyType {
    /// The wire tag for this type.
    pub fn tag(self) -> &'static str {
        self.into()
    }

    /// Looks up a wire tag, case-insensitively.
    pub fn from_tag(tag: &str) -> Option<Self> {
        tag.to_lowercase().parse().ok()
    }
}

/// Attribute overrides, checked in this order. The first attribute present on
/// the field wins.
const ATTRIBUTE_OVERRIDES: &[(&str, NotionPropertyType)] = &[
    ("title", NotionPropertyType::Title),
    ("checkbox", NotionPropertyType::Checkbox),
    ("date", NotionPropertyType::Date),
    ("people", NotionPropertyType::People),
    ("select", NotionPropertyType::Select),
    ("multiSelect", NotionPropertyType::MultiSelect),
    ("relation", NotionPropertyType::Relation),
    ("formula", NotionPropertyType::Formula),
    ("richText", NotionPropertyType::RichText),
    ("number", NotionPropertyType::Number),
    ("url", NotionPropertyType::Url),
    ("email", NotionPropertyType::Email),
    ("phoneNumber", NotionPropertyType::PhoneNumber),
    ("files", NotionPropertyType::Files),
];

/// Default remote type per declared type token.
const DECLARED_DEFAULTS: &[(&str, NotionPropertyType)] = &[
    ("String", NotionPropertyType::RichText),
    ("Boolean", NotionPropertyType::Checkbox),
    ("DateTime", NotionPropertyType::Date),
    ("Json", NotionPropertyType::People),
    ("String[]", NotionPropertyType::MultiSelect),
];

/// Resolves the remote property type of a field.
///
/// Resolution order, first match wins:
///
/// 1. Attribute overrides (`@title`, `@checkbox`, `@date`, `@people`,
///    `@select`, `@multiSelect`, `@relation`, `@formula`, `@richText`, then
///    `@number`, `@url`, `@email`, `@phoneNumber`, `@files`).
/// 2. Declared-type defaults (`String`, `Boolean`, `DateTime`, `Json`,
///    `String[]`). Any other list type (`Task[]`) is a relation.
/// 3. The lowercase type token read as a wire tag (`Number` → `number`).
/// 4. `rich_text`, with a warning.
///
/// The result depends only on the arguments.
///
/// ## Examples
///
/// ```
/// use norm_lib::schema::{resolve_property_type, Attribute, NotionPropertyType};
///
/// let date = Attribute::new("date", None);
/// assert_eq!(
///     resolve_property_type("Boolean", &[date]),
///     NotionPropertyType::Date
/// );
/// assert_eq!(resolve_property_type("Boolean", &[]), NotionPropertyType::Checkbox);
/// assert_eq!(resolve_property_type("Number", &[]), NotionPropertyType::Number);
/// ```
pub fn resolve_property_type(type_token: &str, attributes: &[Attribute]) -> NotionPropertyType {
    for (name, kind) in ATTRIBUTE_OVERRIDES {
        if attributes.iter().any(|a| a.name == *name) {
            return *kind;
        }
    }

    if let Some((_, kind)) = DECLARED_DEFAULTS.iter().find(|(t, _)| *t == type_token) {
        return *kind;
    }

    if type_token.ends_with("[]") {
        return NotionPropertyType::Relation;
    }

    let lowered = type_token.to_lowercase();
    if let Some(kind) = NotionPropertyType::from_tag(&lowered) {
        debug!(type_token, tag = kind.tag(), "Type token used as Notion property tag");
        return kind;
    }

    warn!(
        type_token,
        "No Notion property type for declared type, defaulting to rich_text"
    );
    NotionPropertyType::RichText
}
