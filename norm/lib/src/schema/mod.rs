//! Schema intermediate representation.
//!
//! A [`Schema`] is the output of [`crate::parser::parse`]: an ordered list of
//! [`Model`]s, each bound to a Notion database and holding ordered
//! [`Field`]s. Declaration order is preserved everywhere because generated
//! output follows it.

mod binding;
mod property_type;

use std::fmt;

use serde::Serialize;

pub use binding::ModelBinding;
pub use property_type::{NotionPropertyType, resolve_property_type};

/// Parsed schema: models in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    pub models: Vec<Model>,
}

impl Schema {
    /// Finds a model by name.
    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.name == name)
    }

    /// Number of models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Returns `true` if the schema declares no model.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// A model bound to one Notion database.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Model {
    /// Model name; becomes a type name in generated code.
    pub name: String,
    /// Notion database id from `@notionDatabase("...")`.
    pub database_id: String,
    /// Fields in declaration order.
    pub fields: Vec<Field>,
}

impl Model {
    /// Finds a field by its local name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields resolving to the `title` property type.
    ///
    /// A record-backed model needs exactly one.
    pub fn title_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields
            .iter()
            .filter(|f| f.property_type == NotionPropertyType::Title)
    }
}

/// A single `@name` or `@name("argument")` decorator on a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: String,
    pub argument: Option<String>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, argument: Option<String>) -> Self {
        Self {
            name: name.into(),
            argument,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.argument {
            Some(arg) => write!(f, "@{}(\"{}\")", self.name, arg),
            None => write!(f, "@{}", self.name),
        }
    }
}

/// One field declaration inside a model body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    /// Local identifier used in generated code.
    pub name: String,
    /// Remote property name from `@map("...")`, if any.
    pub mapped_name: Option<String>,
    /// Declared type token including a `[]` suffix (`String`, `Task[]`).
    pub type_token: String,
    /// Resolved remote property type.
    pub property_type: NotionPropertyType,
    /// `true` when the type token carried a `?` suffix.
    pub optional: bool,
    /// Attributes in declaration order.
    pub attributes: Vec<Attribute>,
}

impl Field {
    /// Builds a field, resolving its property type from the type token and
    /// attributes.
    pub fn new(
        name: impl Into<String>,
        type_token: impl Into<String>,
        optional: bool,
        attributes: Vec<Attribute>,
    ) -> Self {
        let type_token = type_token.into();
        let property_type = resolve_property_type(&type_token, &attributes);
        let mapped_name = attributes
            .iter()
            .find(|a| a.name == "map")
            .and_then(|a| a.argument.clone());

        Self {
            name: name.into(),
            mapped_name,
            type_token,
            property_type,
            optional,
            attributes,
        }
    }

    /// Name of the Notion property this field binds to: the `@map` name if
    /// present, otherwise the local name.
    pub fn remote_name(&self) -> &str {
        self.mapped_name.as_deref().unwrap_or(&self.name)
    }

    /// `true` for `[]` type tokens.
    pub fn is_list(&self) -> bool {
        self.type_token.ends_with("[]")
    }

    /// Looks up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Model this relation field points at.
    ///
    /// Taken from `@relation("Model")` when given, otherwise from a list type
    /// token (`Task[]` → `Task`). `None` for non-relation fields.
    pub fn relation_target(&self) -> Option<&str> {
        if self.property_type != NotionPropertyType::Relation {
            return None;
        }
        if let Some(target) = self.attribute("relation").and_then(|a| a.argument.as_deref()) {
            return Some(target);
        }
        self.type_token.strip_suffix("[]")
    }
}
