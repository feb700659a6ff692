//! Type reconciler: maps between declared field types and remote property
//! types, and diffs a model against a live database definition.

use tracing::debug;

use crate::client::{DatabaseDescriptor, RemoteProperty};
use crate::error::TypeMismatch;
use crate::schema::{Attribute, Field, Model, NotionPropertyType};

/// Remote type tag a field is expected to have.
pub fn expected_remote_type(field: &Field) -> &'static str {
    field.property_type.tag()
}

/// How a remote property would be declared in schema text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclaredType {
    /// Type token (`String`, `Boolean`, `String[]`, ...).
    pub type_token: &'static str,
    /// Attribute needed to pin the remote type, if the token alone does not.
    pub attribute: Option<&'static str>,
}

impl DeclaredType {
    const fn plain(type_token: &'static str) -> Self {
        Self {
            type_token,
            attribute: None,
        }
    }

    const fn with(type_token: &'static str, attribute: &'static str) -> Self {
        Self {
            type_token,
            attribute: Some(attribute),
        }
    }
}

/// The inverse of [`crate::schema::resolve_property_type`]: the declaration
/// that resolves back to `remote_tag`.
///
/// Tags with no schema counterpart (`status`, `rollup`, ...) map to a plain
/// `String`.
///
/// ## Examples
///
/// ```
/// use norm_lib::reconcile::schema_type_for;
///
/// assert_eq!(schema_type_for("checkbox").type_token, "Boolean");
/// assert_eq!(schema_type_for("title").attribute, Some("title"));
/// ```
pub fn schema_type_for(remote_tag: &str) -> DeclaredType {
    let Some(kind) = NotionPropertyType::from_tag(remote_tag) else {
        debug!(remote_tag, "No schema type for remote property, using String");
        return DeclaredType::plain("String");
    };

    match kind {
        NotionPropertyType::Title => DeclaredType::with("String", "title"),
        NotionPropertyType::RichText => DeclaredType::plain("String"),
        NotionPropertyType::Number => DeclaredType::plain("Number"),
        NotionPropertyType::Select => DeclaredType::with("String", "select"),
        NotionPropertyType::MultiSelect => DeclaredType::plain("String[]"),
        NotionPropertyType::Date => DeclaredType::plain("DateTime"),
        NotionPropertyType::Checkbox => DeclaredType::plain("Boolean"),
        NotionPropertyType::People => DeclaredType::plain("Json"),
        NotionPropertyType::Relation => DeclaredType::with("String[]", "relation"),
        NotionPropertyType::Formula => DeclaredType::with("String", "formula"),
        NotionPropertyType::Url => DeclaredType::with("String", "url"),
        NotionPropertyType::Email => DeclaredType::with("String", "email"),
        NotionPropertyType::PhoneNumber => DeclaredType::with("String", "phoneNumber"),
        NotionPropertyType::Files => DeclaredType::with("String", "files"),
    }
}

/// Builds the field declaration for a remote property, mapped to its remote
/// name when that is not a valid identifier.
pub fn suggest_field(property: &RemoteProperty) -> Field {
    let declared = schema_type_for(&property.kind);
    let local = local_identifier(&property.name);

    let mut attributes = Vec::new();
    if let Some(attr) = declared.attribute {
        attributes.push(Attribute::new(attr, None));
    }
    if local != property.name {
        attributes.push(Attribute::new("map", Some(property.name.clone())));
    }

    Field::new(local, declared.type_token, false, attributes)
}

/// camelCase identifier for a remote property name (`Due Date` → `dueDate`).
fn local_identifier(name: &str) -> String {
    let mut out = String::new();
    for (i, word) in name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .enumerate()
    {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            if i == 0 {
                out.extend(first.to_lowercase());
            } else {
                out.extend(first.to_uppercase());
            }
            out.push_str(chars.as_str());
        }
    }
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Finds the remote property a field binds to, ignoring case.
pub fn find_property<'a>(
    descriptor: &'a DatabaseDescriptor,
    field: &Field,
) -> Option<&'a RemoteProperty> {
    descriptor.property(field.remote_name())
}

/// Differences between a model and its live database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelDiff {
    /// Remote names of fields with no matching remote property.
    pub missing: Vec<String>,
    /// Remote properties no field binds to.
    pub extra: Vec<String>,
    /// Type disagreements, in field order. Missing properties are included
    /// with `got` set to `not found`.
    pub mismatches: Vec<TypeMismatch>,
}

impl ModelDiff {
    /// Returns `true` if the model can be used against the database as is.
    pub fn is_compatible(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Diffs a model's fields against a database definition.
///
/// ## Examples
///
/// ```
/// use norm_lib::client::DatabaseDescriptor;
/// use norm_lib::parser::parse;
/// use norm_lib::reconcile::diff_model;
/// use serde_json::json;
///
/// let schema = parse(r#"
/// model Task @notionDatabase("db1") {
///   name String @title
///   done Boolean
/// }
/// "#).unwrap();
///
/// let descriptor: DatabaseDescriptor = serde_json::from_value(json!({
///     "id": "db1",
///     "properties": {
///         "Name": {"id": "title", "name": "Name", "type": "title", "title": {}},
///         "Done": {"id": "a", "name": "Done", "type": "rich_text", "rich_text": {}}
///     }
/// })).unwrap();
///
/// let diff = diff_model(&schema.models[0], &descriptor);
/// assert_eq!(diff.mismatches.len(), 1);
/// assert_eq!(diff.mismatches[0].to_string(), "done: expected checkbox, got rich_text");
/// ```
pub fn diff_model(model: &Model, descriptor: &DatabaseDescriptor) -> ModelDiff {
    let mut diff = ModelDiff::default();

    for field in &model.fields {
        let expected = expected_remote_type(field).to_lowercase();
        match find_property(descriptor, field) {
            None => {
                diff.missing.push(field.remote_name().to_string());
                diff.mismatches.push(TypeMismatch {
                    field: field.name.clone(),
                    expected,
                    got: "not found".to_string(),
                });
            }
            Some(property) if property.kind != expected => {
                diff.mismatches.push(TypeMismatch {
                    field: field.name.clone(),
                    expected,
                    got: property.kind.clone(),
                });
            }
            Some(_) => {}
        }
    }

    let bound: Vec<String> = model
        .fields
        .iter()
        .map(|f| f.remote_name().to_lowercase())
        .collect();
    diff.extra = descriptor
        .properties
        .keys()
        .filter(|name| !bound.contains(&name.to_lowercase()))
        .cloned()
        .collect();

    diff
}
