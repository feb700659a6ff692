//! Schema text parser.
//!
//! Compiles schema text into a [`Schema`]. The grammar is line oriented:
//!
//! ```text
//! model Task @notionDatabase("0f3c...") {
//!   name      String    @title
//!   done      Boolean   @checkbox
//!   dueDate   DateTime? @map("Due Date")
//!   tags      String[]
//!   project   String    @relation("Project")
//! }
//! ```
//!
//! - A model header is `model <Name> @notionDatabase("<id>")`, followed by
//!   `{` on the same line or on the next non-blank line.
//! - A body closes on a line that is exactly `}`. A model header inside an
//!   open body means the body was never closed.
//! - Each other non-blank body line is `<name> <Type>[[]][?] [@attr ...]`,
//!   where attributes are `@name` or `@name("value")`.
//! - Blank lines and lines starting with `//` are ignored everywhere.
//!
//! Body lines that do not match the field grammar are skipped, not rejected.
//! [`parse_with_diagnostics`] returns them; [`parse`] logs them as warnings.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ParseError;
use crate::schema::{Attribute, Field, Model, Schema};

static MODEL_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^model\s+([A-Za-z_][A-Za-z0-9_]*)\b(.*)$").expect("valid regex"));

static DATABASE_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"@notionDatabase\(\s*"([^"]+)"\s*\)"#).expect("valid regex"));

static FIELD_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s+([A-Za-z_][A-Za-z0-9_]*(?:\[\])?)(\?)?(?:\s+(.*))?$")
        .expect("valid regex")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@([A-Za-z_][A-Za-z0-9_]*)(?:\(\s*"([^"]*)"\s*\))?"#).expect("valid regex")
});

/// A body line that did not match the field grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLine {
    /// Model whose body contained the line.
    pub model: String,
    /// 1-based line number.
    pub line: usize,
    /// The line as written, trimmed.
    pub text: String,
}

/// Parses schema text into models.
///
/// Unparseable field lines are logged and skipped.
///
/// ## Errors
///
/// - `ParseError::MissingDatabaseId` for a model header without a database id
/// - `ParseError::UnterminatedModel` for a body that is never closed
/// - `ParseError::DuplicateModel` when a model name repeats
/// - `ParseError::NoModels` when the input declares no model
///
/// ## Examples
///
/// ```
/// use norm_lib::parser::parse;
/// use norm_lib::schema::NotionPropertyType;
///
/// let schema = parse(r#"
/// model Task @notionDatabase("db1") {
///   name String @title
///   done Boolean @checkbox
/// }
/// "#).unwrap();
///
/// let task = &schema.models[0];
/// assert_eq!(task.name, "Task");
/// assert_eq!(task.database_id, "db1");
/// assert_eq!(task.fields[0].property_type, NotionPropertyType::Title);
/// assert_eq!(task.fields[1].property_type, NotionPropertyType::Checkbox);
/// ```
pub fn parse(text: &str) -> Result<Schema, ParseError> {
    let (schema, skipped) = parse_with_diagnostics(text)?;
    for s in &skipped {
        warn!(model = %s.model, line = s.line, "Skipping unparseable field line: `{}`", s.text);
    }
    Ok(schema)
}

/// Parses schema text, returning the skipped field lines alongside the schema.
///
/// ## Errors
///
/// Same as [`parse`].
pub fn parse_with_diagnostics(text: &str) -> Result<(Schema, Vec<SkippedLine>), ParseError> {
    let mut parser = Parser::new(text);
    parser.run()?;

    if parser.models.is_empty() {
        return Err(ParseError::NoModels);
    }

    debug!(models = parser.models.len(), skipped = parser.skipped.len(), "Parsed schema");
    Ok((Schema { models: parser.models }, parser.skipped))
}

/// Where the parser is relative to model blocks.
enum State {
    /// Between model blocks.
    TopLevel,
    /// After a header whose `{` has not been seen yet.
    AwaitingBody(PendingModel),
    /// Inside a model body.
    InBody(PendingModel),
}

struct PendingModel {
    name: String,
    database_id: String,
    header_line: usize,
    fields: Vec<Field>,
}

struct Parser<'a> {
    text: &'a str,
    models: Vec<Model>,
    skipped: Vec<SkippedLine>,
    seen: HashSet<String>,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            models: Vec::new(),
            skipped: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn run(&mut self) -> Result<(), ParseError> {
        let mut state = State::TopLevel;

        for (idx, raw) in self.text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }

            state = match state {
                State::TopLevel => self.top_level_line(line, line_no)?,
                State::AwaitingBody(pending) => {
                    if line == "{" {
                        State::InBody(pending)
                    } else {
                        return Err(ParseError::UnterminatedModel {
                            model: pending.name,
                            line: pending.header_line,
                        });
                    }
                }
                State::InBody(mut pending) => {
                    if line == "}" {
                        self.finish(pending);
                        State::TopLevel
                    } else if is_model_header(line) {
                        return Err(ParseError::UnterminatedModel {
                            model: pending.name,
                            line: pending.header_line,
                        });
                    } else {
                        match parse_field(line) {
                            Some(field) => pending.fields.push(field),
                            None => self.skipped.push(SkippedLine {
                                model: pending.name.clone(),
                                line: line_no,
                                text: line.to_string(),
                            }),
                        }
                        State::InBody(pending)
                    }
                }
            };
        }

        match state {
            State::TopLevel => Ok(()),
            State::AwaitingBody(pending) | State::InBody(pending) => {
                Err(ParseError::UnterminatedModel {
                    model: pending.name,
                    line: pending.header_line,
                })
            }
        }
    }

    fn top_level_line(&mut self, line: &str, line_no: usize) -> Result<State, ParseError> {
        let Some(caps) = MODEL_HEADER.captures(line) else {
            debug!(line = line_no, "Ignoring text outside model blocks");
            return Ok(State::TopLevel);
        };

        let name = caps[1].to_string();
        let rest = caps.get(2).map_or("", |m| m.as_str());

        let Some(db) = DATABASE_ATTR.captures(rest) else {
            return Err(ParseError::MissingDatabaseId {
                line: line_no,
                text: line.to_string(),
            });
        };

        if !self.seen.insert(name.clone()) {
            return Err(ParseError::DuplicateModel {
                model: name,
                line: line_no,
            });
        }

        let pending = PendingModel {
            name,
            database_id: db[1].to_string(),
            header_line: line_no,
            fields: Vec::new(),
        };

        if rest.trim_end().ends_with('{') {
            Ok(State::InBody(pending))
        } else {
            Ok(State::AwaitingBody(pending))
        }
    }

    fn finish(&mut self, pending: PendingModel) {
        debug!(
            model = %pending.name,
            fields = pending.fields.len(),
            "Parsed model"
        );
        self.models.push(Model {
            name: pending.name,
            database_id: pending.database_id,
            fields: pending.fields,
        });
    }
}

/// A field may be named `model`, so only a line that also carries a database
/// id counts as a header.
fn is_model_header(line: &str) -> bool {
    MODEL_HEADER
        .captures(line)
        .and_then(|caps| caps.get(2))
        .is_some_and(|rest| DATABASE_ATTR.is_match(rest.as_str()))
}

/// Parses one field line, or `None` if it does not match the field grammar.
fn parse_field(line: &str) -> Option<Field> {
    let caps = FIELD_LINE.captures(line)?;
    let name = &caps[1];
    let type_token = &caps[2];
    let optional = caps.get(3).is_some();
    let rest = caps.get(4).map_or("", |m| m.as_str());

    let attributes: Vec<Attribute> = ATTRIBUTE
        .captures_iter(rest)
        .map(|a| Attribute::new(&a[1], a.get(2).map(|v| v.as_str().to_string())))
        .collect();

    // Anything left besides attributes makes the line malformed.
    if !ATTRIBUTE.replace_all(rest, "").trim().is_empty() {
        return None;
    }

    Some(Field::new(name, type_token, optional, attributes))
}
