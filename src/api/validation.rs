//! Request body validation for todo payloads.
//!
//! A body goes through three steps before any handler logic sees it: it must
//! parse as JSON, it must match the payload schema (allowed keys and their
//! types), and the remaining field rules are checked while converting it into
//! a typed `TodoDraft` or `TodoChanges`.

use chrono::NaiveDateTime;
use jsonschema::Validator;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Map, Value};

use crate::api::errors::ApiError;
use crate::db::{TodoChanges, TodoDraft};
use crate::errors::Error;
use crate::utils::time::parse_timestamp;

/// Keys a create or update payload may contain, with their JSON types
const ALLOWED_FIELDS: [(&str, &[&str]); 4] = [
    ("title", &["string"]),
    ("description", &["string", "null"]),
    ("completed", &["boolean"]),
    ("deadline_at", &["string", "null"]),
];

/// Why a request body was rejected
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("Request body must be valid JSON: {0}")]
    NotJson(#[source] serde_json::Error),
    #[error("Invalid todo payload: {0}")]
    Schema(String),
    #[error("title is required")]
    MissingTitle,
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("deadline_at must be an ISO-8601 timestamp, got '{0}'")]
    InvalidDeadline(String),
}

impl From<PayloadError> for ApiError {
    fn from(err: PayloadError) -> Self {
        ApiError::bad_request(&err.to_string())
    }
}

/// Builds the JSON Schema for todo payloads
///
/// # Arguments
/// * `require_title` - Whether `title` must be present (create) or not (update)
fn todo_schema(require_title: bool) -> Value {
    let properties: Map<String, Value> = ALLOWED_FIELDS
        .iter()
        .map(|(name, types)| (name.to_string(), json!({ "type": types })))
        .collect();

    let mut schema = json!({
        "type": "object",
        "properties": properties,
        "additionalProperties": false
    });
    if require_title {
        schema["required"] = json!(["title"]);
    }
    schema
}

/// Typed view of a payload that already matched the schema.
///
/// Nullable fields use a double `Option`: `None` when the key is absent,
/// `Some(None)` when it is explicitly `null`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TodoPayload {
    title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    description: Option<Option<String>>,
    completed: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    deadline_at: Option<Option<String>>,
}

fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn check_title(title: String) -> Result<String, PayloadError> {
    if title.trim().is_empty() {
        return Err(PayloadError::EmptyTitle);
    }
    Ok(title)
}

fn parse_deadline(raw: String) -> Result<NaiveDateTime, PayloadError> {
    parse_timestamp(&raw).ok_or(PayloadError::InvalidDeadline(raw))
}

/// Compiled validators for create and update payloads
pub struct PayloadValidator {
    create: Validator,
    update: Validator,
}

impl PayloadValidator {
    /// Compiles both payload schemas
    ///
    /// # Errors
    /// Returns `Error::SchemaError` if a schema does not compile
    pub fn new() -> Result<Self, Error> {
        let compile = |schema: Value| {
            jsonschema::validator_for(&schema).map_err(|e| Error::SchemaError(e.to_string()))
        };
        Ok(PayloadValidator {
            create: compile(todo_schema(true))?,
            update: compile(todo_schema(false))?,
        })
    }

    /// Validates a create body and converts it into a draft
    ///
    /// `completed` defaults to false and `description` to none.
    pub fn new_todo(&self, body: &[u8]) -> Result<TodoDraft, PayloadError> {
        let payload = Self::check(&self.create, body)?;

        let title = check_title(payload.title.ok_or(PayloadError::MissingTitle)?)?;
        let deadline_at = payload
            .deadline_at
            .flatten()
            .map(parse_deadline)
            .transpose()?;

        Ok(TodoDraft {
            title,
            description: payload.description.flatten(),
            completed: payload.completed.unwrap_or(false),
            deadline_at,
        })
    }

    /// Validates an update body and converts it into a changeset
    ///
    /// Only keys present in the body end up in the changeset.
    pub fn todo_changes(&self, body: &[u8]) -> Result<TodoChanges, PayloadError> {
        let payload = Self::check(&self.update, body)?;

        let title = payload.title.map(check_title).transpose()?;
        let deadline_at = match payload.deadline_at {
            None => None,
            Some(None) => Some(None),
            Some(Some(raw)) => Some(Some(parse_deadline(raw)?)),
        };

        Ok(TodoChanges {
            title,
            description: payload.description,
            completed: payload.completed,
            deadline_at,
        })
    }

    fn check(validator: &Validator, body: &[u8]) -> Result<TodoPayload, PayloadError> {
        let value: Value = serde_json::from_slice(body).map_err(PayloadError::NotJson)?;

        if let Some(err) = validator.iter_errors(&value).next() {
            return Err(PayloadError::Schema(err.to_string()));
        }

        serde_json::from_value(value).map_err(|e| PayloadError::Schema(e.to_string()))
    }
}
