//! Store-agnostic document selectors.
//!
//! A [`Selector`] is the filter a maintenance task uses to pick the
//! documents it audits and mutates. The same value is evaluated in-process
//! by [`Selector::matches`] and translated to a native query by the `db`
//! crate, so both paths must agree on null/absent semantics.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

/// Filter describing which documents a task affects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Selector {
    /// Every document in the collection.
    All,
    /// The field is absent or explicitly `null`.
    IsNull { field: String },
    /// The field is absent.
    Missing { field: String },
    /// The field equals the literal `value`. An array field matches when it
    /// contains `value`. `value` must not be `null` (use [`Selector::IsNull`])
    /// and no object inside it may have a `$`-prefixed key.
    Equals { field: String, value: Value },
    /// Every clause matches.
    And { clauses: Vec<Selector> },
}

impl Selector {
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::IsNull {
            field: field.into(),
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::Missing {
            field: field.into(),
        }
    }

    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Check that every field path is well formed, every `equals` value is a
    /// literal, and every `and` has at least one clause.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::All => Ok(()),
            Self::IsNull { field } | Self::Missing { field } => validate_field_path(field),
            Self::Equals { field, value } => {
                validate_field_path(field)?;
                validate_literal(field, value)
            }
            Self::And { clauses } => {
                if clauses.is_empty() {
                    return Err(CoreError::Validation(
                        "An 'and' selector needs at least one clause".to_string(),
                    ));
                }
                clauses.iter().try_for_each(Selector::validate)
            }
        }
    }

    /// Evaluate the selector against a document.
    pub fn matches(&self, doc: &Value) -> bool {
        match self {
            Self::All => true,
            Self::IsNull { field } => matches!(lookup(doc, field), None | Some(Value::Null)),
            Self::Missing { field } => lookup(doc, field).is_none(),
            Self::Equals { field, value } => match lookup(doc, field) {
                Some(Value::Array(items)) if !value.is_array() => items.contains(value),
                Some(found) => found == value,
                None => false,
            },
            Self::And { clauses } => clauses.iter().all(|c| c.matches(doc)),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all documents"),
            Self::IsNull { field } => write!(f, "{field} is null or absent"),
            Self::Missing { field } => write!(f, "{field} is absent"),
            Self::Equals { field, value } => write!(f, "{field} = {value}"),
            Self::And { clauses } => {
                for (i, clause) in clauses.iter().enumerate() {
                    if i > 0 {
                        write!(f, " and ")?;
                    }
                    write!(f, "({clause})")?;
                }
                Ok(())
            }
        }
    }
}

/// Validate a dotted field path such as `captain.name`.
pub fn validate_field_path(path: &str) -> Result<(), CoreError> {
    if path.is_empty() {
        return Err(CoreError::Validation(
            "Field path must not be empty".to_string(),
        ));
    }
    if path.starts_with('$') {
        return Err(CoreError::Validation(format!(
            "Field path '{path}' must not start with '$'"
        )));
    }
    if path.split('.').any(str::is_empty) {
        return Err(CoreError::Validation(format!(
            "Field path '{path}' contains an empty segment"
        )));
    }
    Ok(())
}

/// Reject values a document store would read as something other than a
/// literal: `null` (which also matches absent fields) and operator objects.
fn validate_literal(field: &str, value: &Value) -> Result<(), CoreError> {
    if value.is_null() {
        return Err(CoreError::Validation(format!(
            "Equality on '{field}' cannot compare against null; use is_null or missing"
        )));
    }
    match find_operator_key(value) {
        Some(key) => Err(CoreError::Validation(format!(
            "Equality value for '{field}' contains operator key '{key}'"
        ))),
        None => Ok(()),
    }
}

fn find_operator_key(value: &Value) -> Option<&str> {
    match value {
        Value::Object(map) => map.iter().find_map(|(key, inner)| {
            if key.starts_with('$') {
                Some(key.as_str())
            } else {
                find_operator_key(inner)
            }
        }),
        Value::Array(items) => items.iter().find_map(find_operator_key),
        _ => None,
    }
}

/// Resolve a dotted path inside a JSON document.
fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(doc, |current, segment| current.as_object()?.get(segment))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
