//! Validation engine: runs the Schema Model over a candidate and owns the
//! error formatting contract shown to users.
//!
//! Every violation is rendered as `"<path>: <message>"`, or the bare message
//! when it is about the root. One invocation's violations are joined by
//! newlines in the order the schema walk found them.
//! The path-keyed list is what the form uses for highlighting.

pub mod formats;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::path::FieldPath;
use crate::schema::resume_schema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub path: FieldPath,
    pub message: String,
}

impl FieldError {
    pub fn new(path: FieldPath, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_root() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ValidationResult {
    #[default]
    Valid,
    Invalid(Vec<FieldError>),
}

impl ValidationResult {
    pub fn from_errors(errors: Vec<FieldError>) -> Self {
        if errors.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid(errors)
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn errors(&self) -> &[FieldError] {
        match self {
            ValidationResult::Valid => &[],
            ValidationResult::Invalid(errors) => errors,
        }
    }

    /// Messages bound to exactly `path`, in discovery order.
    pub fn errors_at<'a>(&'a self, path: &'a FieldPath) -> impl Iterator<Item = &'a str> + 'a {
        self.errors()
            .iter()
            .filter(move |e| &e.path == path)
            .map(|e| e.message.as_str())
    }

    /// True if any error sits at `prefix` or anywhere below it.
    pub fn has_errors_within(&self, prefix: &FieldPath) -> bool {
        self.errors().iter().any(|e| e.path.starts_with(prefix))
    }

    /// The user-facing message, `None` when valid.
    pub fn formatted(&self) -> Option<String> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(errors) => Some(format_errors(errors)),
        }
    }
}

impl Serialize for ValidationResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ValidationResult", 2)?;
        state.serialize_field("valid", &self.is_valid())?;
        state.serialize_field("errors", self.errors())?;
        state.end()
    }
}

pub fn format_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Validates a parsed candidate against the canonical résumé schema.
pub fn validate_candidate(candidate: &Value) -> ValidationResult {
    resume_schema().validate(candidate)
}
