//! Representation converters between the canonical document, pretty JSON
//! text and YAML text.
//!
//! Two levels: a *candidate* is the parsed but unvalidated `Value` tree, a
//! *document* is the typed [`Resume`]. Syntax failures are reported here;
//! schema checks belong to the validation engine.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::document::Resume;

#[derive(Debug, Error)]
pub enum SyntaxError {
    #[error("Invalid JSON format: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML format: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// The tree parsed but does not fit the typed document.
    #[error("Document shape mismatch: {0}")]
    Shape(String),

    #[error("Failed to encode document: {0}")]
    Encode(String),
}

/// Anything the intake accepts: either text form, or an already-parsed tree.
/// On the wire: `{"format": "json" | "yaml" | "object", "content": ...}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "format", content = "content", rename_all = "lowercase")]
pub enum RawInput {
    Json(String),
    Yaml(String),
    Object(Value),
}

pub fn parse_input(input: RawInput) -> Result<Value, SyntaxError> {
    match input {
        RawInput::Json(text) => json_text_to_candidate(&text),
        RawInput::Yaml(text) => yaml_text_to_candidate(&text),
        RawInput::Object(value) => Ok(value),
    }
}

pub fn json_text_to_candidate(text: &str) -> Result<Value, SyntaxError> {
    Ok(serde_json::from_str(text)?)
}

pub fn yaml_text_to_candidate(text: &str) -> Result<Value, SyntaxError> {
    // serde_yaml maps an empty stream to null; keep that as a candidate so the
    // validator reports the type mismatch.
    Ok(serde_yaml::from_str(text)?)
}

pub fn candidate_to_document(candidate: Value) -> Result<Resume, ConvertError> {
    serde_json::from_value(candidate).map_err(|e| ConvertError::Shape(e.to_string()))
}

pub fn json_text_to_document(text: &str) -> Result<Resume, ConvertError> {
    candidate_to_document(json_text_to_candidate(text)?)
}

pub fn yaml_text_to_document(text: &str) -> Result<Resume, ConvertError> {
    candidate_to_document(yaml_text_to_candidate(text)?)
}

pub fn document_to_value(doc: &Resume) -> Result<Value, ConvertError> {
    serde_json::to_value(doc).map_err(|e| ConvertError::Encode(e.to_string()))
}

/// Pretty JSON, two-space indent, keys in declared field order.
pub fn document_to_json_text(doc: &Resume) -> Result<String, ConvertError> {
    serde_json::to_string_pretty(doc).map_err(|e| ConvertError::Encode(e.to_string()))
}

pub fn document_to_yaml_text(doc: &Resume) -> Result<String, ConvertError> {
    serde_yaml::to_string(doc).map_err(|e| ConvertError::Encode(e.to_string()))
}
