//! Schema Model: the authoritative shape of a résumé document.
//!
//! The model is built once per process and shared read-only. It drives
//! validation directly; the JSON-Schema projection is derived from it for
//! display and for the form renderer and is never used to validate.

mod json_schema;
mod node;
mod resume;

use std::sync::LazyLock;

pub use node::{
    optional, required, EnumOption, NumberConstraints, ObjectSchema, Property, SchemaKind,
    SchemaNode, StringConstraints, StringFormat,
};

static RESUME_SCHEMA: LazyLock<SchemaNode> = LazyLock::new(resume::build);

static RESUME_JSON_SCHEMA: LazyLock<(serde_json::Value, String)> = LazyLock::new(|| {
    let value = RESUME_SCHEMA.to_json_schema();
    let text = serde_json::to_string_pretty(&value).unwrap_or_default();
    (value, text)
});

pub fn resume_schema() -> &'static SchemaNode {
    &RESUME_SCHEMA
}

/// Memoised JSON-Schema projection of [`resume_schema`].
pub fn json_schema() -> &'static serde_json::Value {
    &RESUME_JSON_SCHEMA.0
}

pub fn json_schema_text() -> &'static str {
    &RESUME_JSON_SCHEMA.1
}
