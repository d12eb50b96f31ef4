use serde_json::{json, Map, Value};

use super::node::{SchemaKind, SchemaNode};

const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";

impl SchemaNode {
    /// Projects the node to a draft-07 JSON Schema. Deterministic: the same
    /// node always yields the same document, keys in declaration order.
    pub fn to_json_schema(&self) -> Value {
        json!({
            "$ref": "#/definitions/resume",
            "definitions": { "resume": self.project() },
            "$schema": DRAFT_07,
        })
    }

    fn project(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".into(), Value::from(self.type_name()));

        match &self.kind {
            SchemaKind::String(c) => {
                if let Some(format) = c.format {
                    out.insert("format".into(), Value::from(format.as_str()));
                }
                if let Some(values) = &c.enum_values {
                    out.insert("enum".into(), json!(values));
                }
                if let Some(options) = &c.one_of {
                    let options: Vec<Value> = options
                        .iter()
                        .map(|o| json!({"const": o.value, "title": o.title}))
                        .collect();
                    out.insert("oneOf".into(), Value::Array(options));
                }
                if let Some(min) = c.min_length {
                    out.insert("minLength".into(), Value::from(min));
                }
                if let Some(max) = c.max_length {
                    out.insert("maxLength".into(), Value::from(max));
                }
            }
            SchemaKind::Number(c) | SchemaKind::Integer(c) => {
                if let Some(min) = c.minimum {
                    out.insert("minimum".into(), json!(min));
                }
                if let Some(max) = c.maximum {
                    out.insert("maximum".into(), json!(max));
                }
                if let Some(step) = c.multiple_of {
                    out.insert("multipleOf".into(), json!(step));
                }
            }
            SchemaKind::Boolean => {}
            SchemaKind::Object(o) => {
                let properties: Map<String, Value> = o
                    .properties
                    .iter()
                    .map(|p| (p.name.clone(), p.schema.project()))
                    .collect();
                out.insert("properties".into(), Value::Object(properties));
                let required: Vec<&str> = o
                    .properties
                    .iter()
                    .filter(|p| p.required)
                    .map(|p| p.name.as_str())
                    .collect();
                if !required.is_empty() {
                    out.insert("required".into(), json!(required));
                }
                out.insert("additionalProperties".into(), Value::Bool(false));
            }
            SchemaKind::Array(items) => {
                out.insert("items".into(), items.project());
            }
        }

        if let Some(title) = &self.title {
            out.insert("title".into(), Value::from(title.as_str()));
        }
        if let Some(description) = &self.description {
            out.insert("description".into(), Value::from(description.as_str()));
        }
        Value::Object(out)
    }
}
