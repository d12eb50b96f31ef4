//! Leaf controls. Each one renders the value bound to a single field path
//! and coerces raw widget input back into a document change.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use thiserror::Error;

use super::dispatch::Dispatcher;
use super::node::{Choice, ControlKind, ControlView, RenderNode};
use super::ui_schema::UiSchemaNode;
use super::Renderer;
use crate::document::path::{FieldPath, PathError, PathSegment};
use crate::schema::SchemaNode;
use crate::validation::ValidationResult;

/// A single-field edit. `value: None` removes an object field; array entries
/// are only removed through a confirmed array mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub path: FieldPath,
    pub value: Option<Value>,
}

impl FieldChange {
    pub fn apply(&self, target: &mut Value) -> Result<(), PathError> {
        match &self.value {
            Some(value) => self.path.set(target, value.clone()),
            None if ends_in_index(&self.path) => {
                Err(PathError::EntryRemoval(self.path.to_string()))
            }
            None => self.path.remove(target).map(|_| ()),
        }
    }
}

fn ends_in_index(path: &FieldPath) -> bool {
    matches!(path.segments().last(), Some(PathSegment::Index(_)))
}

#[derive(Debug, Error, PartialEq)]
#[error("{path}: {reason}")]
pub struct ChangeRejected {
    pub path: FieldPath,
    pub reason: String,
}

/// Everything a control needs to draw itself.
pub struct Binding<'a> {
    pub path: &'a FieldPath,
    pub schema: &'a SchemaNode,
    pub label: Option<String>,
    pub required: bool,
    pub value: Option<&'a Value>,
    pub errors: Vec<String>,
}

pub trait Control: Send + Sync {
    fn kind(&self) -> ControlKind;

    /// Turns raw widget input into the stored value. `Ok(None)` clears the
    /// field; `Err` carries a user-facing reason.
    fn coerce(&self, schema: &SchemaNode, input: &Value) -> Result<Option<Value>, String>;

    fn display(&self, _schema: &SchemaNode, _value: &Value) -> Option<String> {
        None
    }

    fn view(&self, binding: Binding<'_>) -> ControlView {
        let value = binding.value.cloned().unwrap_or(Value::Null);
        let numbers = binding.schema.number_constraints();
        ControlView {
            control: self.kind(),
            path: binding.path.clone(),
            label: binding.label,
            required: binding.required,
            display: self.display(binding.schema, &value),
            value,
            choices: choices(binding.schema),
            min: numbers.and_then(|c| c.minimum),
            max: numbers.and_then(|c| c.maximum),
            step: numbers.and_then(|c| c.multiple_of),
            valid: binding.errors.is_empty(),
            errors: binding.errors,
        }
    }

    fn emit_change(
        &self,
        schema: &SchemaNode,
        path: &FieldPath,
        input: &Value,
    ) -> Result<FieldChange, ChangeRejected> {
        self.coerce(schema, input)
            .map(|value| FieldChange {
                path: path.clone(),
                // A cleared array entry keeps its slot.
                value: match value {
                    None if ends_in_index(path) => Some(schema.default_value()),
                    value => value,
                },
            })
            .map_err(|reason| ChangeRejected {
                path: path.clone(),
                reason,
            })
    }

    fn is_valid(&self, path: &FieldPath, validation: &ValidationResult) -> bool {
        validation.errors_at(path).next().is_none()
    }
}

fn choices(schema: &SchemaNode) -> Vec<Choice> {
    let Some(c) = schema.string_constraints() else {
        return Vec::new();
    };
    if let Some(values) = &c.enum_values {
        return values
            .iter()
            .map(|v| Choice {
                value: v.clone(),
                label: v.clone(),
            })
            .collect();
    }
    c.one_of
        .iter()
        .flatten()
        .map(|o| Choice {
            value: o.value.clone(),
            label: o.title.clone(),
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Input coercion helpers
// ────────────────────────────────────────────────────────────────────────────

fn text_input(input: &Value) -> Result<Option<&str>, String> {
    match input {
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s)),
        _ => Err("Expected text".to_string()),
    }
}

fn number_input(input: &Value) -> Result<Option<f64>, String> {
    let parsed = match input {
        Value::Null => return Ok(None),
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|n| n.is_finite())
        .map(Some)
        .ok_or_else(|| "Expected a number".to_string())
}

fn integer_input(input: &Value) -> Result<Option<i64>, String> {
    if let Value::String(s) = input {
        if let Ok(n) = s.trim().parse::<i64>() {
            return Ok(Some(n));
        }
    }
    match number_input(input) {
        Ok(Some(n)) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => Ok(Some(n as i64)),
        Ok(None) => Ok(None),
        _ => Err("Expected a whole number".to_string()),
    }
}

fn float_value(n: f64) -> Value {
    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}

fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Built-in controls
// ────────────────────────────────────────────────────────────────────────────

pub struct TextControl;
pub struct TextAreaControl;
pub struct DateControl;
pub struct DateTimeControl;
pub struct TimeControl;
pub struct EnumSelectControl;
pub struct RadioControl;
pub struct OneOfSelectControl;
pub struct ToggleControl;
pub struct IntegerControl;
pub struct NumberControl;
pub struct FormattedNumberControl;
pub struct SliderControl;

impl Control for TextControl {
    fn kind(&self) -> ControlKind {
        ControlKind::Text
    }

    fn coerce(&self, _: &SchemaNode, input: &Value) -> Result<Option<Value>, String> {
        Ok(text_input(input)?.map(Value::from))
    }
}

impl Control for TextAreaControl {
    fn kind(&self) -> ControlKind {
        ControlKind::TextArea
    }

    fn coerce(&self, _: &SchemaNode, input: &Value) -> Result<Option<Value>, String> {
        Ok(text_input(input)?.map(Value::from))
    }
}

impl Control for DateControl {
    fn kind(&self) -> ControlKind {
        ControlKind::Date
    }

    fn coerce(&self, _: &SchemaNode, input: &Value) -> Result<Option<Value>, String> {
        let Some(raw) = text_input(input)? else {
            return Ok(None);
        };
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(|d| Some(Value::from(d.format("%Y-%m-%d").to_string())))
            .map_err(|_| "Invalid date, expected YYYY-MM-DD".to_string())
    }
}

impl Control for DateTimeControl {
    fn kind(&self) -> ControlKind {
        ControlKind::DateTime
    }

    fn coerce(&self, _: &SchemaNode, input: &Value) -> Result<Option<Value>, String> {
        let Some(raw) = text_input(input)? else {
            return Ok(None);
        };
        if chrono::DateTime::parse_from_rfc3339(raw).is_ok() {
            return Ok(Some(Value::from(raw)));
        }
        // Browser datetime-local inputs carry no zone; store them as UTC.
        ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| {
                Some(Value::from(
                    naive.and_utc().to_rfc3339_opts(SecondsFormat::Secs, true),
                ))
            })
            .ok_or_else(|| "Invalid date-time".to_string())
    }
}

impl Control for TimeControl {
    fn kind(&self) -> ControlKind {
        ControlKind::Time
    }

    fn coerce(&self, _: &SchemaNode, input: &Value) -> Result<Option<Value>, String> {
        let Some(raw) = text_input(input)? else {
            return Ok(None);
        };
        ["%H:%M:%S", "%H:%M"]
            .iter()
            .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
            .map(|t| Some(Value::from(t.format("%H:%M:%S").to_string())))
            .ok_or_else(|| "Invalid time, expected HH:MM".to_string())
    }
}

fn enum_choice(schema: &SchemaNode, input: &Value) -> Result<Option<Value>, String> {
    let Some(raw) = text_input(input)? else {
        return Ok(None);
    };
    if choices(schema).iter().any(|c| c.value == raw) {
        Ok(Some(Value::from(raw)))
    } else {
        Err(format!("'{raw}' is not one of the allowed values"))
    }
}

impl Control for EnumSelectControl {
    fn kind(&self) -> ControlKind {
        ControlKind::EnumSelect
    }

    fn coerce(&self, schema: &SchemaNode, input: &Value) -> Result<Option<Value>, String> {
        enum_choice(schema, input)
    }
}

impl Control for RadioControl {
    fn kind(&self) -> ControlKind {
        ControlKind::Radio
    }

    fn coerce(&self, schema: &SchemaNode, input: &Value) -> Result<Option<Value>, String> {
        enum_choice(schema, input)
    }
}

impl Control for OneOfSelectControl {
    fn kind(&self) -> ControlKind {
        ControlKind::OneOfSelect
    }

    fn coerce(&self, schema: &SchemaNode, input: &Value) -> Result<Option<Value>, String> {
        enum_choice(schema, input)
    }
}

impl Control for ToggleControl {
    fn kind(&self) -> ControlKind {
        ControlKind::Toggle
    }

    fn coerce(&self, _: &SchemaNode, input: &Value) -> Result<Option<Value>, String> {
        match input {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(Value::Bool(*b))),
            Value::String(s) if s == "true" => Ok(Some(Value::Bool(true))),
            Value::String(s) if s == "false" => Ok(Some(Value::Bool(false))),
            _ => Err("Expected true or false".to_string()),
        }
    }
}

impl Control for IntegerControl {
    fn kind(&self) -> ControlKind {
        ControlKind::Integer
    }

    fn coerce(&self, _: &SchemaNode, input: &Value) -> Result<Option<Value>, String> {
        Ok(integer_input(input)?.map(Value::from))
    }
}

impl Control for NumberControl {
    fn kind(&self) -> ControlKind {
        ControlKind::Number
    }

    fn coerce(&self, _: &SchemaNode, input: &Value) -> Result<Option<Value>, String> {
        match input {
            Value::Number(_) => Ok(Some(input.clone())),
            _ => Ok(number_input(input)?.map(float_value)),
        }
    }
}

impl Control for FormattedNumberControl {
    fn kind(&self) -> ControlKind {
        ControlKind::FormattedNumber
    }

    fn coerce(&self, _: &SchemaNode, input: &Value) -> Result<Option<Value>, String> {
        match input {
            Value::String(s) => {
                let digits: String = s
                    .chars()
                    .filter(|c| !matches!(c, ',' | '_' | ' '))
                    .collect();
                Ok(integer_input(&Value::String(digits))?.map(Value::from))
            }
            other => Ok(integer_input(other)?.map(Value::from)),
        }
    }

    fn display(&self, _: &SchemaNode, value: &Value) -> Option<String> {
        value.as_i64().map(group_thousands)
    }
}

impl Control for SliderControl {
    fn kind(&self) -> ControlKind {
        ControlKind::Slider
    }

    fn coerce(&self, schema: &SchemaNode, input: &Value) -> Result<Option<Value>, String> {
        let Some(n) = number_input(input)? else {
            return Ok(None);
        };
        let bounds = schema.number_constraints();
        let min = bounds.and_then(|c| c.minimum).unwrap_or(f64::MIN);
        let max = bounds.and_then(|c| c.maximum).unwrap_or(f64::MAX);
        if n < min || n > max {
            return Err(format!("Value must be between {min} and {max}"));
        }
        if schema.type_name() == "integer" {
            Ok(Some(Value::from(n.round() as i64)))
        } else {
            Ok(Some(float_value(n)))
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Renderer adapter
// ────────────────────────────────────────────────────────────────────────────

/// Exposes any [`Control`] to the dispatcher as a leaf renderer.
pub struct ControlRenderer<C>(pub C);

impl<C: Control> Renderer for ControlRenderer<C> {
    fn render(
        &self,
        dispatcher: &mut Dispatcher<'_>,
        ui: &UiSchemaNode,
        schema: &SchemaNode,
        path: &FieldPath,
    ) -> Option<RenderNode> {
        let binding = Binding {
            path,
            schema,
            label: dispatcher.label_for(ui, schema, path),
            required: dispatcher.is_required(path),
            value: dispatcher.value_at(path),
            errors: dispatcher
                .validation()
                .errors_at(path)
                .map(str::to_string)
                .collect(),
        };
        let mut view = self.0.view(binding);
        view.valid = self.0.is_valid(path, dispatcher.validation());
        Some(RenderNode::Control(view))
    }

    fn as_control(&self) -> Option<&dyn Control> {
        Some(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn emit(control: &dyn Control, schema: &SchemaNode, input: Value) -> Result<Option<Value>, ChangeRejected> {
        let path: FieldPath = "basics.name".parse().unwrap();
        control.emit_change(schema, &path, &input).map(|c| c.value)
    }

    #[test]
    fn test_empty_text_clears_field() {
        let s = SchemaNode::string();
        assert_eq!(emit(&TextControl, &s, json!("")).unwrap(), None);
        assert_eq!(emit(&TextControl, &s, json!("Ada")).unwrap(), Some(json!("Ada")));
        let err = emit(&TextControl, &s, json!(4)).unwrap_err();
        assert_eq!(err.to_string(), "basics.name: Expected text");
    }

    #[test]
    fn test_temporal_controls_normalise() {
        let s = SchemaNode::string();
        assert_eq!(
            emit(&DateTimeControl, &s, json!("2024-05-01T09:30")).unwrap(),
            Some(json!("2024-05-01T09:30:00Z"))
        );
        assert_eq!(emit(&TimeControl, &s, json!("09:30")).unwrap(), Some(json!("09:30:00")));
        assert!(emit(&DateControl, &s, json!("2024-13-01")).is_err());
    }

    #[test]
    fn test_enum_controls_reject_unknown_values() {
        let s = SchemaNode::string_enum(&["remote", "onsite"]);
        assert_eq!(emit(&RadioControl, &s, json!("remote")).unwrap(), Some(json!("remote")));
        assert!(emit(&EnumSelectControl, &s, json!("hybrid")).is_err());

        let one_of = SchemaNode::one_of(&[("en", "English"), ("fr", "French")]);
        assert!(emit(&OneOfSelectControl, &one_of, json!("fr")).is_ok());
        assert!(emit(&OneOfSelectControl, &one_of, json!("French")).is_err());
    }

    #[test]
    fn test_numeric_controls() {
        let int = SchemaNode::integer();
        assert_eq!(emit(&IntegerControl, &int, json!("42")).unwrap(), Some(json!(42)));
        assert!(emit(&IntegerControl, &int, json!("4.5")).is_err());
        assert_eq!(
            emit(&FormattedNumberControl, &int, json!("1,234,567")).unwrap(),
            Some(json!(1234567))
        );
        assert_eq!(
            FormattedNumberControl.display(&int, &json!(-1234567)),
            Some("-1,234,567".to_string())
        );

        let ranged = SchemaNode::integer().bounded(1.0, 5.0);
        assert_eq!(emit(&SliderControl, &ranged, json!(3)).unwrap(), Some(json!(3)));
        assert_eq!(
            emit(&SliderControl, &ranged, json!(9)).unwrap_err().reason,
            "Value must be between 1 and 5"
        );

        assert_eq!(emit(&NumberControl, &SchemaNode::number(), json!("2.5")).unwrap(), Some(json!(2.5)));
        assert_eq!(emit(&ToggleControl, &SchemaNode::boolean(), json!("true")).unwrap(), Some(json!(true)));
    }

    #[test]
    fn test_field_change_apply() {
        let mut doc = json!({"basics": {"name": "A", "label": "Dev"}});
        FieldChange {
            path: "basics.label".parse().unwrap(),
            value: None,
        }
        .apply(&mut doc)
        .unwrap();
        assert_eq!(doc, json!({"basics": {"name": "A"}}));
    }

    #[test]
    fn test_cleared_array_entry_keeps_its_slot() {
        let path: FieldPath = "work[0].highlights[1]".parse().unwrap();
        let change = TextControl
            .emit_change(&SchemaNode::string(), &path, &json!(""))
            .unwrap();
        assert_eq!(change.value, Some(json!("")));

        let mut doc = json!({"work": [{"highlights": ["one", "two", "three"]}]});
        change.apply(&mut doc).unwrap();
        assert_eq!(doc["work"][0]["highlights"], json!(["one", "", "three"]));
    }

    #[test]
    fn test_field_change_cannot_remove_array_entry() {
        let mut doc = json!({"skills": ["Rust", "SQL"]});
        let err = FieldChange {
            path: "skills[0]".parse().unwrap(),
            value: None,
        }
        .apply(&mut doc)
        .unwrap_err();
        assert_eq!(err, PathError::EntryRemoval("skills[0]".into()));
        assert_eq!(doc, json!({"skills": ["Rust", "SQL"]}));
    }

    #[test]
    fn test_validity_reads_exact_path() {
        let path: FieldPath = "basics.email".parse().unwrap();
        let invalid = ValidationResult::from_errors(vec![crate::validation::FieldError::new(
            path.clone(),
            "Invalid email",
        )]);
        assert!(!TextControl.is_valid(&path, &invalid));
        assert!(TextControl.is_valid(&"basics.name".parse().unwrap(), &invalid));
    }
}
