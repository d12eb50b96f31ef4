//! Schema nodes: the tagged union every other component walks.
//!
//! A node is one of string / number / integer / boolean / object / array with
//! the constraints that belong to that tag. Objects keep their properties in
//! declaration order, which drives validation order, generated form layout,
//! and the JSON-Schema projection.

use serde_json::{Map, Value};

use crate::document::path::{type_name, FieldPath};
use crate::validation::{formats, FieldError, ValidationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    Email,
    Uri,
    Date,
    DateTime,
    Time,
}

impl StringFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            StringFormat::Email => "email",
            StringFormat::Uri => "uri",
            StringFormat::Date => "date",
            StringFormat::DateTime => "date-time",
            StringFormat::Time => "time",
        }
    }

    fn accepts(self, s: &str) -> bool {
        match self {
            StringFormat::Email => formats::is_email(s),
            StringFormat::Uri => formats::is_url(s),
            StringFormat::Date => formats::is_date(s),
            StringFormat::DateTime => formats::is_date_time(s),
            StringFormat::Time => formats::is_time(s),
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            StringFormat::Email => "Invalid email",
            StringFormat::Uri => "Invalid url",
            StringFormat::Date => "Invalid date",
            StringFormat::DateTime => "Invalid datetime",
            StringFormat::Time => "Invalid time",
        }
    }
}

/// A `oneOf: [{const, title}]` choice.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumOption {
    pub value: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringConstraints {
    pub format: Option<StringFormat>,
    pub enum_values: Option<Vec<String>>,
    pub one_of: Option<Vec<EnumOption>>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberConstraints {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub multiple_of: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub schema: SchemaNode,
    pub required: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    pub properties: Vec<Property>,
}

impl ObjectSchema {
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    String(StringConstraints),
    Number(NumberConstraints),
    Integer(NumberConstraints),
    Boolean,
    Object(ObjectSchema),
    Array(Box<SchemaNode>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub kind: SchemaKind,
    pub title: Option<String>,
    pub description: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Builders
// ────────────────────────────────────────────────────────────────────────────

impl SchemaNode {
    fn of(kind: SchemaKind) -> Self {
        Self {
            kind,
            title: None,
            description: None,
        }
    }

    pub fn string() -> Self {
        Self::of(SchemaKind::String(StringConstraints::default()))
    }

    pub fn formatted(format: StringFormat) -> Self {
        Self::of(SchemaKind::String(StringConstraints {
            format: Some(format),
            ..Default::default()
        }))
    }

    pub fn email() -> Self {
        Self::formatted(StringFormat::Email)
    }

    pub fn uri() -> Self {
        Self::formatted(StringFormat::Uri)
    }

    pub fn string_enum(values: &[&str]) -> Self {
        Self::of(SchemaKind::String(StringConstraints {
            enum_values: Some(values.iter().map(|v| v.to_string()).collect()),
            ..Default::default()
        }))
    }

    pub fn one_of(options: &[(&str, &str)]) -> Self {
        Self::of(SchemaKind::String(StringConstraints {
            one_of: Some(
                options
                    .iter()
                    .map(|(value, title)| EnumOption {
                        value: value.to_string(),
                        title: title.to_string(),
                    })
                    .collect(),
            ),
            ..Default::default()
        }))
    }

    pub fn number() -> Self {
        Self::of(SchemaKind::Number(NumberConstraints::default()))
    }

    pub fn integer() -> Self {
        Self::of(SchemaKind::Integer(NumberConstraints::default()))
    }

    pub fn boolean() -> Self {
        Self::of(SchemaKind::Boolean)
    }

    pub fn object(properties: Vec<Property>) -> Self {
        Self::of(SchemaKind::Object(ObjectSchema { properties }))
    }

    pub fn array(items: SchemaNode) -> Self {
        Self::of(SchemaKind::Array(Box::new(items)))
    }

    pub fn titled(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn described(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Sets numeric bounds; ignored on non-numeric nodes.
    pub fn bounded(mut self, minimum: f64, maximum: f64) -> Self {
        if let SchemaKind::Number(c) | SchemaKind::Integer(c) = &mut self.kind {
            c.minimum = Some(minimum);
            c.maximum = Some(maximum);
        }
        self
    }

    pub fn step(mut self, multiple_of: f64) -> Self {
        if let SchemaKind::Number(c) | SchemaKind::Integer(c) = &mut self.kind {
            c.multiple_of = Some(multiple_of);
        }
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        if let SchemaKind::String(c) = &mut self.kind {
            c.max_length = Some(max);
        }
        self
    }
}

pub fn required(name: &str, schema: SchemaNode) -> Property {
    Property {
        name: name.to_string(),
        schema,
        required: true,
    }
}

pub fn optional(name: &str, schema: SchemaNode) -> Property {
    Property {
        name: name.to_string(),
        schema,
        required: false,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Queries
// ────────────────────────────────────────────────────────────────────────────

impl SchemaNode {
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            SchemaKind::String(_) => "string",
            SchemaKind::Number(_) => "number",
            SchemaKind::Integer(_) => "integer",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Object(_) => "object",
            SchemaKind::Array(_) => "array",
        }
    }

    pub fn as_object(&self) -> Option<&ObjectSchema> {
        match &self.kind {
            SchemaKind::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn items(&self) -> Option<&SchemaNode> {
        match &self.kind {
            SchemaKind::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn string_constraints(&self) -> Option<&StringConstraints> {
        match &self.kind {
            SchemaKind::String(c) => Some(c),
            _ => None,
        }
    }

    pub fn number_constraints(&self) -> Option<&NumberConstraints> {
        match &self.kind {
            SchemaKind::Number(c) | SchemaKind::Integer(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self.kind, SchemaKind::Object(_) | SchemaKind::Array(_))
    }

    /// Follows a data path through objects and arrays.
    pub fn at_path(&self, path: &FieldPath) -> Option<&SchemaNode> {
        use crate::document::path::PathSegment;
        path.segments().iter().try_fold(self, |node, seg| match seg {
            PathSegment::Key(k) => node.as_object()?.property(k).map(|p| &p.schema),
            PathSegment::Index(_) => node.items(),
        })
    }

    /// Value inserted when a new entry of this shape is created: required
    /// properties are filled recursively, optional ones stay absent.
    pub fn default_value(&self) -> Value {
        match &self.kind {
            SchemaKind::String(c) => match (&c.enum_values, &c.one_of) {
                (Some(values), _) if !values.is_empty() => Value::String(values[0].clone()),
                (_, Some(options)) if !options.is_empty() => {
                    Value::String(options[0].value.clone())
                }
                _ => Value::String(String::new()),
            },
            SchemaKind::Number(c) | SchemaKind::Integer(c) => {
                let start = c.minimum.unwrap_or(0.0).max(0.0);
                if matches!(self.kind, SchemaKind::Integer(_)) {
                    Value::from(start.ceil() as i64)
                } else {
                    serde_json::Number::from_f64(start)
                        .map(Value::Number)
                        .unwrap_or_else(|| Value::from(0))
                }
            }
            SchemaKind::Boolean => Value::Bool(false),
            SchemaKind::Array(_) => Value::Array(Vec::new()),
            SchemaKind::Object(o) => Value::Object(
                o.properties
                    .iter()
                    .filter(|p| p.required)
                    .map(|p| (p.name.clone(), p.schema.default_value()))
                    .collect::<Map<_, _>>(),
            ),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Validation walk
// ────────────────────────────────────────────────────────────────────────────

impl SchemaNode {
    /// Checks `candidate` against this node, reporting every violation.
    pub fn validate(&self, candidate: &Value) -> ValidationResult {
        let mut errors = Vec::new();
        let mut path = FieldPath::root();
        self.check(candidate, &mut path, &mut errors);
        ValidationResult::from_errors(errors)
    }

    fn check(&self, value: &Value, path: &mut FieldPath, errors: &mut Vec<FieldError>) {
        match (&self.kind, value) {
            (SchemaKind::String(c), Value::String(s)) => check_string(c, s, path, errors),
            (SchemaKind::Number(c), Value::Number(n)) => {
                check_bounds(c, n.as_f64().unwrap_or_default(), path, errors)
            }
            (SchemaKind::Integer(c), Value::Number(n)) => {
                let is_integral = n.is_i64()
                    || n.is_u64()
                    || n.as_f64().map(|f| f.fract() == 0.0).unwrap_or(false);
                if !is_integral {
                    errors.push(FieldError::new(
                        path.clone(),
                        "Expected integer, received float",
                    ));
                } else {
                    check_bounds(c, n.as_f64().unwrap_or_default(), path, errors);
                }
            }
            (SchemaKind::Boolean, Value::Bool(_)) => {}
            (SchemaKind::Object(o), Value::Object(map)) => {
                for prop in &o.properties {
                    path.push_key(&prop.name);
                    match map.get(&prop.name) {
                        Some(v) => prop.schema.check(v, path, errors),
                        None if prop.required => {
                            errors.push(FieldError::new(path.clone(), "Required"))
                        }
                        None => {}
                    }
                    path.pop();
                }
            }
            (SchemaKind::Array(items), Value::Array(entries)) => {
                for (i, entry) in entries.iter().enumerate() {
                    path.push_index(i);
                    items.check(entry, path, errors);
                    path.pop();
                }
            }
            (_, other) => errors.push(FieldError::new(
                path.clone(),
                format!(
                    "Expected {}, received {}",
                    self.type_name(),
                    type_name(other)
                ),
            )),
        }
    }
}

fn check_string(c: &StringConstraints, s: &str, path: &FieldPath, errors: &mut Vec<FieldError>) {
    if let Some(values) = &c.enum_values {
        if !values.iter().any(|v| v == s) {
            errors.push(FieldError::new(
                path.clone(),
                format!(
                    "Invalid enum value. Expected {}, received '{}'",
                    values
                        .iter()
                        .map(|v| format!("'{v}'"))
                        .collect::<Vec<_>>()
                        .join(" | "),
                    s
                ),
            ));
            return;
        }
    }
    if let Some(options) = &c.one_of {
        if !options.iter().any(|o| o.value == s) {
            errors.push(FieldError::new(
                path.clone(),
                format!("Invalid option '{s}'"),
            ));
            return;
        }
    }
    let len = s.chars().count();
    if let Some(min) = c.min_length {
        if len < min {
            errors.push(FieldError::new(
                path.clone(),
                format!("String must contain at least {min} character(s)"),
            ));
        }
    }
    if let Some(max) = c.max_length {
        if len > max {
            errors.push(FieldError::new(
                path.clone(),
                format!("String must contain at most {max} character(s)"),
            ));
        }
    }
    if let Some(format) = c.format {
        if !format.accepts(s) {
            errors.push(FieldError::new(path.clone(), format.failure_message()));
        }
    }
}

fn check_bounds(c: &NumberConstraints, n: f64, path: &FieldPath, errors: &mut Vec<FieldError>) {
    if let Some(min) = c.minimum {
        if n < min {
            errors.push(FieldError::new(
                path.clone(),
                format!("Number must be greater than or equal to {min}"),
            ));
        }
    }
    if let Some(max) = c.maximum {
        if n > max {
            errors.push(FieldError::new(
                path.clone(),
                format!("Number must be less than or equal to {max}"),
            ));
        }
    }
    if let Some(step) = c.multiple_of {
        if step > 0.0 && ((n / step).round() * step - n).abs() > 1e-9 {
            errors.push(FieldError::new(
                path.clone(),
                format!("Number must be a multiple of {step}"),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile() -> SchemaNode {
        SchemaNode::object(vec![
            required("network", SchemaNode::string()),
            optional("url", SchemaNode::uri()),
            optional("years", SchemaNode::integer().bounded(0.0, 60.0)),
        ])
    }

    #[test]
    fn test_optional_absent_is_fine() {
        assert!(profile().validate(&json!({"network": "GitHub"})).is_valid());
    }

    #[test]
    fn test_null_is_not_absent() {
        let result = profile().validate(&json!({"network": "GitHub", "url": null}));
        assert_eq!(result.errors()[0].message, "Expected string, received null");
        assert_eq!(result.errors()[0].path.to_string(), "url");
    }

    #[test]
    fn test_reports_every_violation_in_declared_order() {
        let result = profile().validate(&json!({"url": "nope", "years": 1.5}));
        let rendered: Vec<String> = result.errors().iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "network: Required",
                "url: Invalid url",
                "years: Expected integer, received float"
            ]
        );
    }

    #[test]
    fn test_array_paths_use_indices() {
        let list = SchemaNode::array(profile());
        let result = list.validate(&json!([{"network": "a"}, {"network": 1}]));
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].path.to_string(), "[1].network");
    }

    #[test]
    fn test_empty_array_is_valid() {
        assert!(SchemaNode::array(profile()).validate(&json!([])).is_valid());
    }

    #[test]
    fn test_unknown_keys_are_tolerated() {
        assert!(profile()
            .validate(&json!({"network": "x", "favouriteColour": "teal"}))
            .is_valid());
    }

    #[test]
    fn test_enum_and_bounds_messages() {
        let level = SchemaNode::string_enum(&["junior", "senior"]);
        let result = level.validate(&json!("staff"));
        assert_eq!(
            result.errors()[0].message,
            "Invalid enum value. Expected 'junior' | 'senior', received 'staff'"
        );

        let years = SchemaNode::integer().bounded(0.0, 60.0);
        assert_eq!(
            years.validate(&json!(61)).errors()[0].message,
            "Number must be less than or equal to 60"
        );
    }

    #[test]
    fn test_default_value_fills_required_only() {
        assert_eq!(profile().default_value(), json!({"network": ""}));
        assert_eq!(SchemaNode::string_enum(&["a", "b"]).default_value(), json!("a"));
        assert_eq!(SchemaNode::integer().bounded(3.0, 9.0).default_value(), json!(3));
    }

    #[test]
    fn test_at_path_walks_arrays() {
        let root = SchemaNode::object(vec![optional("profiles", SchemaNode::array(profile()))]);
        let path: FieldPath = "profiles[4].url".parse().unwrap();
        assert_eq!(root.at_path(&path), Some(&SchemaNode::uri()));
    }
}
