//! UI-Schema: optional layout hints, independent of the structural schema.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::document::path::FieldPath;
use crate::schema::SchemaNode;

pub type Options = Map<String, Value>;

/// `false` hides a control's label; a string overrides it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelSpec {
    Text(String),
    Show(bool),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UiSchemaNode {
    VerticalLayout {
        #[serde(default)]
        elements: Vec<UiSchemaNode>,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        options: Options,
    },
    HorizontalLayout {
        #[serde(default)]
        elements: Vec<UiSchemaNode>,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        options: Options,
    },
    Group {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        #[serde(default)]
        elements: Vec<UiSchemaNode>,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        options: Options,
    },
    Categorization {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        #[serde(default)]
        elements: Vec<UiSchemaNode>,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        options: Options,
    },
    Category {
        label: String,
        #[serde(default)]
        elements: Vec<UiSchemaNode>,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        options: Options,
    },
    Control {
        scope: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<LabelSpec>,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        options: Options,
    },
    Label {
        text: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UiType {
    VerticalLayout,
    HorizontalLayout,
    Group,
    Categorization,
    Category,
    Control,
    Label,
}

impl std::fmt::Display for UiType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

static NO_OPTIONS: std::sync::LazyLock<Options> = std::sync::LazyLock::new(Options::new);

impl UiSchemaNode {
    pub fn ui_type(&self) -> UiType {
        match self {
            UiSchemaNode::VerticalLayout { .. } => UiType::VerticalLayout,
            UiSchemaNode::HorizontalLayout { .. } => UiType::HorizontalLayout,
            UiSchemaNode::Group { .. } => UiType::Group,
            UiSchemaNode::Categorization { .. } => UiType::Categorization,
            UiSchemaNode::Category { .. } => UiType::Category,
            UiSchemaNode::Control { .. } => UiType::Control,
            UiSchemaNode::Label { .. } => UiType::Label,
        }
    }

    pub fn options(&self) -> &Options {
        match self {
            UiSchemaNode::VerticalLayout { options, .. }
            | UiSchemaNode::HorizontalLayout { options, .. }
            | UiSchemaNode::Group { options, .. }
            | UiSchemaNode::Categorization { options, .. }
            | UiSchemaNode::Category { options, .. }
            | UiSchemaNode::Control { options, .. } => options,
            UiSchemaNode::Label { .. } => &NO_OPTIONS,
        }
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options().get(key)
    }

    /// True when `options[key]` is exactly `true`.
    pub fn flag(&self, key: &str) -> bool {
        self.option(key) == Some(&Value::Bool(true))
    }

    pub fn elements(&self) -> &[UiSchemaNode] {
        match self {
            UiSchemaNode::VerticalLayout { elements, .. }
            | UiSchemaNode::HorizontalLayout { elements, .. }
            | UiSchemaNode::Group { elements, .. }
            | UiSchemaNode::Categorization { elements, .. }
            | UiSchemaNode::Category { elements, .. } => elements,
            UiSchemaNode::Control { .. } | UiSchemaNode::Label { .. } => &[],
        }
    }

    pub fn control(scope: impl Into<String>) -> Self {
        UiSchemaNode::Control {
            scope: scope.into(),
            label: None,
            options: Options::new(),
        }
    }

    pub fn with_option(mut self, key: &str, value: Value) -> Self {
        match &mut self {
            UiSchemaNode::VerticalLayout { options, .. }
            | UiSchemaNode::HorizontalLayout { options, .. }
            | UiSchemaNode::Group { options, .. }
            | UiSchemaNode::Categorization { options, .. }
            | UiSchemaNode::Category { options, .. }
            | UiSchemaNode::Control { options, .. } => {
                options.insert(key.to_string(), value);
            }
            UiSchemaNode::Label { .. } => {}
        }
        self
    }

    /// The nested UI schema an object or array control carries in
    /// `options.detail`, if it parses.
    pub fn detail(&self) -> Option<UiSchemaNode> {
        self.option("detail")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scopes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq)]
pub enum ScopeError {
    #[error("Scope '{0}' is not a '#/properties/...' pointer")]
    Malformed(String),

    #[error("Scope '{scope}' names unknown property '{property}'")]
    UnknownProperty { scope: String, property: String },
}

/// A parsed `#/properties/a/properties/b` pointer, relative to the schema
/// the enclosing layout is rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    properties: Vec<String>,
}

impl Scope {
    pub fn parse(raw: &str) -> Result<Self, ScopeError> {
        let malformed = || ScopeError::Malformed(raw.to_string());
        let rest = raw.strip_prefix('#').ok_or_else(malformed)?;
        if rest.is_empty() || rest == "/" {
            return Ok(Scope { properties: vec![] });
        }
        let parts: Vec<&str> = rest.strip_prefix('/').ok_or_else(malformed)?.split('/').collect();
        if parts.len() % 2 != 0 {
            return Err(malformed());
        }
        let properties = parts
            .chunks(2)
            .map(|pair| match pair {
                ["properties", name] if !name.is_empty() => Ok(decode_pointer(name)),
                _ => Err(malformed()),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Scope { properties })
    }

    pub fn for_property(name: &str) -> String {
        format!("#/properties/{}", name.replace('~', "~0").replace('/', "~1"))
    }

    /// Resolves against `schema`, returning the target node and the data
    /// path relative to `base`.
    pub fn resolve<'s>(
        &self,
        raw: &str,
        schema: &'s SchemaNode,
        base: &FieldPath,
    ) -> Result<(&'s SchemaNode, FieldPath), ScopeError> {
        let mut node = schema;
        let mut path = base.clone();
        for name in &self.properties {
            node = node
                .as_object()
                .and_then(|o| o.property(name))
                .map(|p| &p.schema)
                .ok_or_else(|| ScopeError::UnknownProperty {
                    scope: raw.to_string(),
                    property: name.clone(),
                })?;
            path.push_key(name);
        }
        Ok((node, path))
    }
}

fn decode_pointer(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

/// Default layout for a schema: a vertical stack of one control per
/// property for objects, a single root control otherwise.
pub fn generate_ui_schema(schema: &SchemaNode) -> UiSchemaNode {
    match schema.as_object() {
        Some(object) => UiSchemaNode::VerticalLayout {
            elements: object
                .properties
                .iter()
                .map(|p| UiSchemaNode::control(Scope::for_property(&p.name)))
                .collect(),
            options: Options::new(),
        },
        None => UiSchemaNode::control("#"),
    }
}
