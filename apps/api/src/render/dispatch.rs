//! Recursive schema + UI-schema walk.
//!
//! Each node is matched against the registry; layouts recurse through
//! [`Dispatcher::dispatch`] with the path accumulated so far, leaf controls
//! bind to the exact path. A node nothing applies to is skipped with a
//! warning and the rest of the form still renders.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use super::node::RenderNode;
use super::registry::RendererRegistry;
use super::tester::TesterContext;
use super::ui_schema::{LabelSpec, Scope, UiSchemaNode};
use super::start_case;
use crate::document::path::{FieldPath, PathSegment};
use crate::schema::SchemaNode;
use crate::validation::ValidationResult;

const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DispatchWarning {
    NoApplicableRenderer { path: FieldPath, ui_type: String },
    UnresolvableScope { path: FieldPath, scope: String, reason: String },
    TooDeep { path: FieldPath },
}

impl fmt::Display for DispatchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchWarning::NoApplicableRenderer { path, ui_type } => {
                write!(f, "no applicable renderer for {ui_type} at '{path}'")
            }
            DispatchWarning::UnresolvableScope { path, reason, .. } => {
                write!(f, "unresolvable scope under '{path}': {reason}")
            }
            DispatchWarning::TooDeep { path } => write!(f, "nesting too deep at '{path}'"),
        }
    }
}

pub struct Dispatcher<'a> {
    registry: &'a RendererRegistry,
    root_schema: &'a SchemaNode,
    data: &'a Value,
    validation: &'a ValidationResult,
    warnings: Vec<DispatchWarning>,
    depth: usize,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        registry: &'a RendererRegistry,
        root_schema: &'a SchemaNode,
        data: &'a Value,
        validation: &'a ValidationResult,
    ) -> Self {
        Self {
            registry,
            root_schema,
            data,
            validation,
            warnings: Vec::new(),
            depth: 0,
        }
    }

    pub fn dispatch(
        &mut self,
        ui: &UiSchemaNode,
        schema: &SchemaNode,
        path: &FieldPath,
    ) -> Option<RenderNode> {
        let (target, target_path) = match ui {
            UiSchemaNode::Control { scope, .. } => {
                match Scope::parse(scope).and_then(|s| s.resolve(scope, schema, path)) {
                    Ok(resolved) => resolved,
                    Err(e) => {
                        return self.skip(DispatchWarning::UnresolvableScope {
                            path: path.clone(),
                            scope: scope.clone(),
                            reason: e.to_string(),
                        })
                    }
                }
            }
            _ => (schema, path.clone()),
        };

        if self.depth >= MAX_DEPTH {
            return self.skip(DispatchWarning::TooDeep { path: target_path });
        }

        let ctx = TesterContext {
            root_schema: self.root_schema,
            path: &target_path,
            data: self.data,
        };
        let registry = self.registry;
        let Some(entry) = registry.resolve(ui, target, &ctx) else {
            return self.skip(DispatchWarning::NoApplicableRenderer {
                path: target_path,
                ui_type: ui.ui_type().to_string(),
            });
        };

        self.depth += 1;
        let rendered = entry.renderer.render(self, ui, target, &target_path);
        self.depth -= 1;
        rendered
    }

    pub fn dispatch_all(
        &mut self,
        elements: &[UiSchemaNode],
        schema: &SchemaNode,
        path: &FieldPath,
    ) -> Vec<RenderNode> {
        elements
            .iter()
            .filter_map(|element| self.dispatch(element, schema, path))
            .collect()
    }

    fn skip(&mut self, warning: DispatchWarning) -> Option<RenderNode> {
        warn!("Form dispatch: {warning}");
        self.warnings.push(warning);
        None
    }

    pub fn value_at(&self, path: &FieldPath) -> Option<&'a Value> {
        path.get(self.data)
    }

    pub fn validation(&self) -> &'a ValidationResult {
        self.validation
    }

    /// Whether the property at `path` is required by its parent object.
    /// Array entries are never "required" in this sense.
    pub fn is_required(&self, path: &FieldPath) -> bool {
        let Some((parent, PathSegment::Key(key))) = path.parent() else {
            return false;
        };
        self.root_schema
            .at_path(&parent)
            .and_then(SchemaNode::as_object)
            .and_then(|o| o.property(key))
            .is_some_and(|p| p.required)
    }

    /// UI label, else schema title, else the start-cased property key.
    /// `label: false` hides it; array entries have no key-derived label.
    pub fn label_for(&self, ui: &UiSchemaNode, schema: &SchemaNode, path: &FieldPath) -> Option<String> {
        if let UiSchemaNode::Control { label: Some(spec), .. } = ui {
            match spec {
                LabelSpec::Text(text) => return Some(text.clone()),
                LabelSpec::Show(false) => return None,
                LabelSpec::Show(true) => {}
            }
        }
        schema
            .title
            .clone()
            .or_else(|| path.last_key().map(start_case))
    }

    pub fn into_warnings(self) -> Vec<DispatchWarning> {
        self.warnings
    }
}
