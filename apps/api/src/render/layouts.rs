use super::dispatch::Dispatcher;
use super::node::{CategorizationView, RenderNode, TabView};
use super::ui_schema::{generate_ui_schema, UiSchemaNode};
use super::Renderer;
use crate::document::path::FieldPath;
use crate::schema::SchemaNode;

pub struct VerticalLayoutRenderer;
pub struct HorizontalLayoutRenderer;
pub struct GroupRenderer;
pub struct CategorizationRenderer;
pub struct LabelRenderer;

/// Recursion node for object-typed controls.
pub struct ObjectRenderer;

impl Renderer for VerticalLayoutRenderer {
    fn render(
        &self,
        dispatcher: &mut Dispatcher<'_>,
        ui: &UiSchemaNode,
        schema: &SchemaNode,
        path: &FieldPath,
    ) -> Option<RenderNode> {
        Some(RenderNode::Vertical {
            elements: dispatcher.dispatch_all(ui.elements(), schema, path),
        })
    }
}

impl Renderer for HorizontalLayoutRenderer {
    fn render(
        &self,
        dispatcher: &mut Dispatcher<'_>,
        ui: &UiSchemaNode,
        schema: &SchemaNode,
        path: &FieldPath,
    ) -> Option<RenderNode> {
        Some(RenderNode::Horizontal {
            elements: dispatcher.dispatch_all(ui.elements(), schema, path),
        })
    }
}

impl Renderer for GroupRenderer {
    fn render(
        &self,
        dispatcher: &mut Dispatcher<'_>,
        ui: &UiSchemaNode,
        schema: &SchemaNode,
        path: &FieldPath,
    ) -> Option<RenderNode> {
        let label = match ui {
            UiSchemaNode::Group { label, .. } => label.clone(),
            _ => None,
        };
        Some(RenderNode::Group {
            label,
            elements: dispatcher.dispatch_all(ui.elements(), schema, path),
        })
    }
}

impl Renderer for LabelRenderer {
    fn render(
        &self,
        _: &mut Dispatcher<'_>,
        ui: &UiSchemaNode,
        _: &SchemaNode,
        _: &FieldPath,
    ) -> Option<RenderNode> {
        match ui {
            UiSchemaNode::Label { text } => Some(RenderNode::Label { text: text.clone() }),
            _ => None,
        }
    }
}

impl Renderer for CategorizationRenderer {
    fn render(
        &self,
        dispatcher: &mut Dispatcher<'_>,
        ui: &UiSchemaNode,
        schema: &SchemaNode,
        path: &FieldPath,
    ) -> Option<RenderNode> {
        let UiSchemaNode::Categorization { label, .. } = ui else {
            return None;
        };
        let view = categorize(dispatcher, label.clone(), ui, schema, path);
        Some(RenderNode::Categorization(view))
    }
}

fn categorize(
    dispatcher: &mut Dispatcher<'_>,
    label: Option<String>,
    ui: &UiSchemaNode,
    schema: &SchemaNode,
    path: &FieldPath,
) -> CategorizationView {
    let mut tabs = Vec::new();
    for element in ui.elements() {
        match element {
            UiSchemaNode::Category { label, elements, .. } => tabs.push(TabView {
                label: label.clone(),
                content: dispatcher.dispatch_all(elements, schema, path),
            }),
            UiSchemaNode::Categorization { label: nested, .. } => {
                let inner = categorize(dispatcher, nested.clone(), element, schema, path);
                tabs.push(TabView {
                    label: nested.clone().unwrap_or_default(),
                    content: vec![RenderNode::Categorization(inner)],
                });
            }
            // Only categories belong in a categorization; anything else gets
            // the usual dispatch so it is either rendered or reported.
            other => {
                if let Some(node) = dispatcher.dispatch(other, schema, path) {
                    tabs.push(TabView {
                        label: String::new(),
                        content: vec![node],
                    });
                }
            }
        }
    }

    let requested = ui
        .option("selected")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as usize;
    let selected = requested.min(tabs.len().saturating_sub(1));
    CategorizationView {
        label,
        tabs,
        selected,
    }
}

impl Renderer for ObjectRenderer {
    fn render(
        &self,
        dispatcher: &mut Dispatcher<'_>,
        ui: &UiSchemaNode,
        schema: &SchemaNode,
        path: &FieldPath,
    ) -> Option<RenderNode> {
        let detail = match ui.detail() {
            Some(detail) => detail,
            None if path.is_root() => generate_ui_schema(schema),
            None => UiSchemaNode::Group {
                label: dispatcher.label_for(ui, schema, path),
                elements: generate_ui_schema(schema).elements().to_vec(),
                options: Default::default(),
            },
        };
        dispatcher.dispatch(&detail, schema, path)
    }
}
