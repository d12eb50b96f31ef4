use serde::Serialize;
use serde_json::Value;

use crate::document::path::FieldPath;

/// Rendered form tree, serialised for the client to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderNode {
    Control(ControlView),
    Vertical {
        elements: Vec<RenderNode>,
    },
    Horizontal {
        elements: Vec<RenderNode>,
    },
    Group {
        label: Option<String>,
        elements: Vec<RenderNode>,
    },
    Categorization(CategorizationView),
    Label {
        text: String,
    },
    ArrayList(ArrayListView),
    ArrayTable(ArrayTableView),
}

impl RenderNode {
    pub fn children(&self) -> Vec<&RenderNode> {
        match self {
            RenderNode::Vertical { elements }
            | RenderNode::Horizontal { elements }
            | RenderNode::Group { elements, .. } => elements.iter().collect(),
            RenderNode::Categorization(c) => c.tabs.iter().flat_map(|t| t.content.iter()).collect(),
            RenderNode::ArrayList(list) => list.items.iter().filter_map(|i| i.content.as_deref()).collect(),
            RenderNode::ArrayTable(table) => table.rows.iter().flat_map(|r| r.cells.iter().flatten()).collect(),
            RenderNode::Control(_) | RenderNode::Label { .. } => Vec::new(),
        }
    }

    /// Depth-first search for the control bound to `path`.
    pub fn find_control(&self, path: &FieldPath) -> Option<&ControlView> {
        match self {
            RenderNode::Control(view) if &view.path == path => Some(view),
            other => other.children().into_iter().find_map(|c| c.find_control(path)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    Text,
    TextArea,
    Date,
    DateTime,
    Time,
    EnumSelect,
    Radio,
    OneOfSelect,
    Toggle,
    Integer,
    Number,
    FormattedNumber,
    Slider,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlView {
    pub control: ControlKind,
    pub path: FieldPath,
    pub label: Option<String>,
    pub required: bool,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    pub errors: Vec<String>,
    pub valid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabView {
    pub label: String,
    pub content: Vec<RenderNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorizationView {
    pub label: Option<String>,
    pub tabs: Vec<TabView>,
    pub selected: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListItemView {
    pub index: usize,
    pub label: String,
    pub can_move_up: bool,
    pub can_move_down: bool,
    pub valid: bool,
    pub content: Option<Box<RenderNode>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayListView {
    pub path: FieldPath,
    pub label: String,
    pub add_label: String,
    pub remove_confirmation: &'static str,
    pub items: Vec<ListItemView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<&'static str>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnView {
    pub key: Option<String>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowView {
    pub index: usize,
    pub valid: bool,
    /// One slot per column; `None` where no renderer applied.
    pub cells: Vec<Option<RenderNode>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayTableView {
    pub path: FieldPath,
    pub label: String,
    pub columns: Vec<ColumnView>,
    pub rows: Vec<RowView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<&'static str>,
    pub errors: Vec<String>,
}
