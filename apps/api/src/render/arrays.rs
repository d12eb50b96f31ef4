//! Array strategies (card list and table) and the mutations they emit.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::dispatch::Dispatcher;
use super::node::{ArrayListView, ArrayTableView, ColumnView, ListItemView, RenderNode, RowView};
use super::ui_schema::{generate_ui_schema, LabelSpec, Options, Scope, UiSchemaNode};
use super::{start_case, Renderer};
use crate::document::path::{FieldPath, PathError};
use crate::schema::SchemaNode;

pub const REMOVE_CONFIRMATION: &str = "Are you sure you wish to delete this item?";
pub const EMPTY_MESSAGE: &str = "No data";

pub struct ArrayListRenderer;
pub struct ArrayTableRenderer;

fn entries<'a>(dispatcher: &Dispatcher<'a>, path: &FieldPath) -> &'a [Value] {
    dispatcher
        .value_at(path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn bare_control(scope: String) -> UiSchemaNode {
    UiSchemaNode::Control {
        scope,
        label: Some(LabelSpec::Show(false)),
        options: Options::new(),
    }
}

/// Human label for a list entry, taken from its content: the first
/// non-empty string in declared property order. Never the index.
fn item_label(items: &SchemaNode, value: &Value) -> String {
    let from_content = match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => items
            .as_object()
            .into_iter()
            .flat_map(|o| o.properties.iter())
            .filter_map(|p| map.get(&p.name))
            .chain(map.values())
            .find_map(|v| v.as_str().filter(|s| !s.trim().is_empty()))
            .map(str::to_string),
        _ => None,
    };
    from_content.unwrap_or_else(|| "Untitled".to_string())
}

impl Renderer for ArrayListRenderer {
    fn render(
        &self,
        dispatcher: &mut Dispatcher<'_>,
        ui: &UiSchemaNode,
        schema: &SchemaNode,
        path: &FieldPath,
    ) -> Option<RenderNode> {
        let items = schema.items()?;
        let label = dispatcher.label_for(ui, schema, path).unwrap_or_default();
        let data = entries(dispatcher, path);
        let item_ui = if items.as_object().is_some() {
            ui.detail().unwrap_or_else(|| generate_ui_schema(items))
        } else {
            bare_control("#".to_string())
        };

        let last = data.len().saturating_sub(1);
        let views = data
            .iter()
            .enumerate()
            .map(|(index, value)| {
                let item_path = path.index(index);
                ListItemView {
                    index,
                    label: item_label(items, value),
                    can_move_up: index > 0,
                    can_move_down: index < last,
                    valid: !dispatcher.validation().has_errors_within(&item_path),
                    content: dispatcher.dispatch(&item_ui, items, &item_path).map(Box::new),
                }
            })
            .collect::<Vec<_>>();

        Some(RenderNode::ArrayList(ArrayListView {
            path: path.clone(),
            add_label: format!("Add to {label}"),
            label,
            remove_confirmation: REMOVE_CONFIRMATION,
            empty_message: views.is_empty().then_some(EMPTY_MESSAGE),
            items: views,
            errors: dispatcher.validation().errors_at(path).map(str::to_string).collect(),
        }))
    }
}

impl Renderer for ArrayTableRenderer {
    fn render(
        &self,
        dispatcher: &mut Dispatcher<'_>,
        ui: &UiSchemaNode,
        schema: &SchemaNode,
        path: &FieldPath,
    ) -> Option<RenderNode> {
        let items = schema.items()?;
        let label = dispatcher.label_for(ui, schema, path).unwrap_or_default();

        let columns: Vec<ColumnView> = match items.as_object() {
            Some(object) => object
                .properties
                .iter()
                .filter(|p| p.schema.is_scalar())
                .map(|p| ColumnView {
                    key: Some(p.name.clone()),
                    label: p.schema.title.clone().unwrap_or_else(|| start_case(&p.name)),
                })
                .collect(),
            None => vec![ColumnView {
                key: None,
                label: label.clone(),
            }],
        };
        let cell_uis: Vec<UiSchemaNode> = columns
            .iter()
            .map(|c| match &c.key {
                Some(key) => bare_control(Scope::for_property(key)),
                None => bare_control("#".to_string()),
            })
            .collect();

        let rows = (0..entries(dispatcher, path).len())
            .map(|index| {
                let row_path = path.index(index);
                RowView {
                    index,
                    valid: !dispatcher.validation().has_errors_within(&row_path),
                    cells: cell_uis
                        .iter()
                        .map(|cell| dispatcher.dispatch(cell, items, &row_path))
                        .collect(),
                }
            })
            .collect::<Vec<_>>();

        Some(RenderNode::ArrayTable(ArrayTableView {
            path: path.clone(),
            label,
            columns,
            empty_message: rows.is_empty().then_some(EMPTY_MESSAGE),
            rows,
            errors: dispatcher.validation().errors_at(path).map(str::to_string).collect(),
        }))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Mutations
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ArrayMutation {
    Add,
    Remove {
        index: usize,
        #[serde(default)]
        confirmed: bool,
    },
    MoveUp {
        index: usize,
    },
    MoveDown {
        index: usize,
    },
}

#[derive(Debug, Error, PartialEq)]
pub enum ArrayMutationError {
    #[error("'{0}' is not an array field")]
    NotAnArray(FieldPath),

    #[error("Index {index} is out of range for '{path}' (length {len})")]
    OutOfRange {
        path: FieldPath,
        index: usize,
        len: usize,
    },

    #[error("Removing '{path}[{index}]' requires confirmation")]
    Unconfirmed { path: FieldPath, index: usize },

    #[error("Cannot move '{path}[{index}]' any further")]
    CannotMove { path: FieldPath, index: usize },

    #[error(transparent)]
    Path(#[from] PathError),
}

/// Applies `mutation` to the array at `path` inside `candidate`. `Add`
/// appends the item schema's default value, creating the array if absent.
pub fn apply_array_mutation(
    root_schema: &SchemaNode,
    candidate: &mut Value,
    path: &FieldPath,
    mutation: &ArrayMutation,
) -> Result<(), ArrayMutationError> {
    let items = root_schema
        .at_path(path)
        .and_then(SchemaNode::items)
        .ok_or_else(|| ArrayMutationError::NotAnArray(path.clone()))?;

    if let ArrayMutation::Add = mutation {
        let fresh = items.default_value();
        match path.get_mut(candidate) {
            Some(Value::Array(array)) => {
                array.push(fresh);
                return Ok(());
            }
            Some(Value::Null) | None => {}
            Some(_) => return Err(ArrayMutationError::NotAnArray(path.clone())),
        }
        path.set(candidate, Value::Array(vec![fresh]))?;
        return Ok(());
    }

    let array = match path.get_mut(candidate) {
        Some(Value::Array(array)) => array,
        _ => return Err(ArrayMutationError::NotAnArray(path.clone())),
    };
    let len = array.len();
    let out_of_range = |index: usize| ArrayMutationError::OutOfRange {
        path: path.clone(),
        index,
        len,
    };

    match *mutation {
        ArrayMutation::Add => {}
        ArrayMutation::Remove { index, confirmed } => {
            if index >= len {
                return Err(out_of_range(index));
            }
            if !confirmed {
                return Err(ArrayMutationError::Unconfirmed {
                    path: path.clone(),
                    index,
                });
            }
            array.remove(index);
        }
        ArrayMutation::MoveUp { index } => {
            if index >= len {
                return Err(out_of_range(index));
            }
            if index == 0 {
                return Err(ArrayMutationError::CannotMove {
                    path: path.clone(),
                    index,
                });
            }
            array.swap(index - 1, index);
        }
        ArrayMutation::MoveDown { index } => {
            if index >= len {
                return Err(out_of_range(index));
            }
            if index + 1 == len {
                return Err(ArrayMutationError::CannotMove {
                    path: path.clone(),
                    index,
                });
            }
            array.swap(index, index + 1);
        }
    }
    Ok(())
}
