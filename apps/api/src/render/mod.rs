//! Renderer dispatch engine: turns a schema + optional UI schema + data into a
//! serialisable form tree by picking, per node, the best-ranked renderer from
//! a fixed pool.

pub mod arrays;
pub mod controls;
pub mod dispatch;
pub mod layouts;
pub mod node;
pub mod registry;
pub mod tester;
pub mod ui_schema;

use serde::Serialize;
use serde_json::Value;

use crate::document::path::FieldPath;
use crate::schema::SchemaNode;
use crate::validation::ValidationResult;

pub use arrays::{apply_array_mutation, ArrayMutation, ArrayMutationError};
pub use controls::{ChangeRejected, Control, FieldChange};
pub use dispatch::{DispatchWarning, Dispatcher};
pub use node::RenderNode;
pub use registry::{default_registry, RendererRegistry};
pub use ui_schema::{generate_ui_schema, UiSchemaNode};

pub trait Renderer: Send + Sync {
    /// Renders `ui` against `schema` at `path`. For controls `schema` and
    /// `path` are already the scope's target.
    fn render(
        &self,
        dispatcher: &mut Dispatcher<'_>,
        ui: &UiSchemaNode,
        schema: &SchemaNode,
        path: &FieldPath,
    ) -> Option<RenderNode>;

    fn as_control(&self) -> Option<&dyn Control> {
        None
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedForm {
    pub root: Option<RenderNode>,
    pub warnings: Vec<DispatchWarning>,
}

/// Renders the whole form. Without a UI schema a default layout is generated.
pub fn render_form(
    registry: &RendererRegistry,
    schema: &SchemaNode,
    ui: Option<&UiSchemaNode>,
    data: &Value,
    validation: &ValidationResult,
) -> RenderedForm {
    let generated;
    let ui = match ui {
        Some(ui) => ui,
        None => {
            generated = generate_ui_schema(schema);
            &generated
        }
    };
    let mut dispatcher = Dispatcher::new(registry, schema, data, validation);
    let root = dispatcher.dispatch(ui, schema, &FieldPath::root());
    RenderedForm {
        root,
        warnings: dispatcher.into_warnings(),
    }
}

/// The control that owns `path`: whatever the rendered form bound there, or
/// the best match for the field's schema when the form did not draw it.
pub fn control_for_path<'r>(
    registry: &'r RendererRegistry,
    schema: &SchemaNode,
    ui: Option<&UiSchemaNode>,
    data: &Value,
    path: &FieldPath,
) -> Option<&'r dyn Control> {
    let form = render_form(registry, schema, ui, data, &ValidationResult::Valid);
    if let Some(view) = form.root.as_ref().and_then(|root| root.find_control(path)) {
        return registry.control_of_kind(view.control);
    }

    let field = schema.at_path(path)?;
    let bare = UiSchemaNode::control("#");
    let ctx = tester::TesterContext {
        root_schema: schema,
        path,
        data,
    };
    registry.resolve(&bare, field, &ctx)?.renderer.as_control()
}

/// `startDate` -> `Start Date`, `countryCode` -> `Country Code`.
pub fn start_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut prev: Option<char> = None;
    for ch in key.chars() {
        if ch == '_' || ch == '-' {
            prev = Some(' ');
            continue;
        }
        match prev {
            None => out.extend(ch.to_uppercase()),
            Some(' ') => {
                out.push(' ');
                out.extend(ch.to_uppercase());
            }
            Some(p) if ch.is_uppercase() && (p.is_lowercase() || p.is_ascii_digit()) => {
                out.push(' ');
                out.push(ch);
            }
            Some(_) => out.push(ch),
        }
        prev = Some(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::node::ControlKind;
    use crate::schema::resume_schema;
    use crate::validation::validate_candidate;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "basics": {"name": "Ada", "email": "bad", "location": {"city": "London"}},
            "work": [
                {"company": "Engines", "position": "Analyst", "startDate": "1842"},
                {"position": "Notes", "startDate": "1843"}
            ],
            "skills": []
        })
    }

    #[test]
    fn test_start_case() {
        assert_eq!(start_case("startDate"), "Start Date");
        assert_eq!(start_case("countryCode"), "Country Code");
        assert_eq!(start_case("url"), "Url");
        assert_eq!(start_case("release_date"), "Release Date");
    }

    #[test]
    fn test_default_form_for_resume() {
        let data = sample();
        let validation = validate_candidate(&data);
        let form = render_form(default_registry(), resume_schema(), None, &data, &validation);
        assert!(form.warnings.is_empty(), "{:?}", form.warnings);
        let root = form.root.unwrap();

        let RenderNode::Vertical { elements } = &root else {
            panic!("root should be a vertical layout");
        };
        assert_eq!(elements.len(), 12);
        assert!(matches!(&elements[0], RenderNode::Group { label: Some(l), .. } if l == "Basics"));

        let email = root.find_control(&"basics.email".parse().unwrap()).unwrap();
        assert!(!email.valid);
        assert_eq!(email.errors, vec!["Invalid email"]);

        let city = root.find_control(&"basics.location.city".parse().unwrap()).unwrap();
        assert_eq!(city.value, json!("London"));
        assert!(!city.required);

        let RenderNode::ArrayList(work) = &elements[1] else {
            panic!("work should render as a list");
        };
        assert_eq!(work.label, "Work Experience");
        let labels: Vec<_> = work.items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["Engines", "Notes"]);
        assert!(work.items[0].valid);
        assert!(!work.items[1].valid);
        assert!(!work.items[0].can_move_up && work.items[0].can_move_down);
        assert_eq!(work.remove_confirmation, "Are you sure you wish to delete this item?");

        let RenderNode::ArrayList(skills) = &elements[7] else {
            panic!("skills should render as a list");
        };
        assert_eq!(skills.empty_message, Some("No data"));
    }

    #[test]
    fn test_dispatch_is_deterministic() {
        let data = sample();
        let validation = validate_candidate(&data);
        let first = render_form(default_registry(), resume_schema(), None, &data, &validation);
        let second = render_form(default_registry(), resume_schema(), None, &data, &validation);
        assert_eq!(first.root, second.root);
    }

    #[test]
    fn test_explicit_ui_schema_with_table_and_tabs() {
        let ui: UiSchemaNode = serde_json::from_value(json!({
            "type": "Categorization",
            "options": {"selected": 9},
            "elements": [
                {"type": "Category", "label": "Identity", "elements": [
                    {"type": "HorizontalLayout", "elements": [
                        {"type": "Control", "scope": "#/properties/basics/properties/name"},
                        {"type": "Control", "scope": "#/properties/basics/properties/summary",
                         "options": {"multi": true}}
                    ]}
                ]},
                {"type": "Categorization", "label": "History", "elements": [
                    {"type": "Category", "label": "Jobs", "elements": [
                        {"type": "Control", "scope": "#/properties/work", "options": {"table": true}}
                    ]}
                ]}
            ]
        }))
        .unwrap();

        let data = sample();
        let validation = validate_candidate(&data);
        let form = render_form(default_registry(), resume_schema(), Some(&ui), &data, &validation);
        let Some(RenderNode::Categorization(tabs)) = &form.root else {
            panic!("expected tabs");
        };
        assert_eq!(tabs.tabs.len(), 2);
        assert_eq!(tabs.selected, 1);

        let summary = form
            .root
            .as_ref()
            .unwrap()
            .find_control(&"basics.summary".parse().unwrap())
            .unwrap();
        assert_eq!(summary.control, ControlKind::TextArea);

        let RenderNode::Categorization(history) = &tabs.tabs[1].content[0] else {
            panic!("expected nested tabs");
        };
        let RenderNode::ArrayTable(table) = &history.tabs[0].content[0] else {
            panic!("expected a table");
        };
        let columns: Vec<_> = table.columns.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(
            columns,
            vec!["Company", "Position", "Website", "Start Date", "End Date", "Summary"]
        );
        assert_eq!(table.rows.len(), 2);
        assert!(table.rows[0].valid && !table.rows[1].valid);
        let Some(RenderNode::Control(cell)) = &table.rows[0].cells[0] else {
            panic!("expected a cell control");
        };
        assert_eq!(cell.label, None);
        assert_eq!(cell.path.to_string(), "work[0].company");
    }

    #[test]
    fn test_unmatched_node_is_reported_not_fatal() {
        let ui: UiSchemaNode = serde_json::from_value(json!({
            "type": "VerticalLayout",
            "elements": [
                {"type": "Category", "label": "Stray"},
                {"type": "Label", "text": "Hello"}
            ]
        }))
        .unwrap();
        let data = sample();
        let form = render_form(
            default_registry(),
            resume_schema(),
            Some(&ui),
            &data,
            &ValidationResult::Valid,
        );
        assert_eq!(
            form.root,
            Some(RenderNode::Vertical {
                elements: vec![RenderNode::Label { text: "Hello".into() }]
            })
        );
        assert!(matches!(
            form.warnings.as_slice(),
            [DispatchWarning::NoApplicableRenderer { .. }]
        ));
    }

    #[test]
    fn test_control_for_path_uses_rendered_choice() {
        let ui = generate_ui_schema(resume_schema());
        let data = sample();
        let path: FieldPath = "basics.name".parse().unwrap();
        let control = control_for_path(default_registry(), resume_schema(), Some(&ui), &data, &path).unwrap();
        assert_eq!(control.kind(), ControlKind::Text);

        // an entry that does not exist yet still resolves from its schema
        let path: FieldPath = "work[5].company".parse().unwrap();
        let control = control_for_path(default_registry(), resume_schema(), None, &data, &path).unwrap();
        assert_eq!(control.kind(), ControlKind::Text);
    }
}
