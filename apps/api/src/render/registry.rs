//! The renderer pool. Built once, read-only afterwards, shared by every
//! session.
//!
//! Resolution rule: the highest rank wins; on an exact tie the renderer
//! registered first wins. Rank 0 / not applicable never wins.

use std::sync::{Arc, LazyLock};

use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use super::arrays::{ArrayListRenderer, ArrayTableRenderer};
use super::controls::*;
use super::layouts::{
    CategorizationRenderer, GroupRenderer, HorizontalLayoutRenderer, LabelRenderer,
    ObjectRenderer, VerticalLayoutRenderer,
};
use super::node::ControlKind;
use super::tester::*;
use super::ui_schema::{UiSchemaNode, UiType};
use super::Renderer;
use crate::schema::{SchemaNode, StringFormat};

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("Renderer pool is empty")]
    EmptyPool,
}

pub struct Registration {
    pub name: &'static str,
    pub tester: RankedTester,
    pub renderer: Arc<dyn Renderer>,
}

impl Registration {
    pub fn new(name: &'static str, tester: RankedTester, renderer: impl Renderer + 'static) -> Self {
        Self {
            name,
            tester,
            renderer: Arc::new(renderer),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub name: &'static str,
    pub rank: u32,
    pub registration_order: usize,
}

pub struct RendererRegistry {
    entries: Vec<Registration>,
}

impl RendererRegistry {
    pub fn new(entries: Vec<Registration>) -> Result<Self, RegistryError> {
        if entries.is_empty() {
            return Err(RegistryError::EmptyPool);
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn resolve(
        &self,
        ui: &UiSchemaNode,
        schema: &SchemaNode,
        ctx: &TesterContext<'_>,
    ) -> Option<&Registration> {
        let mut best: Option<(u32, &Registration)> = None;
        for entry in &self.entries {
            if let Some(rank) = entry.tester.test(ui, schema, ctx) {
                // strict: an equal rank keeps the earlier registration
                if best.map_or(true, |(top, _)| rank > top) {
                    best = Some((rank, entry));
                }
            }
        }
        best.map(|(_, entry)| entry)
    }

    /// Every applicable registration, best first, ties in registration order.
    pub fn ranked_candidates(
        &self,
        ui: &UiSchemaNode,
        schema: &SchemaNode,
        ctx: &TesterContext<'_>,
    ) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(order, entry)| {
                entry.tester.test(ui, schema, ctx).map(|rank| Candidate {
                    name: entry.name,
                    rank,
                    registration_order: order,
                })
            })
            .collect();
        candidates.sort_by(|a, b| {
            b.rank
                .cmp(&a.rank)
                .then(a.registration_order.cmp(&b.registration_order))
        });
        candidates
    }

    /// The registered control that draws `kind`, if any.
    pub fn control_of_kind(&self, kind: ControlKind) -> Option<&dyn Control> {
        self.entries
            .iter()
            .filter_map(|e| e.renderer.as_control())
            .find(|c| c.kind() == kind)
    }
}

pub fn builtin_registrations() -> Vec<Registration> {
    let control = || is_control();
    vec![
        Registration::new(
            "text",
            rank_with(1, and(control(), schema_type_is("string"))),
            ControlRenderer(TextControl),
        ),
        Registration::new(
            "textarea",
            rank_with(2, and(control(), is_multi_line())),
            ControlRenderer(TextAreaControl),
        ),
        Registration::new(
            "date",
            rank_with(2, and(control(), format_is(StringFormat::Date))),
            ControlRenderer(DateControl),
        ),
        Registration::new(
            "date-time",
            rank_with(2, and(control(), format_is(StringFormat::DateTime))),
            ControlRenderer(DateTimeControl),
        ),
        Registration::new(
            "time",
            rank_with(2, and(control(), format_is(StringFormat::Time))),
            ControlRenderer(TimeControl),
        ),
        Registration::new(
            "enum-select",
            rank_with(2, and(control(), is_enum())),
            ControlRenderer(EnumSelectControl),
        ),
        Registration::new(
            "radio",
            rank_with(
                3,
                and(control(), and(is_enum(), option_is("format", json!("radio")))),
            ),
            ControlRenderer(RadioControl),
        ),
        Registration::new(
            "one-of-select",
            rank_with(3, and(control(), is_one_of_enum())),
            ControlRenderer(OneOfSelectControl),
        ),
        Registration::new(
            "toggle",
            rank_with(2, and(control(), schema_type_is("boolean"))),
            ControlRenderer(ToggleControl),
        ),
        Registration::new(
            "integer",
            rank_with(2, and(control(), schema_type_is("integer"))),
            ControlRenderer(IntegerControl),
        ),
        Registration::new(
            "number",
            rank_with(2, and(control(), schema_type_is("number"))),
            ControlRenderer(NumberControl),
        ),
        Registration::new(
            "formatted-number",
            rank_with(4, and(control(), is_number_format())),
            ControlRenderer(FormattedNumberControl),
        ),
        Registration::new(
            "slider",
            rank_with(
                4,
                and(
                    control(),
                    and(or(schema_type_is("number"), schema_type_is("integer")), is_range()),
                ),
            ),
            ControlRenderer(SliderControl),
        ),
        Registration::new("object", rank_with(2, is_object_control()), ObjectRenderer),
        Registration::new("array-list", rank_with(3, is_array_control()), ArrayListRenderer),
        Registration::new(
            "array-table",
            rank_with(
                4,
                and(is_array_control(), option_is("table", json!(true))),
            ),
            ArrayTableRenderer,
        ),
        Registration::new(
            "vertical-layout",
            rank_with(1, ui_type_is(UiType::VerticalLayout)),
            VerticalLayoutRenderer,
        ),
        Registration::new(
            "horizontal-layout",
            rank_with(1, ui_type_is(UiType::HorizontalLayout)),
            HorizontalLayoutRenderer,
        ),
        Registration::new("group", rank_with(1, ui_type_is(UiType::Group)), GroupRenderer),
        Registration::new(
            "categorization",
            rank_with(1, ui_type_is(UiType::Categorization)),
            CategorizationRenderer,
        ),
        Registration::new("label", rank_with(1, ui_type_is(UiType::Label)), LabelRenderer),
    ]
}

static DEFAULT_REGISTRY: LazyLock<RendererRegistry> = LazyLock::new(|| {
    RendererRegistry::new(builtin_registrations()).expect("built-in renderer pool is non-empty")
});

pub fn default_registry() -> &'static RendererRegistry {
    &DEFAULT_REGISTRY
}
