//! Testers: pure `(ui node, schema node, context) -> rank` predicates.
//!
//! For a `Control` the schema node handed to a tester is the node its scope
//! resolves to; for layouts it is the schema the layout renders against.

use serde_json::Value;

use super::ui_schema::{UiSchemaNode, UiType};
use crate::document::path::FieldPath;
use crate::schema::{SchemaKind, SchemaNode, StringFormat};

pub struct TesterContext<'a> {
    pub root_schema: &'a SchemaNode,
    pub path: &'a FieldPath,
    pub data: &'a Value,
}

pub type Predicate =
    Box<dyn Fn(&UiSchemaNode, &SchemaNode, &TesterContext<'_>) -> bool + Send + Sync>;

pub struct RankedTester {
    rank: u32,
    predicate: Predicate,
}

impl RankedTester {
    /// `None` means not applicable. A zero rank never applies.
    pub fn test(
        &self,
        ui: &UiSchemaNode,
        schema: &SchemaNode,
        ctx: &TesterContext<'_>,
    ) -> Option<u32> {
        (self.rank > 0 && (self.predicate)(ui, schema, ctx)).then_some(self.rank)
    }

    pub fn rank(&self) -> u32 {
        self.rank
    }
}

pub fn rank_with(rank: u32, predicate: Predicate) -> RankedTester {
    RankedTester { rank, predicate }
}

pub fn predicate<F>(f: F) -> Predicate
where
    F: Fn(&UiSchemaNode, &SchemaNode, &TesterContext<'_>) -> bool + Send + Sync + 'static,
{
    Box::new(f)
}

pub fn and(a: Predicate, b: Predicate) -> Predicate {
    predicate(move |ui, schema, ctx| a(ui, schema, ctx) && b(ui, schema, ctx))
}

pub fn or(a: Predicate, b: Predicate) -> Predicate {
    predicate(move |ui, schema, ctx| a(ui, schema, ctx) || b(ui, schema, ctx))
}

pub fn ui_type_is(expected: UiType) -> Predicate {
    predicate(move |ui, _, _| ui.ui_type() == expected)
}

pub fn is_control() -> Predicate {
    ui_type_is(UiType::Control)
}

pub fn schema_type_is(expected: &'static str) -> Predicate {
    predicate(move |_, schema, _| schema.type_name() == expected)
}

pub fn format_is(format: StringFormat) -> Predicate {
    predicate(move |_, schema, _| {
        schema
            .string_constraints()
            .is_some_and(|c| c.format == Some(format))
    })
}

pub fn option_is(key: &'static str, expected: Value) -> Predicate {
    predicate(move |ui, _, _| ui.option(key) == Some(&expected))
}

pub fn is_enum() -> Predicate {
    predicate(|_, schema, _| {
        schema
            .string_constraints()
            .is_some_and(|c| c.enum_values.is_some())
    })
}

pub fn is_one_of_enum() -> Predicate {
    predicate(|_, schema, _| {
        schema
            .string_constraints()
            .is_some_and(|c| c.one_of.is_some())
    })
}

pub fn is_multi_line() -> Predicate {
    and(
        schema_type_is("string"),
        predicate(|ui, _, _| ui.flag("multi")),
    )
}

/// Number or integer with both bounds, opted into with `options.slider`.
pub fn is_range() -> Predicate {
    predicate(|ui, schema, _| {
        let bounded = schema
            .number_constraints()
            .is_some_and(|c| c.minimum.is_some() && c.maximum.is_some());
        bounded && ui.flag("slider")
    })
}

pub fn is_number_format() -> Predicate {
    and(
        schema_type_is("integer"),
        predicate(|ui, _, _| ui.flag("format")),
    )
}

pub fn is_object_control() -> Predicate {
    and(
        is_control(),
        predicate(|_, schema, _| matches!(schema.kind, SchemaKind::Object(_))),
    )
}

pub fn is_array_control() -> Predicate {
    and(
        is_control(),
        predicate(|_, schema, _| matches!(schema.kind, SchemaKind::Array(_))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx<'a>(root: &'a SchemaNode, path: &'a FieldPath, data: &'a Value) -> TesterContext<'a> {
        TesterContext {
            root_schema: root,
            path,
            data,
        }
    }

    #[test]
    fn test_zero_rank_never_applies() {
        let root = SchemaNode::string();
        let (path, data) = (FieldPath::root(), json!(null));
        let tester = rank_with(0, is_control());
        let ui = UiSchemaNode::control("#");
        assert_eq!(tester.test(&ui, &root, &ctx(&root, &path, &data)), None);
    }

    #[test]
    fn test_combinators() {
        let root = SchemaNode::integer().bounded(0.0, 10.0);
        let (path, data) = (FieldPath::root(), json!(3));
        let c = ctx(&root, &path, &data);

        let plain = UiSchemaNode::control("#");
        let slider = UiSchemaNode::control("#").with_option("slider", json!(true));

        let tester = rank_with(4, and(is_control(), is_range()));
        assert_eq!(tester.test(&plain, &root, &c), None);
        assert_eq!(tester.test(&slider, &root, &c), Some(4));

        let either = rank_with(1, or(schema_type_is("string"), schema_type_is("integer")));
        assert_eq!(either.test(&plain, &root, &c), Some(1));
    }

    #[test]
    fn test_option_is_matches_exact_value() {
        let root = SchemaNode::string_enum(&["a", "b"]);
        let (path, data) = (FieldPath::root(), json!("a"));
        let c = ctx(&root, &path, &data);
        let radio = UiSchemaNode::control("#").with_option("format", json!("radio"));
        let other = UiSchemaNode::control("#").with_option("format", json!("select"));

        let tester = rank_with(3, and(is_enum(), option_is("format", json!("radio"))));
        assert_eq!(tester.test(&radio, &root, &c), Some(3));
        assert_eq!(tester.test(&other, &root, &c), None);
    }
}
