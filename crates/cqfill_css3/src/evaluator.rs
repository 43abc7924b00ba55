use crate::query::{
    ComparisonOp, ContainerRule, Orientation, QueryContext, QueryExpr, QueryValue, SizeFeature, TreeContext, TriState,
    WritingAxis,
};
use crate::tokenizer::Number;
use std::collections::HashMap;

/// Evaluates a container rule against one candidate container.
///
/// Every size feature the rule references is resolved first; if any of them is unknown the whole
/// rule is unknown, regardless of the condition shape. The function is pure.
pub fn evaluate(rule: &ContainerRule, ctx: &QueryContext) -> TriState {
    let mut values = HashMap::new();

    for feature in &rule.features {
        let value = compute_feature(*feature, ctx);
        if value == QueryValue::Unknown {
            return TriState::Unknown;
        }
        values.insert(*feature, value);
    }

    to_tristate(&evaluate_expr(&rule.condition, &values, &ctx.tree_context))
}

/// Resolves one referenced feature from the context's size snapshot.
///
/// `width`/`height` come from the physical axes; `inline-size`/`block-size` map through the
/// writing axis; `aspect-ratio` and `orientation` derive from both axes. A host that precomputed
/// a feature directly wins over derivation.
fn compute_feature(feature: SizeFeature, ctx: &QueryContext) -> QueryValue {
    if let Some(value) = ctx.size_features.get(&feature) {
        return value.clone();
    }

    let physical = |f: SizeFeature| ctx.size_features.get(&f).cloned().unwrap_or(QueryValue::Unknown);
    let physical_px =
        |f: SizeFeature| ctx.size_features.get(&f).and_then(|v| coerce_to_px(v, &ctx.tree_context));

    match feature {
        SizeFeature::Width | SizeFeature::Height => QueryValue::Unknown,
        SizeFeature::InlineSize => match ctx.tree_context.writing_axis {
            WritingAxis::Horizontal => physical(SizeFeature::Width),
            WritingAxis::Vertical => physical(SizeFeature::Height),
        },
        SizeFeature::BlockSize => match ctx.tree_context.writing_axis {
            WritingAxis::Horizontal => physical(SizeFeature::Height),
            WritingAxis::Vertical => physical(SizeFeature::Width),
        },
        SizeFeature::AspectRatio => match (physical_px(SizeFeature::Width), physical_px(SizeFeature::Height)) {
            (Some(w), Some(h)) if h > 0.0 => QueryValue::Number(w / h),
            _ => QueryValue::Unknown,
        },
        SizeFeature::Orientation => match (physical_px(SizeFeature::Width), physical_px(SizeFeature::Height)) {
            (Some(w), Some(h)) => QueryValue::Orientation(if h >= w {
                Orientation::Portrait
            } else {
                Orientation::Landscape
            }),
            _ => QueryValue::Unknown,
        },
    }
}

fn evaluate_expr(expr: &QueryExpr, values: &HashMap<SizeFeature, QueryValue>, tree: &TreeContext) -> QueryValue {
    match expr {
        QueryExpr::Value(value) => value.clone(),
        QueryExpr::Feature(feature) => values.get(feature).cloned().unwrap_or(QueryValue::Unknown),
        QueryExpr::Not(child) => {
            boolean_value(to_tristate(&evaluate_expr(child, values, tree)).negate())
        }
        QueryExpr::And(left, right) => {
            // short-circuit: anything but true on the left is the result
            let lhs = to_tristate(&evaluate_expr(left, values, tree));
            if lhs != TriState::True {
                return boolean_value(lhs);
            }
            boolean_value(to_tristate(&evaluate_expr(right, values, tree)))
        }
        QueryExpr::Or(left, right) => {
            let lhs = to_tristate(&evaluate_expr(left, values, tree));
            if lhs == TriState::True {
                return boolean_value(lhs);
            }
            boolean_value(to_tristate(&evaluate_expr(right, values, tree)))
        }
        QueryExpr::Compare { op, left, right } => {
            let lhs = evaluate_expr(left, values, tree);
            let rhs = evaluate_expr(right, values, tree);
            compare(*op, &lhs, &rhs, tree)
        }
    }
}

fn compare(op: ComparisonOp, left: &QueryValue, right: &QueryValue, tree: &TreeContext) -> QueryValue {
    match (left, right) {
        // discrete values only define equality
        (QueryValue::Orientation(a), QueryValue::Orientation(b)) => match op {
            ComparisonOp::Eq => QueryValue::Boolean(a == b),
            _ => QueryValue::Unknown,
        },
        (QueryValue::Boolean(a), QueryValue::Boolean(b)) => match op {
            ComparisonOp::Eq => QueryValue::Boolean(a == b),
            _ => QueryValue::Unknown,
        },
        _ if matches!(left, QueryValue::Dimension { .. }) || matches!(right, QueryValue::Dimension { .. }) => {
            match (coerce_to_px(left, tree), coerce_to_px(right, tree)) {
                (Some(a), Some(b)) => QueryValue::Boolean(numeric_compare(op, a, b)),
                _ => QueryValue::Unknown,
            }
        }
        (QueryValue::Number(a), QueryValue::Number(b)) => QueryValue::Boolean(numeric_compare(op, *a, *b)),
        _ => QueryValue::Unknown,
    }
}

fn numeric_compare(op: ComparisonOp, a: Number, b: Number) -> bool {
    match op {
        ComparisonOp::Eq => a == b,
        ComparisonOp::Lt => a < b,
        ComparisonOp::Le => a <= b,
        ComparisonOp::Gt => a > b,
        ComparisonOp::Ge => a >= b,
    }
}

/// Coerces an operand to pixels. Dimensions resolve through the tree context; the number zero is
/// coercible to a zero length, any other bare number is not.
pub(crate) fn coerce_to_px(value: &QueryValue, tree: &TreeContext) -> Option<Number> {
    match value {
        QueryValue::Dimension { value, unit } => unit_to_px(*value, unit, tree),
        QueryValue::Number(n) if *n == 0.0 => Some(0.0),
        _ => None,
    }
}

/// Container-relative units collapse to unknown when the corresponding scale is absent
fn unit_to_px(value: Number, unit: &str, tree: &TreeContext) -> Option<Number> {
    match unit {
        "px" => Some(value),
        "em" => Some(value * tree.font_size),
        "rem" => Some(value * tree.root_font_size),
        "cqw" => tree.cqw.map(|scale| value * scale),
        "cqh" => tree.cqh.map(|scale| value * scale),
        "cqi" => tree.cqi().map(|scale| value * scale),
        "cqb" => tree.cqb().map(|scale| value * scale),
        "cqmin" => match (tree.cqi(), tree.cqb()) {
            (Some(i), Some(b)) => Some(value * i.min(b)),
            _ => None,
        },
        "cqmax" => match (tree.cqi(), tree.cqb()) {
            (Some(i), Some(b)) => Some(value * i.max(b)),
            _ => None,
        },
        _ => None,
    }
}

/// Boolean context over a resolved value: non-zero lengths and numbers are truthy, unknown stays
/// unknown
fn to_tristate(value: &QueryValue) -> TriState {
    match value {
        QueryValue::Boolean(b) => (*b).into(),
        QueryValue::Number(n) => (*n != 0.0).into(),
        QueryValue::Dimension { value, .. } => (*value != 0.0).into(),
        QueryValue::Orientation(_) | QueryValue::Unknown => TriState::Unknown,
    }
}

fn boolean_value(state: TriState) -> QueryValue {
    match state {
        TriState::True => QueryValue::Boolean(true),
        TriState::False => QueryValue::Boolean(false),
        TriState::Unknown => QueryValue::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::container::parse_container_rule;
    use crate::parser_config::ParserConfig;
    use crate::CssParser;
    use test_case::test_case;

    fn rule(prelude: &str) -> ContainerRule {
        let css = format!("@container {prelude} {{}}");
        let sheet = CssParser::parse_str(&css, ParserConfig::default()).unwrap();
        let children = sheet.as_stylesheet().unwrap();
        let crate::node::NodeType::AtRule { prelude, .. } = &*children[0].node_type else {
            panic!("expected at-rule");
        };
        parse_container_rule(prelude).unwrap()
    }

    fn ctx(width: Option<Number>, height: Option<Number>) -> QueryContext {
        let mut size_features = HashMap::new();
        if let Some(w) = width {
            size_features.insert(
                SizeFeature::Width,
                QueryValue::Dimension {
                    value: w,
                    unit: "px".into(),
                },
            );
        }
        if let Some(h) = height {
            size_features.insert(
                SizeFeature::Height,
                QueryValue::Dimension {
                    value: h,
                    unit: "px".into(),
                },
            );
        }

        QueryContext {
            size_features,
            tree_context: TreeContext {
                cqw: Some(4.0),
                cqh: Some(2.0),
                font_size: 16.0,
                root_font_size: 16.0,
                writing_axis: WritingAxis::Horizontal,
            },
        }
    }

    #[test_case("(width >= 200px)", Some(300.0), Some(100.0), TriState::True; "min width true")]
    #[test_case("(width >= 200px)", Some(150.0), Some(100.0), TriState::False; "min width false")]
    #[test_case("(orientation: portrait)", Some(100.0), Some(200.0), TriState::True; "portrait")]
    #[test_case("(orientation: portrait)", Some(200.0), Some(100.0), TriState::False; "landscape is not portrait")]
    #[test_case("(orientation: portrait)", Some(100.0), Some(100.0), TriState::True; "square is portrait")]
    #[test_case("(aspect-ratio >= 2)", Some(400.0), Some(100.0), TriState::True; "aspect ratio four")]
    #[test_case("(aspect-ratio > 4/1)", Some(400.0), Some(100.0), TriState::False; "aspect ratio not above four")]
    #[test_case("(width >= 10em)", Some(200.0), Some(100.0), TriState::True; "em coercion")]
    #[test_case("(width >= 10rem)", Some(100.0), Some(100.0), TriState::False; "rem coercion")]
    #[test_case("(width >= 200px)", None, Some(100.0), TriState::Unknown; "unknown width")]
    #[test_case("(height: 100px)", Some(300.0), Some(100.0), TriState::True; "plain equality")]
    #[test_case("(inline-size > 250px)", Some(300.0), Some(100.0), TriState::True; "inline size horizontal")]
    #[test_case("(block-size > 250px)", Some(300.0), Some(100.0), TriState::False; "block size horizontal")]
    #[test_case("(width)", Some(300.0), Some(100.0), TriState::True; "boolean feature nonzero")]
    #[test_case("(width)", Some(0.0), Some(100.0), TriState::False; "boolean feature zero")]
    #[test_case("(not (width))", Some(300.0), Some(100.0), TriState::False; "negated boolean feature")]
    #[test_case("(100px < width) and (width <= 400px)", Some(300.0), Some(100.0), TriState::True; "range conjunction inside")]
    #[test_case("(100px < width <= 400px)", Some(400.0), Some(100.0), TriState::True; "double range upper bound inclusive")]
    #[test_case("(100px < width <= 400px)", Some(100.0), Some(100.0), TriState::False; "double range lower bound exclusive")]
    #[test_case("(width > 500px) or (height > 50px)", Some(300.0), Some(100.0), TriState::True; "or short circuit")]
    #[test_case("style(--x: y)", Some(300.0), Some(100.0), TriState::Unknown; "style query is unknown")]
    fn oracles(prelude: &str, width: Option<Number>, height: Option<Number>, expected: TriState) {
        assert_eq!(evaluate(&rule(prelude), &ctx(width, height)), expected);
    }

    #[test]
    fn container_relative_units() {
        // cqw scale is 4 px per unit in this context
        assert_eq!(evaluate(&rule("(width >= 50cqw)"), &ctx(Some(300.0), Some(100.0))), TriState::True);
        assert_eq!(evaluate(&rule("(width >= 80cqw)"), &ctx(Some(300.0), Some(100.0))), TriState::False);

        // cqmin maps to the smaller of the cqi/cqb scales (2 px per unit here)
        assert_eq!(evaluate(&rule("(width >= 100cqmin)"), &ctx(Some(300.0), Some(100.0))), TriState::True);
        assert_eq!(evaluate(&rule("(width >= 100cqmax)"), &ctx(Some(300.0), Some(100.0))), TriState::False);

        // absent scale collapses to unknown
        let mut no_scale = ctx(Some(300.0), Some(100.0));
        no_scale.tree_context.cqw = None;
        assert_eq!(evaluate(&rule("(width >= 50cqw)"), &no_scale), TriState::Unknown);
    }

    #[test]
    fn unknown_contagion() {
        // the referenced height is missing, so even an always-true-looking disjunction stays unknown
        let rule = rule("(width > 1px) or (height > 1px)");
        assert_eq!(evaluate(&rule, &ctx(Some(300.0), None)), TriState::Unknown);
    }

    #[test]
    fn vertical_writing_axis_swaps_logical_features() {
        let mut context = ctx(Some(300.0), Some(100.0));
        context.tree_context.writing_axis = WritingAxis::Vertical;

        assert_eq!(evaluate(&rule("(inline-size: 100px)"), &context), TriState::True);
        assert_eq!(evaluate(&rule("(block-size: 300px)"), &context), TriState::True);
    }

    #[test]
    fn zero_is_coercible_to_length() {
        assert_eq!(evaluate(&rule("(width > 0)"), &ctx(Some(300.0), Some(100.0))), TriState::True);
    }

    #[test]
    fn evaluator_monotonicity_over_range() {
        let rule = rule("(100px <= width <= 400px)");
        for w in [0.0f32, 50.0, 99.0, 100.0, 250.0, 400.0, 401.0, 1000.0] {
            let expected = if (100.0..=400.0).contains(&w) {
                TriState::True
            } else {
                TriState::False
            };
            assert_eq!(evaluate(&rule, &ctx(Some(w), Some(100.0))), expected, "width {w}");
        }
    }
}
