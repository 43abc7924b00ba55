use crate::node::Node;
use crate::parser::NodeReader;
use crate::query::{ComparisonOp, Orientation, QueryExpr, QueryValue, SizeFeature};
use crate::tokenizer::TokenType;
use cqfill_shared::errors::{CssError, CssResult};

/// Units accepted in a container condition operand
const FEATURE_UNITS: &[&str] = &["px", "rem", "em", "cqw", "cqh", "cqi", "cqb", "cqmin", "cqmax"];

/// A single side of a range comparison: either the queried feature or a literal value
enum RangeTerm {
    Feature(SizeFeature),
    Value(QueryValue),
}

impl RangeTerm {
    fn into_expr(self) -> QueryExpr {
        match self {
            RangeTerm::Feature(f) => QueryExpr::Feature(f),
            RangeTerm::Value(v) => QueryExpr::Value(v),
        }
    }
}

/// Parses the contents of one `(…)` feature block: boolean form, plain form (with `min-`/`max-`
/// prefixes) or the single/double-sided range form.
pub(crate) fn parse_media_feature(nodes: &[Node]) -> CssResult<QueryExpr> {
    log::trace!("parse_media_feature");

    let mut reader = NodeReader::new(nodes);

    if let Some(ident) = reader.lookahead_sc(0).and_then(Node::as_ident) {
        let second = reader.lookahead_sc(1);

        if second.is_none() {
            // boolean form: `(width)`
            let feature = SizeFeature::from_name(&ident.to_ascii_lowercase())
                .ok_or_else(|| CssError::new(format!("Unknown size feature '{ident}'").as_str()))?;
            return Ok(QueryExpr::Feature(feature));
        }

        if second.is_some_and(|n| n.is_colon()) {
            return parse_plain_feature(&mut reader);
        }
    }

    parse_range_feature(&mut reader)
}

/// Plain form: `feature-ident : <value>`, where a `min-`/`max-` prefix turns into `>=`/`<=`
fn parse_plain_feature(reader: &mut NodeReader) -> CssResult<QueryExpr> {
    let Some(name) = reader.consume_sc().and_then(Node::as_ident) else {
        return Err(CssError::new("Expected feature name"));
    };
    reader.consume_sc(); // colon, checked by the caller

    let name = name.to_ascii_lowercase();
    let (op, bare_name) = if let Some(stripped) = name.strip_prefix("min-") {
        (ComparisonOp::Ge, stripped)
    } else if let Some(stripped) = name.strip_prefix("max-") {
        (ComparisonOp::Le, stripped)
    } else {
        (ComparisonOp::Eq, name.as_str())
    };

    let feature = SizeFeature::from_name(bare_name)
        .ok_or_else(|| CssError::new(format!("Unknown size feature '{bare_name}'").as_str()))?;

    if op != ComparisonOp::Eq && !feature.is_range() {
        return Err(CssError::new(
            format!("Feature '{bare_name}' does not accept a min-/max- prefix").as_str(),
        ));
    }

    let value = parse_feature_value(reader)?;

    if !reader.at_end() {
        return Err(CssError::new("Unexpected trailing input in feature block"));
    }

    Ok(QueryExpr::Compare {
        op,
        left: Box::new(QueryExpr::Feature(feature)),
        right: Box::new(QueryExpr::Value(value)),
    })
}

/// Range form: `term <op> term` or `value <op1> feature <op2> value`
fn parse_range_feature(reader: &mut NodeReader) -> CssResult<QueryExpr> {
    let first = parse_range_term(reader)?;
    let op1 = parse_comparison(reader)?;
    let second = parse_range_term(reader)?;

    if reader.at_end() {
        // single-sided: exactly one side names the feature
        let one_feature = matches!(
            (&first, &second),
            (RangeTerm::Feature(_), RangeTerm::Value(_)) | (RangeTerm::Value(_), RangeTerm::Feature(_))
        );
        if !one_feature {
            return Err(CssError::new("Range comparison needs a feature on exactly one side"));
        }

        return Ok(QueryExpr::Compare {
            op: op1,
            left: Box::new(first.into_expr()),
            right: Box::new(second.into_expr()),
        });
    }

    let op2 = parse_comparison(reader)?;
    let third = parse_range_term(reader)?;

    if !reader.at_end() {
        return Err(CssError::new("Unexpected trailing input in feature block"));
    }

    let (RangeTerm::Value(low), RangeTerm::Feature(feature), RangeTerm::Value(high)) = (first, second, third)
    else {
        return Err(CssError::new(
            "Double-sided range must be value, feature, value",
        ));
    };

    if !same_direction(op1, op2) {
        return Err(CssError::new(
            "Operators of a double-sided range must point the same way",
        ));
    }

    Ok(QueryExpr::And(
        Box::new(QueryExpr::Compare {
            op: op1,
            left: Box::new(QueryExpr::Value(low)),
            right: Box::new(QueryExpr::Feature(feature)),
        }),
        Box::new(QueryExpr::Compare {
            op: op2,
            left: Box::new(QueryExpr::Feature(feature)),
            right: Box::new(QueryExpr::Value(high)),
        }),
    ))
}

/// Both operators of a double-sided range must be less-ish or both greater-ish
fn same_direction(op1: ComparisonOp, op2: ComparisonOp) -> bool {
    let less = |op| matches!(op, ComparisonOp::Lt | ComparisonOp::Le);
    let greater = |op| matches!(op, ComparisonOp::Gt | ComparisonOp::Ge);

    (less(op1) && less(op2)) || (greater(op1) && greater(op2))
}

fn parse_range_term(reader: &mut NodeReader) -> CssResult<RangeTerm> {
    if let Some(ident) = reader.lookahead_sc(0).and_then(Node::as_ident) {
        let lower = ident.to_ascii_lowercase();
        if let Some(feature) = SizeFeature::from_name(&lower) {
            if !feature.is_range() {
                return Err(CssError::new(
                    format!("Feature '{lower}' cannot be used in a range").as_str(),
                ));
            }
            reader.consume_sc();
            return Ok(RangeTerm::Feature(feature));
        }
    }

    parse_feature_value(reader).map(RangeTerm::Value)
}

/// `<op> = '=' | '<' '='? | '>' '='?` — the optional `=` must follow immediately
fn parse_comparison(reader: &mut NodeReader) -> CssResult<ComparisonOp> {
    let Some(node) = reader.consume_sc() else {
        return Err(CssError::new("Expected comparison operator"));
    };

    if node.is_delim('=') {
        return Ok(ComparisonOp::Eq);
    }

    let less = node.is_delim('<');
    if !less && !node.is_delim('>') {
        return Err(CssError::new("Expected comparison operator"));
    }

    if reader.peek_raw().is_some_and(|n| n.is_delim('=')) {
        reader.consume();
        return Ok(if less { ComparisonOp::Le } else { ComparisonOp::Ge });
    }

    Ok(if less { ComparisonOp::Lt } else { ComparisonOp::Gt })
}

/// `<number>`, `<number> / <number>` (a ratio, stored as its quotient), a dimension with a known
/// unit, or an orientation keyword
fn parse_feature_value(reader: &mut NodeReader) -> CssResult<QueryValue> {
    let Some(node) = reader.consume_sc() else {
        return Err(CssError::new("Expected feature value"));
    };
    let Some(token) = node.token() else {
        return Err(CssError::new("Expected feature value"));
    };

    match &token.token_type {
        TokenType::Number { value, .. } => {
            if reader.lookahead_sc(0).is_some_and(|n| n.is_delim('/')) {
                reader.consume_sc();
                let denominator = reader.consume_sc().and_then(Node::token);
                let Some(TokenType::Number { value: d, .. }) = denominator.map(|t| &t.token_type) else {
                    return Err(CssError::new("Expected denominator in ratio"));
                };
                if *d == 0.0 {
                    return Ok(QueryValue::Unknown);
                }
                return Ok(QueryValue::Number(value / d));
            }
            Ok(QueryValue::Number(*value))
        }
        TokenType::Dimension { value, unit, .. } => {
            let unit = unit.to_ascii_lowercase();
            if !FEATURE_UNITS.contains(&unit.as_str()) {
                return Err(CssError::new(format!("Unknown unit '{unit}' in feature value").as_str()));
            }
            Ok(QueryValue::Dimension { value: *value, unit })
        }
        TokenType::Ident(word) => match word.to_ascii_lowercase().as_str() {
            "portrait" => Ok(QueryValue::Orientation(Orientation::Portrait)),
            "landscape" => Ok(QueryValue::Orientation(Orientation::Landscape)),
            _ => Err(CssError::new(format!("Unexpected keyword '{word}' in feature value").as_str())),
        },
        _ => Err(CssError::new("Expected feature value")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser_config::ParserConfig;
    use crate::CssParser;

    fn feature_nodes(input: &str) -> Vec<Node> {
        let css = format!("@container ({input}) {{}}");
        let sheet = CssParser::parse_str(&css, ParserConfig::default()).unwrap();
        let children = sheet.as_stylesheet().unwrap();
        let crate::node::NodeType::AtRule { prelude, .. } = &*children[0].node_type else {
            panic!("expected at-rule");
        };
        let (_, _, block_children) = prelude[0].as_block().unwrap();
        block_children.to_vec()
    }

    fn parse(input: &str) -> CssResult<QueryExpr> {
        parse_media_feature(&feature_nodes(input))
    }

    #[test]
    fn boolean_form() {
        assert_eq!(parse("width").unwrap(), QueryExpr::Feature(SizeFeature::Width));
        assert!(parse("resolution").is_err());
    }

    #[test]
    fn plain_form_with_prefixes() {
        let expr = parse("min-width: 200px").unwrap();
        assert_eq!(
            expr,
            QueryExpr::Compare {
                op: ComparisonOp::Ge,
                left: Box::new(QueryExpr::Feature(SizeFeature::Width)),
                right: Box::new(QueryExpr::Value(QueryValue::Dimension {
                    value: 200.0,
                    unit: "px".into()
                })),
            }
        );

        assert!(matches!(
            parse("max-height: 4em").unwrap(),
            QueryExpr::Compare { op: ComparisonOp::Le, .. }
        ));
        assert!(matches!(
            parse("orientation: portrait").unwrap(),
            QueryExpr::Compare { op: ComparisonOp::Eq, .. }
        ));
        assert!(parse("min-orientation: portrait").is_err());
    }

    #[test]
    fn ratio_value() {
        let expr = parse("aspect-ratio: 4/3").unwrap();
        let QueryExpr::Compare { right, .. } = expr else {
            panic!("expected compare");
        };
        let QueryExpr::Value(QueryValue::Number(r)) = *right else {
            panic!("expected number");
        };
        assert!((r - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn single_sided_range() {
        let expr = parse("width >= 10em").unwrap();
        assert!(matches!(
            expr,
            QueryExpr::Compare {
                op: ComparisonOp::Ge,
                ..
            }
        ));

        let flipped = parse("100px < width").unwrap();
        let QueryExpr::Compare { op, left, right } = flipped else {
            panic!("expected compare");
        };
        assert_eq!(op, ComparisonOp::Lt);
        assert!(matches!(*left, QueryExpr::Value(_)));
        assert!(matches!(*right, QueryExpr::Feature(SizeFeature::Width)));
    }

    #[test]
    fn double_sided_range() {
        let expr = parse("100px < width <= 400px").unwrap();
        let QueryExpr::And(low, high) = expr else {
            panic!("expected and");
        };
        assert!(matches!(
            *low,
            QueryExpr::Compare {
                op: ComparisonOp::Lt,
                ..
            }
        ));
        assert!(matches!(
            *high,
            QueryExpr::Compare {
                op: ComparisonOp::Le,
                ..
            }
        ));
    }

    #[test]
    fn mixed_direction_range_is_an_error() {
        assert!(parse("100px < width > 50px").is_err());
    }

    #[test]
    fn feature_on_both_sides_is_an_error() {
        assert!(parse("width < height").is_err());
    }

    #[test]
    fn unknown_unit_is_an_error() {
        assert!(parse("width >= 3vw").is_err());
    }

    #[test]
    fn zero_denominator_ratio_is_unknown() {
        let expr = parse("aspect-ratio: 1/0").unwrap();
        let QueryExpr::Compare { right, .. } = expr else {
            panic!("expected compare");
        };
        assert_eq!(*right, QueryExpr::Value(QueryValue::Unknown));
    }
}
