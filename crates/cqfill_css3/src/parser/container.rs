use crate::node::Node;
use crate::parser::condition::{parse_condition, CondNode};
use crate::parser::feature::parse_media_feature;
use crate::parser::NodeReader;
use crate::query::{ContainerRule, QueryExpr, QueryValue, SizeFeature};
use cqfill_shared::errors::{CssError, CssResult};
use lazy_static::lazy_static;
use std::collections::HashSet;

/// Internal prefix that keeps CSS-wide keywords inert when they are re-serialized as
/// custom-property values
pub const CSS_WIDE_SENTINEL_PREFIX: &str = "cq-";

lazy_static! {
    /// Keywords that can never be a container name
    static ref RESERVED_CONTAINER_NAMES: HashSet<&'static str> =
        HashSet::from(["none", "and", "not", "or", "normal", "auto", "default"]);
    static ref CSS_WIDE_KEYWORDS: HashSet<&'static str> =
        HashSet::from(["initial", "inherit", "unset", "revert", "revert-layer"]);
}

/// Parses an `@container` prelude: `[ident]? <condition>`.
///
/// The generic condition tree is lowered into the typed expression: every leaf is reinterpreted
/// as a feature block, and a leaf that fails reinterpretation becomes the unknown value. The set
/// of referenced size features is collected along the way.
pub fn parse_container_rule(nodes: &[Node]) -> CssResult<ContainerRule> {
    log::trace!("parse_container_rule");

    let mut reader = NodeReader::new(nodes);

    let mut name = None;
    if let Some(ident) = reader.lookahead_sc(0).and_then(Node::as_ident) {
        if !ident.eq_ignore_ascii_case("not") {
            let lower = ident.to_ascii_lowercase();
            if RESERVED_CONTAINER_NAMES.contains(lower.as_str()) || CSS_WIDE_KEYWORDS.contains(lower.as_str()) {
                return Err(CssError::new(
                    format!("'{ident}' cannot be used as a container name").as_str(),
                ));
            }
            name = Some(ident.to_string());
            reader.consume_sc();
        }
    }

    let generic = parse_condition(reader.rest())?;

    let mut features = HashSet::new();
    let condition = lower_condition(generic, &mut features);

    Ok(ContainerRule {
        name,
        condition,
        features,
    })
}

fn lower_condition(cond: CondNode, features: &mut HashSet<SizeFeature>) -> QueryExpr {
    match cond {
        CondNode::Not(child) => QueryExpr::Not(Box::new(lower_condition(*child, features))),
        CondNode::And(left, right) => QueryExpr::And(
            Box::new(lower_condition(*left, features)),
            Box::new(lower_condition(*right, features)),
        ),
        CondNode::Or(left, right) => QueryExpr::Or(
            Box::new(lower_condition(*left, features)),
            Box::new(lower_condition(*right, features)),
        ),
        CondNode::Leaf(node) => {
            if let Some((_, _, children)) = node.as_block() {
                if let Ok(expr) = parse_media_feature(children) {
                    collect_features(&expr, features);
                    return expr;
                }
            }
            // unparseable block or a function such as style(): forward-compatible unknown
            QueryExpr::Value(QueryValue::Unknown)
        }
    }
}

fn collect_features(expr: &QueryExpr, features: &mut HashSet<SizeFeature>) {
    match expr {
        QueryExpr::Not(child) => collect_features(child, features),
        QueryExpr::And(left, right) | QueryExpr::Or(left, right) => {
            collect_features(left, features);
            collect_features(right, features);
        }
        QueryExpr::Compare { left, right, .. } => {
            collect_features(left, features);
            collect_features(right, features);
        }
        QueryExpr::Feature(feature) => {
            features.insert(*feature);
        }
        QueryExpr::Value(_) => {}
    }
}

/// `container-name: <name>+ | none | <css-wide>`.
///
/// Produces the list of names; `none` and (for standalone declarations) the CSS-wide keywords
/// come back as a single sentinel carrying the internal prefix.
pub fn parse_container_name_property(nodes: &[Node], standalone: bool) -> CssResult<Vec<String>> {
    log::trace!("parse_container_name_property");

    let mut reader = NodeReader::new(nodes);
    let mut names = Vec::new();

    while let Some(node) = reader.lookahead_sc(0) {
        let Some(ident) = node.as_ident() else {
            return Err(CssError::new("Expected identifier in container-name"));
        };
        reader.consume_sc();

        let lower = ident.to_ascii_lowercase();

        if lower == "none" || (standalone && CSS_WIDE_KEYWORDS.contains(lower.as_str())) {
            if !names.is_empty() || !reader.at_end() {
                return Err(CssError::new(
                    format!("'{lower}' must be the only container-name value").as_str(),
                ));
            }
            return Ok(vec![format!("{CSS_WIDE_SENTINEL_PREFIX}{lower}")]);
        }

        if RESERVED_CONTAINER_NAMES.contains(lower.as_str()) || CSS_WIDE_KEYWORDS.contains(lower.as_str()) {
            return Err(CssError::new(
                format!("'{ident}' cannot be used as a container name").as_str(),
            ));
        }

        names.push(ident.to_string());
    }

    if names.is_empty() && standalone {
        return Err(CssError::new("Expected at least one container name"));
    }

    Ok(names)
}

/// `container-type: size | inline-size | normal | <css-wide>`
pub fn parse_container_type_property(nodes: &[Node], standalone: bool) -> CssResult<Vec<String>> {
    log::trace!("parse_container_type_property");

    let mut reader = NodeReader::new(nodes);
    let mut types = Vec::new();

    while let Some(node) = reader.lookahead_sc(0) {
        let Some(ident) = node.as_ident() else {
            return Err(CssError::new("Expected identifier in container-type"));
        };
        reader.consume_sc();

        let lower = ident.to_ascii_lowercase();

        if standalone && CSS_WIDE_KEYWORDS.contains(lower.as_str()) {
            if !types.is_empty() || !reader.at_end() {
                return Err(CssError::new(
                    format!("'{lower}' must be the only container-type value").as_str(),
                ));
            }
            return Ok(vec![format!("{CSS_WIDE_SENTINEL_PREFIX}{lower}")]);
        }

        if !matches!(lower.as_str(), "size" | "inline-size" | "normal") {
            return Err(CssError::new(
                format!("'{ident}' is not a valid container-type").as_str(),
            ));
        }

        types.push(lower);
    }

    if types.is_empty() && standalone {
        return Err(CssError::new("Expected at least one container type"));
    }

    Ok(types)
}

/// `container: <name-list> [ '/' <type-list> ]?` — either side may be empty after the slash
pub fn parse_container_shorthand(nodes: &[Node]) -> CssResult<(Vec<String>, Vec<String>)> {
    log::trace!("parse_container_shorthand");

    let slash = nodes.iter().position(|n| n.is_delim('/'));

    let (name_nodes, type_nodes) = match slash {
        Some(i) => (&nodes[..i], &nodes[i + 1..]),
        None => (nodes, &nodes[nodes.len()..]),
    };

    let names = parse_container_name_property(name_nodes, false)?;
    let types = parse_container_type_property(type_nodes, false)?;

    if names.is_empty() && types.is_empty() {
        return Err(CssError::new("Expected container shorthand value"));
    }

    Ok((names, types))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser_config::ParserConfig;
    use crate::query::ComparisonOp;
    use crate::CssParser;

    fn prelude(input: &str) -> Vec<Node> {
        let css = format!("@container {input} {{}}");
        let sheet = CssParser::parse_str(&css, ParserConfig::default()).unwrap();
        let children = sheet.as_stylesheet().unwrap();
        let crate::node::NodeType::AtRule { prelude, .. } = &*children[0].node_type else {
            panic!("expected at-rule");
        };
        prelude.clone()
    }

    fn value_nodes(input: &str) -> Vec<Node> {
        let css = format!("a {{ x: {input}; }}");
        let sheet = CssParser::parse_str(&css, ParserConfig::default()).unwrap();
        let children = sheet.as_stylesheet().unwrap();
        let crate::node::NodeType::QualifiedRule { block, .. } = &*children[0].node_type else {
            panic!("expected rule");
        };
        let (_, _, decls) = block.as_block().unwrap();
        let (_, value, _) = decls[0].as_declaration().unwrap();
        value.to_vec()
    }

    #[test]
    fn named_rule_with_min_width() {
        let rule = parse_container_rule(&prelude("card (min-width: 200px)")).unwrap();
        assert_eq!(rule.name.as_deref(), Some("card"));
        assert!(rule.features.contains(&SizeFeature::Width));
        assert!(matches!(
            rule.condition,
            QueryExpr::Compare {
                op: ComparisonOp::Ge,
                ..
            }
        ));
    }

    #[test]
    fn reserved_names_are_rejected() {
        for name in ["none", "and", "not", "or", "normal", "auto", "inherit", "default"] {
            assert!(
                parse_container_rule(&prelude(&format!("{name} (width > 1px)"))).is_err(),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn anonymous_rule() {
        let rule = parse_container_rule(&prelude("(width > 100px)")).unwrap();
        assert_eq!(rule.name, None);
        assert_eq!(rule.features.len(), 1);
    }

    #[test]
    fn not_condition_keeps_feature_set() {
        let rule = parse_container_rule(&prelude("not (width)")).unwrap();
        assert!(matches!(rule.condition, QueryExpr::Not(_)));
        assert!(rule.features.contains(&SizeFeature::Width));
    }

    #[test]
    fn style_query_lowers_to_unknown() {
        let rule = parse_container_rule(&prelude("style(--foo: bar)")).unwrap();
        assert_eq!(rule.condition, QueryExpr::Value(QueryValue::Unknown));
        assert!(rule.features.is_empty());
    }

    #[test]
    fn unknown_feature_block_lowers_to_unknown() {
        let rule = parse_container_rule(&prelude("(resolution >= 2dppx)")).unwrap();
        assert_eq!(rule.condition, QueryExpr::Value(QueryValue::Unknown));
    }

    #[test]
    fn container_names() {
        assert_eq!(
            parse_container_name_property(&value_nodes("card sidebar"), true).unwrap(),
            vec!["card".to_string(), "sidebar".to_string()]
        );
        assert_eq!(
            parse_container_name_property(&value_nodes("none"), true).unwrap(),
            vec!["cq-none".to_string()]
        );
        assert_eq!(
            parse_container_name_property(&value_nodes("inherit"), true).unwrap(),
            vec!["cq-inherit".to_string()]
        );
        // css-wide keywords are not valid inside the shorthand
        assert!(parse_container_name_property(&value_nodes("inherit"), false).is_err());
        assert!(parse_container_name_property(&value_nodes("none card"), true).is_err());
        assert!(parse_container_name_property(&value_nodes("1px"), true).is_err());
    }

    #[test]
    fn container_types() {
        assert_eq!(
            parse_container_type_property(&value_nodes("size"), true).unwrap(),
            vec!["size".to_string()]
        );
        assert_eq!(
            parse_container_type_property(&value_nodes("inherit"), true).unwrap(),
            vec!["cq-inherit".to_string()]
        );
        assert!(parse_container_type_property(&value_nodes("fancy"), true).is_err());
    }

    #[test]
    fn shorthand_splits_on_slash() {
        let (names, types) = parse_container_shorthand(&value_nodes("card / size")).unwrap();
        assert_eq!(names, vec!["card".to_string()]);
        assert_eq!(types, vec!["size".to_string()]);

        let (names, types) = parse_container_shorthand(&value_nodes("card")).unwrap();
        assert_eq!(names, vec!["card".to_string()]);
        assert!(types.is_empty());

        let (names, types) = parse_container_shorthand(&value_nodes("/ inline-size")).unwrap();
        assert!(names.is_empty());
        assert_eq!(types, vec!["inline-size".to_string()]);

        assert!(parse_container_shorthand(&value_nodes("card / fancy")).is_err());
    }
}
