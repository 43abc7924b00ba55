use crate::node::Node;
use crate::parser::NodeReader;
use cqfill_shared::errors::{CssError, CssResult};

/// Generic `<condition>` tree, prior to feature interpretation.
///
/// Leaves stay uninterpreted: a parenthesized block that did not re-parse as a nested condition,
/// or a function node. The container-rule parser later reinterprets each leaf as a feature block
/// and lowers anything it cannot interpret to the unknown value.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CondNode {
    Not(Box<CondNode>),
    And(Box<CondNode>, Box<CondNode>),
    Or(Box<CondNode>, Box<CondNode>),
    Leaf(Node),
}

/// Parses `<condition> = <not> | <in-parens> [ (<and> <in-parens>)* | (<or> <in-parens>)* ]`.
///
/// Mixing `and` and `or` at the same level is a parse error.
pub(crate) fn parse_condition(nodes: &[Node]) -> CssResult<CondNode> {
    log::trace!("parse_condition");

    let mut reader = NodeReader::new(nodes);
    let condition = parse_condition_inner(&mut reader)?;

    if !reader.at_end() {
        return Err(CssError::new("Unexpected trailing input after condition"));
    }

    Ok(condition)
}

fn parse_condition_inner(reader: &mut NodeReader) -> CssResult<CondNode> {
    if ident_at(reader, "not") {
        reader.consume_sc();
        let child = parse_in_parens(reader)?;
        return Ok(CondNode::Not(Box::new(child)));
    }

    let mut left = parse_in_parens(reader)?;
    let mut combinator: Option<String> = None;

    loop {
        let Some(node) = reader.lookahead_sc(0) else {
            break;
        };
        let Some(ident) = node.as_ident() else {
            break;
        };

        let word = ident.to_ascii_lowercase();
        if word != "and" && word != "or" {
            break;
        }

        match &combinator {
            Some(prev) if *prev != word => {
                return Err(CssError::new("Cannot mix 'and' and 'or' in one condition"));
            }
            _ => combinator = Some(word.clone()),
        }

        reader.consume_sc();
        let right = parse_in_parens(reader)?;

        left = if word == "and" {
            CondNode::And(Box::new(left), Box::new(right))
        } else {
            CondNode::Or(Box::new(left), Box::new(right))
        };
    }

    Ok(left)
}

/// `<in-parens>` is a parenthesized block or a function node. A block whose contents re-parse as
/// a condition is a grouping; anything else is kept as an uninterpreted leaf.
fn parse_in_parens(reader: &mut NodeReader) -> CssResult<CondNode> {
    let Some(node) = reader.consume_sc() else {
        return Err(CssError::new("Expected a parenthesized condition"));
    };

    if node.is_paren_block() {
        if let Some((_, _, children)) = node.as_block() {
            if let Ok(condition) = parse_condition(children) {
                return Ok(condition);
            }
        }
        return Ok(CondNode::Leaf(node.clone()));
    }

    if node.is_function() {
        return Ok(CondNode::Leaf(node.clone()));
    }

    Err(CssError::new("Expected a parenthesized condition or function"))
}

fn ident_at(reader: &NodeReader, word: &str) -> bool {
    reader
        .lookahead_sc(0)
        .and_then(Node::as_ident)
        .is_some_and(|s| s.eq_ignore_ascii_case(word))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser_config::ParserConfig;
    use crate::CssParser;

    fn condition_nodes(input: &str) -> Vec<Node> {
        // wrap into an at-rule prelude so the component-value parser does the tokenizing
        let css = format!("@container {input} {{}}");
        let sheet = CssParser::parse_str(&css, ParserConfig::default()).unwrap();
        let children = sheet.as_stylesheet().unwrap();
        match &*children[0].node_type {
            crate::node::NodeType::AtRule { prelude, .. } => prelude.clone(),
            _ => panic!("expected at-rule"),
        }
    }

    #[test]
    fn single_feature_block_is_a_leaf() {
        let nodes = condition_nodes("(min-width: 100px)");
        let cond = parse_condition(&nodes).unwrap();
        assert!(matches!(cond, CondNode::Leaf(_)));
    }

    #[test]
    fn not_and_grouping() {
        let nodes = condition_nodes("not ((width > 100px))");
        let cond = parse_condition(&nodes).unwrap();
        assert!(matches!(cond, CondNode::Not(inner) if matches!(*inner, CondNode::Leaf(_))));
    }

    #[test]
    fn and_chain_is_left_associative() {
        let nodes = condition_nodes("(width > 1px) and (width > 2px) and (width > 3px)");
        let cond = parse_condition(&nodes).unwrap();
        let CondNode::And(left, _) = cond else {
            panic!("expected and");
        };
        assert!(matches!(*left, CondNode::And(_, _)));
    }

    #[test]
    fn mixing_and_or_is_an_error() {
        let nodes = condition_nodes("(width > 1px) and (width > 2px) or (width > 3px)");
        assert!(parse_condition(&nodes).is_err());
    }

    #[test]
    fn function_leaf_is_kept() {
        let nodes = condition_nodes("style(--foo: bar)");
        let cond = parse_condition(&nodes).unwrap();
        assert!(matches!(cond, CondNode::Leaf(n) if n.is_function()));
    }

    #[test]
    fn bare_ident_is_an_error() {
        let nodes = condition_nodes("screen");
        assert!(parse_condition(&nodes).is_err());
    }
}
