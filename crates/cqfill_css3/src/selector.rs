use crate::node::{trim_whitespace, Node};

/// Single-colon pseudo-elements kept for historical reasons; everything else needs `::`
const LEGACY_PSEUDO_ELEMENTS: &[&str] = &["before", "after", "first-line", "first-letter"];

/// Splits a selector prelude on its top-level commas. Blocks and functions were already parsed
/// into single nodes, so any comma seen here really separates selectors.
pub(crate) fn split_selector_list(nodes: &[Node]) -> Vec<Vec<Node>> {
    let mut selectors = Vec::new();
    let mut current = Vec::new();

    for node in nodes {
        if node.is_comma() {
            selectors.push(std::mem::take(&mut current));
        } else {
            current.push(node.clone());
        }
    }
    selectors.push(current);

    selectors
        .into_iter()
        .map(|s| trim_whitespace(&s).to_vec())
        .collect()
}

/// Partitions one selector into a non-pseudo-element prefix and an optional pseudo-element
/// suffix. `::anything` starts the suffix, as do the single-colon historical pseudo-elements.
pub(crate) fn partition_selector(nodes: &[Node]) -> (Vec<Node>, Vec<Node>) {
    let split = pseudo_element_start(nodes).unwrap_or(nodes.len());

    let prefix = trim_whitespace(&nodes[..split]).to_vec();
    let suffix = nodes[split..].to_vec();

    (prefix, suffix)
}

fn pseudo_element_start(nodes: &[Node]) -> Option<usize> {
    for (i, node) in nodes.iter().enumerate() {
        if !node.is_colon() {
            continue;
        }

        match nodes.get(i + 1) {
            Some(next) if next.is_colon() => return Some(i),
            Some(next) => {
                if next
                    .as_ident()
                    .is_some_and(|s| LEGACY_PSEUDO_ELEMENTS.iter().any(|p| s.eq_ignore_ascii_case(p)))
                {
                    return Some(i);
                }
            }
            None => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser_config::ParserConfig;
    use crate::serializer::serialize_nodes;
    use crate::CssParser;

    fn prelude(selector: &str) -> Vec<Node> {
        let css = format!("{selector} {{ }}");
        let sheet = CssParser::parse_str(&css, ParserConfig::default()).unwrap();
        let children = sheet.as_stylesheet().unwrap();
        let crate::node::NodeType::QualifiedRule { prelude, .. } = &*children[0].node_type else {
            panic!("expected rule");
        };
        prelude.clone()
    }

    fn partition_strings(selector: &str) -> (String, String) {
        let (prefix, suffix) = partition_selector(&prelude(selector));
        (serialize_nodes(&prefix), serialize_nodes(&suffix))
    }

    #[test]
    fn split_on_top_level_commas_only() {
        let parts = split_selector_list(&prelude(".a, .b:is(i, b), .c"));
        assert_eq!(parts.len(), 3);
        assert_eq!(serialize_nodes(&parts[0]), ".a");
        assert_eq!(serialize_nodes(&parts[1]), ".b:is(i, b)");
        assert_eq!(serialize_nodes(&parts[2]), ".c");
    }

    #[test]
    fn double_colon_starts_the_suffix() {
        let (prefix, suffix) = partition_strings(".a::before");
        assert_eq!(prefix, ".a");
        assert_eq!(suffix, "::before");
    }

    #[test]
    fn legacy_single_colon_pseudo_elements() {
        let (prefix, suffix) = partition_strings("div:first-line");
        assert_eq!(prefix, "div");
        assert_eq!(suffix, ":first-line");
    }

    #[test]
    fn pseudo_classes_stay_in_the_prefix() {
        let (prefix, suffix) = partition_strings("a:hover");
        assert_eq!(prefix, "a:hover");
        assert_eq!(suffix, "");
    }

    #[test]
    fn bare_pseudo_element_has_empty_prefix() {
        let (prefix, suffix) = partition_strings("::before");
        assert!(prefix.is_empty());
        assert_eq!(suffix, "::before");
    }
}
