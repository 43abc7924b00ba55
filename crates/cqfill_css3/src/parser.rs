use crate::node::Node;
use crate::tokenizer::{Token, TokenType};
use crate::CssParser;
use cqfill_shared::errors::{CssError, CssResult};

mod condition;
pub mod container;
mod declaration;
mod feature;
mod rule;
mod stylesheet;
mod value;

impl CssParser<'_> {
    /// Consumes a specific token
    pub(crate) fn consume(&mut self, token_type: TokenType) -> CssResult<Token> {
        let t = self.tokenizer.consume();
        if t.token_type != token_type {
            return Err(CssError::with_location(
                format!("Expected {:?}, got {:?}", token_type, t).as_str(),
                self.tokenizer.current_location(),
            ));
        }

        Ok(t)
    }

    /// Consumes any token
    pub(crate) fn consume_any(&mut self) -> CssResult<Token> {
        Ok(self.tokenizer.consume())
    }

    pub(crate) fn consume_any_ident(&mut self) -> CssResult<String> {
        let t = self.tokenizer.consume();
        match t.token_type {
            TokenType::Ident(s) => Ok(s),
            _ => Err(CssError::with_location(
                format!("Expected ident, got {:?}", t).as_str(),
                self.tokenizer.current_location(),
            )),
        }
    }

    pub(crate) fn consume_whitespace(&mut self) {
        loop {
            let t = self.tokenizer.consume();
            if !t.is_whitespace() {
                self.tokenizer.reconsume();
                break;
            }
        }
    }
}

/// Cursor over a slice of already-parsed component values.
///
/// The condition, feature and container sub-grammars operate on rule preludes and declaration
/// values, which the block parser has already turned into nodes. This reader gives them the same
/// consume/lookahead vocabulary the token parser has.
pub(crate) struct NodeReader<'a> {
    nodes: &'a [Node],
    pos: usize,
}

impl<'a> NodeReader<'a> {
    pub(crate) fn new(nodes: &'a [Node]) -> Self {
        Self { nodes, pos: 0 }
    }

    /// The not-yet-consumed tail of the slice
    pub(crate) fn rest(&self) -> &'a [Node] {
        &self.nodes[self.pos.min(self.nodes.len())..]
    }

    /// Next node without consuming, not skipping whitespace
    pub(crate) fn peek_raw(&self) -> Option<&'a Node> {
        self.nodes.get(self.pos)
    }

    /// Looks ahead at the offset-th NON-WHITESPACE node
    pub(crate) fn lookahead_sc(&self, offset: usize) -> Option<&'a Node> {
        self.nodes[self.pos.min(self.nodes.len())..]
            .iter()
            .filter(|n| !n.is_whitespace())
            .nth(offset)
    }

    /// Consumes the next node, not skipping whitespace
    pub(crate) fn consume(&mut self) -> Option<&'a Node> {
        let node = self.nodes.get(self.pos)?;
        self.pos += 1;
        Some(node)
    }

    /// Consumes the next non-whitespace node
    pub(crate) fn consume_sc(&mut self) -> Option<&'a Node> {
        self.skip_whitespace();
        self.consume()
    }

    pub(crate) fn skip_whitespace(&mut self) {
        while self.nodes.get(self.pos).is_some_and(Node::is_whitespace) {
            self.pos += 1;
        }
    }

    /// True when only whitespace (or nothing) remains
    pub(crate) fn at_end(&self) -> bool {
        self.nodes[self.pos.min(self.nodes.len())..]
            .iter()
            .all(Node::is_whitespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::TokenType;

    fn nodes() -> Vec<Node> {
        vec![
            Node::synthesized(TokenType::Whitespace),
            Node::synthesized(TokenType::Ident("a".into())),
            Node::synthesized(TokenType::Whitespace),
            Node::synthesized(TokenType::Ident("b".into())),
            Node::synthesized(TokenType::Whitespace),
        ]
    }

    #[test]
    fn node_reader_skips_whitespace() {
        let nodes = nodes();
        let mut reader = NodeReader::new(&nodes);

        assert_eq!(reader.lookahead_sc(0).and_then(Node::as_ident), Some("a"));
        assert_eq!(reader.lookahead_sc(1).and_then(Node::as_ident), Some("b"));
        assert_eq!(reader.lookahead_sc(2), None);

        assert_eq!(reader.consume_sc().and_then(Node::as_ident), Some("a"));
        assert!(!reader.at_end());
        assert_eq!(reader.consume_sc().and_then(Node::as_ident), Some("b"));
        assert!(reader.at_end());
    }
}
