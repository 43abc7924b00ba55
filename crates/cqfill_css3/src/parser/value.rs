use crate::node::{BlockDelim, BlockKind, Node, NodeType};
use crate::tokenizer::TokenType;
use crate::CssParser;
use cqfill_shared::errors::{CssError, CssResult};

impl CssParser<'_> {
    /// 5.4.7. [Consume a component value](https://www.w3.org/TR/css-syntax-3/#consume-component-value)
    pub fn parse_component_value(&mut self) -> CssResult<Node> {
        let t = self.consume_any()?;
        match t.token_type {
            TokenType::LCurly => self.parse_simple_block(BlockDelim::Brace, t.location),
            TokenType::LParen => self.parse_simple_block(BlockDelim::Paren, t.location),
            TokenType::LBracket => self.parse_simple_block(BlockDelim::Bracket, t.location),
            TokenType::Function(name) => self.parse_function(name, t.location),
            TokenType::Eof => Err(CssError::with_location(
                "Unexpected end of stream",
                self.tokenizer.current_location(),
            )),
            _ => Ok(Node::from_token(t)),
        }
    }

    /// 5.4.8. [Consume a simple block](https://www.w3.org/TR/css-syntax-3/#consume-simple-block)
    ///
    /// The opening token has already been consumed. An unclosed block ends at EOF; the recorded
    /// opening delimiter still serializes as a balanced pair.
    fn parse_simple_block(
        &mut self,
        delim: BlockDelim,
        loc: cqfill_shared::byte_stream::Location,
    ) -> CssResult<Node> {
        let close = match delim {
            BlockDelim::Brace => TokenType::RCurly,
            BlockDelim::Paren => TokenType::RParen,
            BlockDelim::Bracket => TokenType::RBracket,
        };

        let mut children = Vec::new();

        loop {
            let t = self.tokenizer.lookahead(0);
            if t.token_type == close {
                self.consume(close.clone())?;
                break;
            }
            if t.token_type == TokenType::Eof {
                log::warn!("Unclosed block at {:?}", loc);
                break;
            }

            children.push(self.parse_component_value()?);
        }

        Ok(Node::new(
            NodeType::Block {
                delim,
                kind: BlockKind::Simple,
                children,
            },
            loc,
        ))
    }

    /// 5.4.9. [Consume a function](https://www.w3.org/TR/css-syntax-3/#consume-function)
    fn parse_function(&mut self, name: String, loc: cqfill_shared::byte_stream::Location) -> CssResult<Node> {
        let mut children = Vec::new();

        loop {
            let t = self.tokenizer.lookahead(0);
            match t.token_type {
                TokenType::RParen => {
                    self.consume(TokenType::RParen)?;
                    break;
                }
                TokenType::Eof => {
                    log::warn!("Unclosed function at {:?}", loc);
                    break;
                }
                _ => children.push(self.parse_component_value()?),
            }
        }

        Ok(Node::new(NodeType::Function { name, children }, loc))
    }
}

#[cfg(test)]
mod tests {
    use crate::parser_config::ParserConfig;
    use crate::walker::Walker;
    use crate::CssParser;

    macro_rules! test {
        ($input:expr, $expected:expr) => {
            let result = CssParser::parse_str($input, ParserConfig::default()).unwrap();

            let w = Walker::new(&result);
            assert_eq!(w.walk_to_string(), $expected);
        };
    }

    #[test]
    fn nested_blocks_stay_balanced() {
        test!(
            "a { grid: [start] 1fr; }",
            "[StyleSheet (1)]\n  [QualifiedRule]\n    [Token] a\n    [Block] Style\n      [Declaration] property: grid important: false\n        [Block] Simple\n          [Token] start\n        [Token]  \n        [Token] 1fr\n"
        );
    }

    #[test]
    fn unclosed_function_ends_at_eof() {
        test!(
            "a { width: calc(1px",
            "[StyleSheet (1)]\n  [QualifiedRule]\n    [Token] a\n    [Block] Style\n      [Declaration] property: width important: false\n        [Function] name: calc\n          [Token] 1px\n"
        );
    }
}
