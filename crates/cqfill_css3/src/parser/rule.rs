use crate::node::{trim_whitespace, BlockDelim, BlockKind, Node, NodeType};
use crate::tokenizer::TokenType;
use crate::CssParser;
use cow_utils::CowUtils;
use cqfill_shared::errors::{CssError, CssResult};

impl CssParser<'_> {
    // Either the rule parsing succeeds as a whole, or not. When not a valid rule is found, we
    // return None if the config.ignore_errors is set to true, otherwise this will return an Err
    // and is handled by the caller
    pub fn parse_qualified_rule(&mut self) -> CssResult<Option<Node>> {
        log::trace!("parse_qualified_rule");

        let result = self.parse_qualified_rule_internal();
        if result.is_err() && self.config.ignore_errors {
            log::warn!("Ignoring error in parse_qualified_rule: {result:?}");
            self.parse_until_rule_end();
            return Ok(None);
        }

        result.map(Some)
    }

    fn parse_qualified_rule_internal(&mut self) -> CssResult<Node> {
        let loc = self.tokenizer.current_location();

        let mut prelude = Vec::new();

        loop {
            let t = self.tokenizer.lookahead(0);
            match t.token_type {
                TokenType::Eof => {
                    return Err(CssError::with_location(
                        "Unexpected end of stream in qualified rule prelude",
                        self.tokenizer.current_location(),
                    ));
                }
                TokenType::LCurly => break,
                _ => prelude.push(self.parse_component_value()?),
            }
        }

        let block = self.parse_brace_block(BlockKind::Style)?;

        Ok(Node::new(
            NodeType::QualifiedRule {
                prelude: trim_whitespace(&prelude).to_vec(),
                block,
            },
            loc,
        ))
    }

    // Either the at_rule parsing succeeds as a whole, or not. When not a valid at_rule is found,
    // we return None if the config.ignore_errors is set to true, otherwise this will return an
    // Err and is handled by the caller
    pub fn parse_at_rule(&mut self) -> CssResult<Option<Node>> {
        log::trace!("parse_at_rule");

        let result = self.parse_at_rule_internal();
        if result.is_err() && self.config.ignore_errors {
            log::warn!("Ignoring error in parse_at_rule: {result:?}");
            self.parse_until_rule_end();
            return Ok(None);
        }

        result.map(Some)
    }

    fn parse_at_rule_internal(&mut self) -> CssResult<Node> {
        let t = self.consume_any()?;
        let TokenType::AtKeyword(name) = t.token_type else {
            return Err(CssError::with_location("Expected at keyword", t.location));
        };

        let mut prelude = Vec::new();
        let mut block = None;

        loop {
            let next = self.tokenizer.lookahead(0);
            match next.token_type {
                TokenType::Semicolon => {
                    self.consume(TokenType::Semicolon)?;
                    break;
                }
                TokenType::Eof => break,
                TokenType::LCurly => {
                    block = Some(self.parse_at_rule_block(name.as_str())?);
                    break;
                }
                _ => prelude.push(self.parse_component_value()?),
            }
        }

        Ok(Node::new(
            NodeType::AtRule {
                name,
                prelude: trim_whitespace(&prelude).to_vec(),
                block,
            },
            t.location,
        ))
    }

    /// The at-rule name decides how its block is parsed: the conditional group rules nest more
    /// rules, the descriptor rules hold declarations, and anything unknown is preserved verbatim
    /// as a simple block.
    fn parse_at_rule_block(&mut self, name: &str) -> CssResult<Node> {
        log::trace!("parse_at_rule_block");

        if is_rule_list_at_rule(name) {
            return self.parse_brace_block(BlockKind::RuleList);
        }

        if is_declaration_list_at_rule(name) {
            return self.parse_brace_block(BlockKind::DeclarationList);
        }

        self.parse_component_value()
    }

    /// Parses a `{}` block whose contents are rules or declarations (not raw component values)
    pub(crate) fn parse_brace_block(&mut self, kind: BlockKind) -> CssResult<Node> {
        log::trace!("parse_brace_block with kind: {:?}", kind);

        let loc = self.tokenizer.current_location();

        self.consume(TokenType::LCurly)?;

        let children = match kind {
            BlockKind::RuleList => self.parse_rule_list(false)?,
            BlockKind::Style | BlockKind::DeclarationList => self.parse_declaration_list()?,
            BlockKind::Simple => {
                return Err(CssError::with_location(
                    "Simple blocks are parsed as component values",
                    loc,
                ));
            }
        };

        let t = self.consume_any()?;
        if t.token_type != TokenType::RCurly && t.token_type != TokenType::Eof {
            return Err(CssError::with_location(
                format!("Expected closing brace, got {:?}", t).as_str(),
                self.tokenizer.current_location(),
            ));
        }

        Ok(Node::new(NodeType::Block { delim: BlockDelim::Brace, kind, children }, loc))
    }

    /// Reads until the end of a declaration or rule (or end of the block), in case there is a
    /// syntax error. Skipping happens per component value so nested blocks are stepped over as a
    /// whole.
    pub(crate) fn parse_until_rule_end(&mut self) {
        loop {
            let t = self.tokenizer.lookahead(0);
            match t.token_type {
                TokenType::Semicolon => {
                    self.tokenizer.consume();
                    break;
                }
                TokenType::LCurly => {
                    let _ = self.parse_component_value();
                    break;
                }
                TokenType::RCurly => {
                    break;
                }
                TokenType::Eof => {
                    break;
                }
                _ => {
                    let _ = self.parse_component_value();
                }
            }
        }
    }
}

fn is_rule_list_at_rule(name: &str) -> bool {
    let name = name.cow_to_ascii_lowercase();
    matches!(name.as_ref(), "media" | "supports" | "container" | "layer") || name.ends_with("keyframes")
}

fn is_declaration_list_at_rule(name: &str) -> bool {
    let name = name.cow_to_ascii_lowercase();
    matches!(name.as_ref(), "font-face" | "page" | "counter-style" | "property")
}
