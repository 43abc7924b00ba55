use crate::node::{trim_whitespace, Node, NodeType};
use crate::tokenizer::TokenType;
use crate::CssParser;
use cqfill_shared::errors::{CssError, CssResult};

impl CssParser<'_> {
    /// 5.4.4. [Consume a list of declarations](https://www.w3.org/TR/css-syntax-3/#consume-list-of-declarations)
    ///
    /// Also used for style block contents; nested at-rules are allowed in both.
    pub(crate) fn parse_declaration_list(&mut self) -> CssResult<Vec<Node>> {
        log::trace!("parse_declaration_list");

        let mut children = Vec::new();

        loop {
            let t = self.consume_any()?;
            match t.token_type {
                TokenType::Eof => break,
                TokenType::RCurly => {
                    self.tokenizer.reconsume();
                    break;
                }
                TokenType::Whitespace | TokenType::Semicolon => {
                    // just eat the token
                }
                TokenType::AtKeyword(_) => {
                    self.tokenizer.reconsume();

                    if let Some(at_rule_node) = self.parse_at_rule()? {
                        children.push(at_rule_node);
                    }
                }
                _ => {
                    self.tokenizer.reconsume();

                    if let Some(declaration_node) = self.parse_declaration()? {
                        children.push(declaration_node);
                    }
                }
            }
        }

        Ok(children)
    }

    pub fn parse_declaration(&mut self) -> CssResult<Option<Node>> {
        log::trace!("parse_declaration");

        let result = self.parse_declaration_internal();
        if result.is_err() && self.config.ignore_errors {
            log::warn!("Ignoring error in parse_declaration: {result:?}");
            self.parse_until_declaration_end();
            return Ok(None);
        }

        result.map(Some)
    }

    fn parse_declaration_internal(&mut self) -> CssResult<Node> {
        let loc = self.tokenizer.current_location();

        let property = self.consume_any_ident()?;
        let custom_property = property.starts_with("--");

        self.consume_whitespace();
        self.consume(TokenType::Colon)?;

        let mut value = Vec::new();

        loop {
            let t = self.tokenizer.lookahead(0);
            match t.token_type {
                TokenType::Semicolon => {
                    self.consume(TokenType::Semicolon)?;
                    break;
                }
                TokenType::RCurly | TokenType::Eof => break,
                _ => value.push(self.parse_component_value()?),
            }
        }

        let mut value = trim_whitespace(&value).to_vec();
        let important = detach_important(&mut value);

        if value.is_empty() && !custom_property {
            return Err(CssError::with_location(
                "Expected value in declaration",
                self.tokenizer.current_location(),
            ));
        }

        Ok(Node::new(
            NodeType::Declaration {
                property,
                value,
                important,
            },
            loc,
        ))
    }

    /// Reads until the end of a declaration (or end of the block), in case there is a syntax error
    fn parse_until_declaration_end(&mut self) {
        log::trace!(
            "parse_until_declaration_end, now at: {:?}",
            self.tokenizer.current_location()
        );

        loop {
            let t = self.tokenizer.lookahead(0);
            match t.token_type {
                TokenType::Semicolon => {
                    self.tokenizer.consume();
                    break;
                }
                TokenType::RCurly | TokenType::Eof => break,
                _ => {
                    let _ = self.parse_component_value();
                }
            }
        }
    }
}

/// Detects `!important` by inspecting the last two non-whitespace children of the value list.
/// When matched, both children (and any trailing whitespace) are removed.
fn detach_important(value: &mut Vec<Node>) -> bool {
    let non_ws: Vec<usize> = value
        .iter()
        .enumerate()
        .filter(|(_, n)| !n.is_whitespace())
        .map(|(i, _)| i)
        .collect();

    let [.., bang, keyword] = non_ws.as_slice() else {
        return false;
    };

    let is_important = value[*bang].is_delim('!')
        && value[*keyword]
            .as_ident()
            .is_some_and(|s| s.eq_ignore_ascii_case("important"));

    if !is_important {
        return false;
    }

    value.truncate(*bang);
    let trimmed = trim_whitespace(value).to_vec();
    *value = trimmed;

    true
}
