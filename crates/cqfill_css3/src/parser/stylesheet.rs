use crate::node::{Node, NodeType};
use crate::tokenizer::TokenType;
use crate::CssParser;
use cqfill_shared::errors::CssResult;

impl CssParser<'_> {
    pub fn parse_stylesheet(&mut self) -> CssResult<Node> {
        log::trace!("parse_stylesheet");

        let loc = self.tokenizer.current_location();

        let children = self.parse_rule_list(true)?;

        Ok(Node::new(NodeType::StyleSheet { children }, loc))
    }

    /// 5.4.1. [Consume a list of rules](https://www.w3.org/TR/css-syntax-3/#consume-list-of-rules)
    ///
    /// In top-level mode CDO and CDC tokens are discarded; nested mode stops at the closing brace
    /// of the enclosing block.
    pub(crate) fn parse_rule_list(&mut self, top_level: bool) -> CssResult<Vec<Node>> {
        log::trace!("parse_rule_list");

        let mut children = Vec::new();

        loop {
            let t = self.consume_any()?;
            match t.token_type {
                TokenType::Eof => break,
                TokenType::Whitespace => {}
                TokenType::Cdo | TokenType::Cdc if top_level => {
                    // legacy SGML comment markers, dropped at the top level
                }
                TokenType::RCurly => {
                    if !top_level {
                        self.tokenizer.reconsume();
                        break;
                    }
                    log::warn!("Unexpected }} at top level");
                }
                TokenType::AtKeyword(_) => {
                    self.tokenizer.reconsume();

                    if let Some(at_rule_node) = self.parse_at_rule()? {
                        children.push(at_rule_node);
                    }
                }
                _ => {
                    self.tokenizer.reconsume();

                    if let Some(rule_node) = self.parse_qualified_rule()? {
                        children.push(rule_node);
                    }
                }
            }
        }

        Ok(children)
    }
}
