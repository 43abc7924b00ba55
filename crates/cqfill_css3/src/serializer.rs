use crate::node::{BlockKind, Node, NodeType};
use crate::tokenizer::{Token, TokenType};

/// Serializes a parse tree back to CSS text.
///
/// Identifiers are re-escaped where needed, numeric tokens keep their raw source text, blocks
/// re-emit their recorded bracket pair and whitespace tokens become a single space. Where comment
/// removal left two tokens that would coalesce on re-tokenization, an empty comment is inserted
/// (CSS Syntax §9), so serializing and re-tokenizing yields the original token stream.
#[must_use]
pub fn serialize(node: &Node) -> String {
    let mut serializer = Serializer::default();
    serializer.write_node(node);
    serializer.out
}

/// Serializes a sequence of component values, e.g. a selector prelude
#[must_use]
pub fn serialize_nodes(nodes: &[Node]) -> String {
    let mut serializer = Serializer::default();
    serializer.write_nodes(nodes);
    serializer.out
}

#[derive(Default)]
struct Serializer {
    out: String,
    /// The last token-like thing written, for the coalescence check
    last: Option<TokenType>,
}

impl Serializer {
    fn write_node(&mut self, node: &Node) {
        match &*node.node_type {
            NodeType::StyleSheet { children } => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        self.write_raw("\n");
                    }
                    self.write_node(child);
                }
            }
            NodeType::AtRule { name, prelude, block } => {
                self.pre_token(&TokenType::AtKeyword(String::new()));
                self.out.push('@');
                write_identifier(&mut self.out, name);
                self.last = Some(TokenType::AtKeyword(name.clone()));

                if !prelude.is_empty() {
                    self.write_raw(" ");
                    self.write_nodes(prelude);
                }

                match block {
                    Some(block) => {
                        self.write_raw(" ");
                        self.write_node(block);
                    }
                    None => self.write_raw(";"),
                }
            }
            NodeType::QualifiedRule { prelude, block } => {
                self.write_nodes(prelude);
                self.write_raw(" ");
                self.write_node(block);
            }
            NodeType::Declaration {
                property,
                value,
                important,
            } => {
                write_identifier(&mut self.out, property);
                self.write_raw(": ");
                self.write_nodes(value);
                if *important {
                    self.write_raw(" !important");
                }
            }
            NodeType::Block { delim, kind, children } => match kind {
                BlockKind::Simple => {
                    let open = delim.open();
                    self.pre_token(&open_token_type(open));
                    self.out.push(open);
                    self.last = None;
                    self.write_nodes(children);
                    self.write_raw_no_reset(delim.close());
                }
                BlockKind::Style | BlockKind::DeclarationList | BlockKind::RuleList => {
                    self.write_raw("{");
                    for child in children {
                        self.write_raw(" ");
                        self.write_node(child);
                        if child.is_declaration() {
                            self.write_raw(";");
                        }
                    }
                    self.write_raw(" }");
                }
            },
            NodeType::Function { name, children } => {
                self.pre_token(&TokenType::Function(String::new()));
                write_identifier(&mut self.out, name);
                self.out.push('(');
                self.last = None;
                self.write_nodes(children);
                self.write_raw_no_reset(')');
            }
            NodeType::Token(token) => self.write_token(token),
        }
    }

    fn write_nodes(&mut self, nodes: &[Node]) {
        for node in nodes {
            self.write_node(node);
        }
    }

    fn write_token(&mut self, token: &Token) {
        self.pre_token(&token.token_type);

        match &token.token_type {
            TokenType::Ident(value) => write_identifier(&mut self.out, value),
            TokenType::AtKeyword(value) => {
                self.out.push('@');
                write_identifier(&mut self.out, value);
            }
            TokenType::Hash(value) | TokenType::IDHash(value) => {
                self.out.push('#');
                write_identifier(&mut self.out, value);
            }
            TokenType::QuotedString(value) | TokenType::BadString(value) => {
                write_string(&mut self.out, value);
            }
            TokenType::Url(value) | TokenType::BadUrl(value) => {
                self.out.push_str("url(");
                write_url_value(&mut self.out, value);
                self.out.push(')');
            }
            TokenType::Function(name) => {
                // a lone function token (should not normally appear outside a function node)
                write_identifier(&mut self.out, name);
                self.out.push('(');
            }
            TokenType::Number { raw, .. } => self.out.push_str(raw),
            TokenType::Percentage { raw, .. } => {
                self.out.push_str(raw);
                self.out.push('%');
            }
            TokenType::Dimension { raw, unit, .. } => {
                self.out.push_str(raw);
                write_dimension_unit(&mut self.out, unit);
            }
            TokenType::Delim(c) => self.out.push(*c),
            TokenType::Whitespace => self.out.push(' '),
            TokenType::Colon => self.out.push(':'),
            TokenType::Semicolon => self.out.push(';'),
            TokenType::Comma => self.out.push(','),
            TokenType::LCurly => self.out.push('{'),
            TokenType::RCurly => self.out.push('}'),
            TokenType::LParen => self.out.push('('),
            TokenType::RParen => self.out.push(')'),
            TokenType::LBracket => self.out.push('['),
            TokenType::RBracket => self.out.push(']'),
            TokenType::Cdo => self.out.push_str("<!--"),
            TokenType::Cdc => self.out.push_str("-->"),
            TokenType::Eof => {}
        }

        self.last = Some(token.token_type.clone());
    }

    /// Inserts an empty comment when the previous and the upcoming token would otherwise merge
    fn pre_token(&mut self, next: &TokenType) {
        if let Some(prev) = &self.last {
            if needs_separator(prev, next) {
                self.out.push_str("/**/");
            }
        }
    }

    /// Structural text; anything written this way cannot coalesce with a following token
    fn write_raw(&mut self, s: &str) {
        self.out.push_str(s);
        self.last = None;
    }

    /// A closing bracket: safe on the left of any token, but remembered so `)` is never glued
    /// onto structural text decisions
    fn write_raw_no_reset(&mut self, c: char) {
        self.out.push(c);
        self.last = match c {
            ')' => Some(TokenType::RParen),
            ']' => Some(TokenType::RBracket),
            _ => Some(TokenType::RCurly),
        };
    }
}

fn open_token_type(open: char) -> TokenType {
    match open {
        '(' => TokenType::LParen,
        '[' => TokenType::LBracket,
        _ => TokenType::LCurly,
    }
}

/// CSS Syntax §9: the token pairs whose concatenation would re-tokenize differently
fn needs_separator(prev: &TokenType, next: &TokenType) -> bool {
    use TokenType::{AtKeyword, Cdc, Delim, Dimension, Function, Hash, IDHash, Ident, LParen, Number, Percentage, Url};

    let next_identish = matches!(next, Ident(_) | Function(_) | Url(_) | TokenType::BadUrl(_));
    let next_numberish = matches!(next, Number { .. } | Percentage { .. } | Dimension { .. });
    let next_delim = |c: char| matches!(next, Delim(d) if *d == c);

    match prev {
        Ident(_) => next_identish || next_numberish || matches!(next, Cdc | LParen) || next_delim('-'),
        AtKeyword(_) | Hash(_) | IDHash(_) | Dimension { .. } => {
            next_identish || next_numberish || matches!(next, Cdc) || next_delim('-')
        }
        Number { .. } => next_identish || next_numberish || next_delim('-') || next_delim('%'),
        Delim('#') | Delim('-') => next_identish || next_numberish || next_delim('-'),
        Delim('@') => next_identish || matches!(next, Cdc) || next_delim('-'),
        Delim('.') | Delim('+') => next_numberish,
        Delim('/') => next_delim('*'),
        _ => false,
    }
}

/// CSS Syntax §9: serialize an identifier, escaping what the tokenizer unescaped
fn write_identifier(out: &mut String, value: &str) {
    let chars: Vec<char> = value.chars().collect();

    if chars.as_slice() == ['-'] {
        out.push_str("\\-");
        return;
    }

    for (i, &c) in chars.iter().enumerate() {
        let first = i == 0;
        let second_after_dash = i == 1 && chars[0] == '-';

        if c.is_ascii_digit() && (first || second_after_dash) {
            write_hex_escape(out, c);
        } else if c.is_control() {
            write_hex_escape(out, c);
        } else if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }
}

/// A unit whose first code point is `e`/`E` followed by a digit would merge with the numeric
/// part into an exponent, so that one code point gets escaped
fn write_dimension_unit(out: &mut String, unit: &str) {
    let mut chars = unit.chars();
    if let (Some(first), Some(second)) = (chars.next(), chars.next()) {
        if (first == 'e' || first == 'E') && (second.is_ascii_digit() || second == '-') {
            write_hex_escape(out, first);
            out.push_str(&unit[first.len_utf8()..]);
            return;
        }
    }

    write_identifier(out, unit);
}

fn write_hex_escape(out: &mut String, c: char) {
    out.push('\\');
    out.push_str(&format!("{:x} ", c as u32));
}

fn write_string(out: &mut String, value: &str) {
    out.push('"');
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => write_hex_escape(out, c),
            c => out.push(c),
        }
    }
    out.push('"');
}

fn write_url_value(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '"' | '\'' | '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_whitespace() || c.is_control() => write_hex_escape(out, c),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser_config::ParserConfig;
    use crate::CssParser;

    fn roundtrip(input: &str) -> String {
        let sheet = CssParser::parse_str(input, ParserConfig::default()).unwrap();
        serialize(&sheet)
    }

    #[test]
    fn basic_rule() {
        assert_eq!(roundtrip("a{color:red}"), "a { color: red; }");
    }

    #[test]
    fn at_rule_with_and_without_block() {
        assert_eq!(roundtrip("@layer base;"), "@layer base;");
        assert_eq!(roundtrip("@media all {}"), "@media all { }");
    }

    #[test]
    fn important_and_whitespace_collapse() {
        assert_eq!(
            roundtrip("a  {  color :  red   !  important ; }"),
            "a { color: red !important; }"
        );
    }

    #[test]
    fn preserves_raw_numeric_text() {
        assert_eq!(roundtrip("a{width:3.0px;top:.5em}"), "a { width: 3.0px; top: .5em; }");
    }

    #[test]
    fn brackets_stay_balanced() {
        assert_eq!(
            roundtrip("a{grid:[start] 1fr}"),
            "a { grid: [start] 1fr; }"
        );
    }

    #[test]
    fn comment_removal_keeps_token_boundaries() {
        assert_eq!(roundtrip("a{font:x/**/y}"), "a { font: x/**/y; }");
        assert_eq!(roundtrip("a{width:3/**/px}"), "a { width: 3/**/px; }");
    }

    #[test]
    fn comments_between_separate_tokens_vanish() {
        assert_eq!(roundtrip("a/* gone */{color:/* gone */red}"), "a { color: red; }");
    }

    #[test]
    fn string_escaping() {
        assert_eq!(roundtrip("a{content:\"x \\\" y\"}"), "a { content: \"x \\\" y\"; }");
    }

    #[test]
    fn escaped_identifier_is_re_escaped() {
        // `\26` unescapes to `&`, which cannot stand bare in an identifier
        assert_eq!(roundtrip("a{x:f\\26 n}"), "a { x: f\\&n; }");
    }

    #[test]
    fn url_token() {
        assert_eq!(
            roundtrip("a{background:url(https://cqfill.dev/x.png)}"),
            "a { background: url(https://cqfill.dev/x.png); }"
        );
    }

    #[test]
    fn serialization_is_a_fixpoint() {
        let inputs = [
            "a{color:red}",
            "@media (min-width:100px){.a::before{content:\"x\"}}",
            "@container card (100px < width <= 400px){.a{width:50cqw}}",
            "a{font:x/**/y}",
        ];

        for input in inputs {
            let once = roundtrip(input);
            let twice = roundtrip(&once);
            assert_eq!(once, twice, "serialization not stable for {input}");
        }
    }
}
