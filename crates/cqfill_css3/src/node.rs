use crate::tokenizer::{Token, TokenType};
use cqfill_shared::byte_stream::Location;

/// The bracket pair a block was opened with. Kept on the node so the serializer can re-emit the
/// correct pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockDelim {
    Brace,
    Paren,
    Bracket,
}

impl BlockDelim {
    #[must_use]
    pub fn open(self) -> char {
        match self {
            BlockDelim::Brace => '{',
            BlockDelim::Paren => '(',
            BlockDelim::Bracket => '[',
        }
    }

    #[must_use]
    pub fn close(self) -> char {
        match self {
            BlockDelim::Brace => '}',
            BlockDelim::Paren => ')',
            BlockDelim::Bracket => ']',
        }
    }
}

/// How the contents of a block were parsed.
///
/// A simple block holds raw component values; the other kinds hold rules and/or declarations and
/// determine whether declarations get a trailing semicolon when serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Simple,
    Style,
    DeclarationList,
    RuleList,
}

#[derive(Debug, PartialEq, Clone)]
pub enum NodeType {
    StyleSheet {
        children: Vec<Node>,
    },
    AtRule {
        name: String,
        prelude: Vec<Node>,
        block: Option<Node>,
    },
    QualifiedRule {
        prelude: Vec<Node>,
        block: Node,
    },
    Declaration {
        property: String,
        value: Vec<Node>,
        important: bool,
    },
    Block {
        delim: BlockDelim,
        kind: BlockKind,
        children: Vec<Node>,
    },
    Function {
        name: String,
        children: Vec<Node>,
    },
    /// A leaf component value, kept as the original token
    Token(Token),
}

/// A node is a single element in the parsed rule tree
#[derive(Debug, PartialEq, Clone)]
pub struct Node {
    pub node_type: Box<NodeType>,
    pub location: Location,
}

impl Node {
    #[must_use]
    pub fn new(node_type: NodeType, location: Location) -> Self {
        Self {
            node_type: Box::new(node_type),
            location,
        }
    }

    /// Wraps a token into a leaf node on the token's own location
    #[must_use]
    pub fn from_token(token: Token) -> Self {
        let location = token.location.clone();
        Self::new(NodeType::Token(token), location)
    }

    /// A leaf node for a freshly constructed token, used by the transformer when it splices
    /// generated CSS into the tree
    #[must_use]
    pub fn synthesized(token_type: TokenType) -> Self {
        Self::from_token(Token::new(token_type, Location::default()))
    }

    #[must_use]
    pub fn is_block(&self) -> bool {
        matches!(&*self.node_type, NodeType::Block { .. })
    }

    #[must_use]
    pub fn as_block(&self) -> Option<(BlockDelim, BlockKind, &[Node])> {
        match &*self.node_type {
            NodeType::Block { delim, kind, children } => Some((*delim, *kind, children)),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_stylesheet(&self) -> bool {
        matches!(&*self.node_type, NodeType::StyleSheet { .. })
    }

    #[must_use]
    pub fn as_stylesheet(&self) -> Option<&[Node]> {
        match &*self.node_type {
            NodeType::StyleSheet { children } => Some(children),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_at_rule(&self) -> bool {
        matches!(&*self.node_type, NodeType::AtRule { .. })
    }

    #[must_use]
    pub fn is_qualified_rule(&self) -> bool {
        matches!(&*self.node_type, NodeType::QualifiedRule { .. })
    }

    #[must_use]
    pub fn is_declaration(&self) -> bool {
        matches!(&*self.node_type, NodeType::Declaration { .. })
    }

    #[must_use]
    pub fn as_declaration(&self) -> Option<(&str, &[Node], bool)> {
        match &*self.node_type {
            NodeType::Declaration {
                property,
                value,
                important,
            } => Some((property, value, *important)),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_function(&self) -> bool {
        matches!(&*self.node_type, NodeType::Function { .. })
    }

    #[must_use]
    pub fn as_function(&self) -> Option<(&str, &[Node])> {
        match &*self.node_type {
            NodeType::Function { name, children } => Some((name, children)),
            _ => None,
        }
    }

    /// The wrapped token of a leaf node
    #[must_use]
    pub fn token(&self) -> Option<&Token> {
        match &*self.node_type {
            NodeType::Token(t) => Some(t),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_whitespace(&self) -> bool {
        matches!(&*self.node_type, NodeType::Token(t) if t.is_whitespace())
    }

    #[must_use]
    pub fn is_ident(&self) -> bool {
        matches!(&*self.node_type, NodeType::Token(t) if t.is_ident())
    }

    #[must_use]
    pub fn as_ident(&self) -> Option<&str> {
        match &*self.node_type {
            NodeType::Token(Token {
                token_type: TokenType::Ident(value),
                ..
            }) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_delim(&self, delim: char) -> bool {
        matches!(&*self.node_type, NodeType::Token(t) if t.is_delim(delim))
    }

    #[must_use]
    pub fn is_colon(&self) -> bool {
        matches!(&*self.node_type, NodeType::Token(t) if t.is_colon())
    }

    #[must_use]
    pub fn is_comma(&self) -> bool {
        matches!(&*self.node_type, NodeType::Token(t) if t.is_comma())
    }

    /// A paren block, the leaf shape a condition grammar interprets
    #[must_use]
    pub fn is_paren_block(&self) -> bool {
        matches!(
            &*self.node_type,
            NodeType::Block {
                delim: BlockDelim::Paren,
                ..
            }
        )
    }
}

/// Trims leading and trailing whitespace leaf nodes from a slice
#[must_use]
pub fn trim_whitespace(nodes: &[Node]) -> &[Node] {
    let start = nodes.iter().position(|n| !n.is_whitespace()).unwrap_or(nodes.len());
    let end = nodes.iter().rposition(|n| !n.is_whitespace()).map_or(start, |i| i + 1);
    &nodes[start..end]
}
