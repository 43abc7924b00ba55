use crate::node::{Node, NodeType};
use std::io::Write;

/// The walker is used to walk the parse tree and print it to stdout.
pub struct Walker<'a> {
    root: &'a Node,
}

impl<'a> Walker<'a> {
    #[must_use]
    pub fn new(root: &'a Node) -> Self {
        Self { root }
    }

    pub fn walk_stdout(&self) {
        let _ = inner_walk(self.root, 0, &mut std::io::stdout());
    }

    #[must_use]
    pub fn walk_to_string(&self) -> String {
        let mut output: Vec<u8> = Vec::new();

        let _ = inner_walk(self.root, 0, &mut output);

        String::from_utf8_lossy(&output).into_owned()
    }
}

fn inner_walk(node: &Node, depth: usize, f: &mut dyn Write) -> Result<(), std::io::Error> {
    let prefix = " ".repeat(depth * 2);

    match &*node.node_type {
        NodeType::StyleSheet { children } => {
            writeln!(f, "{}[StyleSheet ({})]", prefix, children.len())?;
            for child in children {
                inner_walk(child, depth + 1, f)?;
            }
        }
        NodeType::AtRule { name, prelude, block } => {
            writeln!(f, "{prefix}[AtRule] name: {name}")?;
            for child in prelude {
                inner_walk(child, depth + 1, f)?;
            }
            if let Some(block) = block {
                inner_walk(block, depth + 1, f)?;
            }
        }
        NodeType::QualifiedRule { prelude, block } => {
            writeln!(f, "{prefix}[QualifiedRule]")?;
            for child in prelude {
                inner_walk(child, depth + 1, f)?;
            }
            inner_walk(block, depth + 1, f)?;
        }
        NodeType::Declaration {
            property,
            value,
            important,
        } => {
            writeln!(f, "{prefix}[Declaration] property: {property} important: {important}")?;
            for child in value {
                inner_walk(child, depth + 1, f)?;
            }
        }
        NodeType::Block { kind, children, .. } => {
            writeln!(f, "{prefix}[Block] {kind:?}")?;
            for child in children {
                inner_walk(child, depth + 1, f)?;
            }
        }
        NodeType::Function { name, children } => {
            writeln!(f, "{prefix}[Function] name: {name}")?;
            for child in children {
                inner_walk(child, depth + 1, f)?;
            }
        }
        NodeType::Token(token) => {
            writeln!(f, "{prefix}[Token] {token}")?;
        }
    }

    Ok(())
}
