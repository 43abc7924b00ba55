use crate::node::{trim_whitespace, BlockDelim, BlockKind, Node, NodeType};
use crate::parser::container::{
    parse_container_name_property, parse_container_rule, parse_container_shorthand, parse_container_type_property,
};
use crate::parser_config::ParserConfig;
use crate::query::ContainerRule;
use crate::selector::{partition_selector, split_selector_list};
use crate::serializer::{serialize, serialize_nodes};
use crate::tokenizer::{Token, TokenType};
use crate::CssParser;
use cow_utils::CowUtils;
use cqfill_shared::byte_stream::Location;
use cqfill_shared::errors::{CssError, CssResult};
use itertools::Itertools;
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use url::Url;

/// The attribute the host applies to elements whose container queries are active. A descriptor's
/// uid is used verbatim as one of the attribute's space-separated words.
pub const SELF_ATTRIBUTE: &str = "data-cqs";

/// The class authors pre-attach through `:not(.container-query-polyfill)` so selectors can be
/// rewritten in environments without `:where()` support
pub const SENTINEL_CLASS: &str = "container-query-polyfill";

const CONTAINER_UNITS: &[&str] = &["cqw", "cqh", "cqi", "cqb", "cqmin", "cqmax"];

/// Problems the transformer worked around; collected on the result, never thrown
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TranspileWarning {
    #[error("selector `{0}` cannot be rewritten without :where() support; add a :not(.container-query-polyfill) sentinel")]
    MissingSentinel(String),
    #[error("could not resolve `{0}` against the base url")]
    UnresolvableUrl(String),
}

/// The transformer's handle for one `@container` rule, consumed by the host layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerQueryDescriptor {
    pub rule: ContainerRule,
    /// Opaque attribute-value word, unique within one transpilation run
    pub uid: String,
    /// Deduplicated, comma-separated composite of the element selectors under this rule
    pub selector: Option<String>,
    /// Index of the enclosing `@container` descriptor, for nested rule inheritance. The
    /// descriptors of one run form a forest stored flat in the result vector.
    pub parent: Option<usize>,
}

pub struct TranspileOptions {
    /// Base URL that `url()` references are rewritten against
    pub base_url: Option<String>,
    /// Per-run salt for internal custom properties and uids; random when absent
    pub salt: Option<String>,
    /// Whether the target environment understands `:where()`
    pub supports_where: bool,
}

impl Default for TranspileOptions {
    fn default() -> Self {
        Self {
            base_url: None,
            salt: None,
            supports_where: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranspileResult {
    pub source: String,
    pub descriptors: Vec<ContainerQueryDescriptor>,
    pub warnings: Vec<TranspileWarning>,
}

/// Rewrites `@container` rules and container declarations into plain CSS that a style engine
/// without native support can apply, guarded by host-managed element attributes.
///
/// One transpiler carries the per-run salt and the uid counter; uids stay unique across all
/// stylesheets it transpiles.
pub struct Transpiler {
    salt: String,
    next_uid: u32,
    base_url: Option<Url>,
    supports_where: bool,
}

impl Default for Transpiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Transpiler {
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(TranspileOptions::default())
    }

    /// A deterministic salt makes uids and custom-property names reproducible, for golden tests
    #[must_use]
    pub fn with_salt(salt: &str) -> Self {
        Self::with_options(TranspileOptions {
            salt: Some(salt.to_string()),
            ..Default::default()
        })
    }

    #[must_use]
    pub fn with_options(options: TranspileOptions) -> Self {
        let salt = options.salt.unwrap_or_else(random_salt);
        let base_url = options.base_url.as_deref().and_then(|u| Url::parse(u).ok());

        Self {
            salt,
            next_uid: 0,
            base_url,
            supports_where: options.supports_where,
        }
    }

    /// Transpiles a stylesheet. Always returns a usable result: if anything goes wrong
    /// internally, the input comes back unchanged with an empty descriptor list.
    pub fn transpile(&mut self, source: &str) -> TranspileResult {
        match self.try_transpile(source) {
            Ok(result) => result,
            Err(err) => {
                log::warn!("transpile failed, returning the stylesheet unchanged: {err}");
                TranspileResult {
                    source: source.to_string(),
                    descriptors: Vec::new(),
                    warnings: Vec::new(),
                }
            }
        }
    }

    fn try_transpile(&mut self, source: &str) -> CssResult<TranspileResult> {
        let config = ParserConfig {
            ignore_errors: true,
            ..Default::default()
        };
        let sheet = CssParser::parse_str(source, config)?;
        let children = sheet
            .as_stylesheet()
            .ok_or_else(|| CssError::new("Expected a stylesheet"))?
            .to_vec();

        let mut state = TransformState::default();
        let children = self.transform_rule_list(children, None, false, &mut state);
        let sheet = Node::new(NodeType::StyleSheet { children }, sheet.location);

        Ok(TranspileResult {
            source: serialize(&sheet),
            descriptors: state.descriptors,
            warnings: state.warnings,
        })
    }

    fn allocate_uid(&mut self) -> String {
        let uid = format!("c{}-{}", self.next_uid, self.salt);
        self.next_uid += 1;
        uid
    }

    fn custom_property(&self, stem: &str) -> String {
        format!("--cq-{stem}-{}", self.salt)
    }

    fn transform_rule_list(
        &mut self,
        nodes: Vec<Node>,
        container: Option<usize>,
        units_only: bool,
        state: &mut TransformState,
    ) -> Vec<Node> {
        nodes
            .into_iter()
            .map(|node| {
                let location = node.location.clone();
                match *node.node_type {
                    NodeType::AtRule { name, prelude, block } => {
                        self.transform_at_rule(name, prelude, block, location, container, units_only, state)
                    }
                    NodeType::QualifiedRule { prelude, block } => {
                        self.transform_qualified_rule(prelude, block, location, container, units_only, state)
                    }
                    other => Node::new(other, location),
                }
            })
            .collect()
    }

    #[allow(clippy::too_many_arguments)]
    fn transform_at_rule(
        &mut self,
        name: String,
        prelude: Vec<Node>,
        block: Option<Node>,
        location: Location,
        container: Option<usize>,
        units_only: bool,
        state: &mut TransformState,
    ) -> Node {
        let lower = name.cow_to_ascii_lowercase().into_owned();

        match lower.as_str() {
            "container" if !units_only => {
                self.transform_container_rule(name, prelude, block, location, container, state)
            }
            "media" | "layer" => {
                let block = block.map(|b| self.transform_rule_block(b, container, units_only, state));
                Node::new(NodeType::AtRule { name, prelude, block }, location)
            }
            "supports" => {
                let prelude = self.transform_supports_prelude(prelude, state);
                let block = block.map(|b| self.transform_rule_block(b, container, units_only, state));
                Node::new(NodeType::AtRule { name, prelude, block }, location)
            }
            _ if lower.ends_with("keyframes") => {
                let block = block.map(|b| self.transform_rule_block(b, None, true, state));
                Node::new(NodeType::AtRule { name, prelude, block }, location)
            }
            _ => {
                let mut prelude = prelude;
                self.rewrite_urls(&mut prelude, state);
                Node::new(NodeType::AtRule { name, prelude, block }, location)
            }
        }
    }

    /// `@container` becomes `@media all { … }`: the rewritten CSS is always live from the native
    /// engine's perspective, and applies only to elements the host has tagged with the
    /// descriptor's uid.
    fn transform_container_rule(
        &mut self,
        name: String,
        prelude: Vec<Node>,
        block: Option<Node>,
        location: Location,
        parent: Option<usize>,
        state: &mut TransformState,
    ) -> Node {
        let (rule, block) = match (parse_container_rule(&prelude), block) {
            (Ok(rule), Some(block)) => (rule, block),
            (_, block) => {
                // unparseable prelude or missing block: leave the rule untouched
                return Node::new(NodeType::AtRule { name, prelude, block }, location);
            }
        };

        let index = state.descriptors.len();
        state.descriptors.push(ContainerQueryDescriptor {
            rule,
            uid: self.allocate_uid(),
            selector: None,
            parent,
        });
        state.element_selectors.push(Vec::new());

        let block = self.transform_rule_block(block, Some(index), false, state);

        let collected = &state.element_selectors[index];
        if !collected.is_empty() {
            state.descriptors[index].selector = Some(collected.iter().unique().join(", "));
        }

        Node::new(
            NodeType::AtRule {
                name: "media".to_string(),
                prelude: vec![Node::synthesized(TokenType::Ident("all".to_string()))],
                block: Some(block),
            },
            location,
        )
    }

    fn transform_rule_block(
        &mut self,
        block: Node,
        container: Option<usize>,
        units_only: bool,
        state: &mut TransformState,
    ) -> Node {
        let location = block.location.clone();
        match *block.node_type {
            NodeType::Block {
                delim,
                kind: BlockKind::RuleList,
                children,
            } => {
                let children = self.transform_rule_list(children, container, units_only, state);
                Node::new(
                    NodeType::Block {
                        delim,
                        kind: BlockKind::RuleList,
                        children,
                    },
                    location,
                )
            }
            other => Node::new(other, location),
        }
    }

    fn transform_qualified_rule(
        &mut self,
        prelude: Vec<Node>,
        block: Node,
        location: Location,
        container: Option<usize>,
        units_only: bool,
        state: &mut TransformState,
    ) -> Node {
        let prelude = match container {
            Some(index) if !units_only => self.rewrite_selector_list(&prelude, index, state),
            _ => prelude,
        };

        let block = self.transform_declaration_block(block, units_only, state);

        Node::new(NodeType::QualifiedRule { prelude, block }, location)
    }

    /// Rewrites each comma-separated selector so the rule applies only to elements carrying this
    /// descriptor's uid: `<prefix>:where([data-cqs~="<uid>"])<pseudo-suffix>`. The non-pseudo
    /// prefixes are collected as the descriptor's element selectors.
    fn rewrite_selector_list(&mut self, prelude: &[Node], index: usize, state: &mut TransformState) -> Vec<Node> {
        let uid = state.descriptors[index].uid.clone();
        let mut out = Vec::new();

        for (i, sub) in split_selector_list(prelude).into_iter().enumerate() {
            if i > 0 {
                out.push(Node::synthesized(TokenType::Comma));
                out.push(Node::synthesized(TokenType::Whitespace));
            }

            let (prefix, suffix) = partition_selector(&sub);

            let element_selector = if prefix.is_empty() {
                "*".to_string()
            } else {
                serialize_nodes(&prefix)
            };
            state.element_selectors[index].push(element_selector);

            if self.supports_where {
                if prefix.is_empty() {
                    out.push(Node::synthesized(TokenType::Delim('*')));
                } else {
                    out.extend(prefix);
                }
                out.push(Node::synthesized(TokenType::Colon));
                out.push(Node::new(
                    NodeType::Function {
                        name: "where".to_string(),
                        children: vec![attribute_matcher(&uid)],
                    },
                    Location::default(),
                ));
                out.extend(suffix);
            } else if let Some(replaced) = replace_sentinel(&prefix, &uid) {
                out.extend(replaced);
                out.extend(suffix);
            } else {
                state
                    .warnings
                    .push(TranspileWarning::MissingSentinel(serialize_nodes(&sub)));
                out.extend(sub);
            }
        }

        out
    }

    fn transform_declaration_block(&mut self, block: Node, units_only: bool, state: &mut TransformState) -> Node {
        let location = block.location.clone();
        match *block.node_type {
            NodeType::Block { delim, kind, children }
                if kind == BlockKind::Style || kind == BlockKind::DeclarationList =>
            {
                let mut out = Vec::new();
                for child in children {
                    let child_location = child.location.clone();
                    match *child.node_type {
                        NodeType::Declaration {
                            property,
                            value,
                            important,
                        } => {
                            out.extend(self.transform_declaration(property, value, important, child_location, units_only, state));
                        }
                        NodeType::AtRule { name, prelude, block } => {
                            out.push(self.transform_at_rule(name, prelude, block, child_location, None, units_only, state));
                        }
                        other => out.push(Node::new(other, child_location)),
                    }
                }

                Node::new(NodeType::Block { delim, kind, children: out }, location)
            }
            other => Node::new(other, location),
        }
    }

    /// Container declarations become internal custom properties (the shorthand splits into the
    /// name and type properties); container-relative units in any other declaration become
    /// `calc()` expressions over the unit custom properties.
    fn transform_declaration(
        &mut self,
        property: String,
        value: Vec<Node>,
        important: bool,
        location: Location,
        units_only: bool,
        state: &mut TransformState,
    ) -> Vec<Node> {
        let lower = property.cow_to_ascii_lowercase().into_owned();

        if !units_only {
            match lower.as_str() {
                "container" => {
                    return match parse_container_shorthand(&value) {
                        Ok((names, types)) => vec![
                            self.custom_declaration("name", &names, important, location.clone()),
                            self.custom_declaration("type", &types, important, location),
                        ],
                        Err(_) => vec![Node::new(NodeType::Declaration { property, value, important }, location)],
                    };
                }
                "container-name" => {
                    return match parse_container_name_property(&value, true) {
                        Ok(names) => vec![self.custom_declaration("name", &names, important, location)],
                        Err(_) => vec![Node::new(NodeType::Declaration { property, value, important }, location)],
                    };
                }
                "container-type" => {
                    return match parse_container_type_property(&value, true) {
                        Ok(types) => vec![self.custom_declaration("type", &types, important, location)],
                        Err(_) => vec![Node::new(NodeType::Declaration { property, value, important }, location)],
                    };
                }
                _ => {}
            }
        }

        let mut value = value;
        self.rewrite_urls(&mut value, state);
        self.rewrite_container_units(&mut value);

        vec![Node::new(NodeType::Declaration { property, value, important }, location)]
    }

    fn custom_declaration(&self, stem: &str, words: &[String], important: bool, location: Location) -> Node {
        let mut value = Vec::new();
        for (i, word) in words.iter().enumerate() {
            if i > 0 {
                value.push(Node::synthesized(TokenType::Whitespace));
            }
            value.push(Node::synthesized(TokenType::Ident(word.clone())));
        }

        Node::new(
            NodeType::Declaration {
                property: self.custom_property(stem),
                value,
                important,
            },
            location,
        )
    }

    /// Replaces `<n><unit>` for the container-relative units with
    /// `calc(<n> * var(--cq-{w,h,i,b}-<salt>))`; `cqmin`/`cqmax` pick the smaller/larger of the
    /// two logical axis scales.
    fn rewrite_container_units(&self, nodes: &mut [Node]) {
        for node in nodes.iter_mut() {
            let replacement = match &mut *node.node_type {
                NodeType::Token(Token {
                    token_type: TokenType::Dimension { value, unit, raw, is_integer },
                    ..
                }) => {
                    let lower = unit.cow_to_ascii_lowercase().into_owned();
                    if !CONTAINER_UNITS.contains(&lower.as_str()) {
                        None
                    } else {
                        let scale = match lower.as_str() {
                            "cqw" => self.unit_variable("w"),
                            "cqh" => self.unit_variable("h"),
                            "cqi" => self.unit_variable("i"),
                            "cqb" => self.unit_variable("b"),
                            "cqmin" => self.unit_extremum("min"),
                            _ => self.unit_extremum("max"),
                        };

                        let number = Node::synthesized(TokenType::Number {
                            value: *value,
                            raw: raw.clone(),
                            is_integer: *is_integer,
                        });

                        Some(NodeType::Function {
                            name: "calc".to_string(),
                            children: vec![
                                number,
                                Node::synthesized(TokenType::Whitespace),
                                Node::synthesized(TokenType::Delim('*')),
                                Node::synthesized(TokenType::Whitespace),
                                scale,
                            ],
                        })
                    }
                }
                NodeType::Function { children, .. } | NodeType::Block { children, .. } => {
                    self.rewrite_container_units(children);
                    None
                }
                _ => None,
            };

            if let Some(replacement) = replacement {
                let location = node.location.clone();
                *node = Node::new(replacement, location);
            }
        }
    }

    /// `var(--cq-<stem>-<salt>)`
    fn unit_variable(&self, stem: &str) -> Node {
        Node::new(
            NodeType::Function {
                name: "var".to_string(),
                children: vec![Node::synthesized(TokenType::Ident(self.custom_property(stem)))],
            },
            Location::default(),
        )
    }

    /// `min(var(--cq-i-<salt>), var(--cq-b-<salt>))` or the `max()` counterpart
    fn unit_extremum(&self, function: &str) -> Node {
        Node::new(
            NodeType::Function {
                name: function.to_string(),
                children: vec![
                    self.unit_variable("i"),
                    Node::synthesized(TokenType::Comma),
                    Node::synthesized(TokenType::Whitespace),
                    self.unit_variable("b"),
                ],
            },
            Location::default(),
        )
    }

    /// Rewrites every URL token and every `url("…")` string argument to an absolute URL
    fn rewrite_urls(&self, nodes: &mut [Node], state: &mut TransformState) {
        let Some(base) = &self.base_url else {
            return;
        };

        for node in nodes.iter_mut() {
            match &mut *node.node_type {
                NodeType::Token(Token {
                    token_type: TokenType::Url(value),
                    ..
                }) => match base.join(value) {
                    Ok(resolved) => *value = resolved.to_string(),
                    Err(_) => state.warnings.push(TranspileWarning::UnresolvableUrl(value.clone())),
                },
                NodeType::Function { name, children } if name.eq_ignore_ascii_case("url") => {
                    if let Some(first) = children.iter_mut().find(|n| !n.is_whitespace()) {
                        if let NodeType::Token(Token {
                            token_type: TokenType::QuotedString(value),
                            ..
                        }) = &mut *first.node_type
                        {
                            match base.join(value) {
                                Ok(resolved) => *value = resolved.to_string(),
                                Err(_) => state.warnings.push(TranspileWarning::UnresolvableUrl(value.clone())),
                            }
                        }
                    }
                }
                NodeType::Function { children, .. } | NodeType::Block { children, .. } => {
                    self.rewrite_urls(children, state);
                }
                _ => {}
            }
        }
    }

    /// Rewrites declarations inside a `@supports` condition, so feature tests against the
    /// container properties keep working against the internal custom properties
    fn transform_supports_prelude(&mut self, nodes: Vec<Node>, state: &mut TransformState) -> Vec<Node> {
        nodes
            .into_iter()
            .map(|node| {
                let location = node.location.clone();
                match *node.node_type {
                    NodeType::Block { delim, kind, children } => {
                        if let Some(rewritten) = self.rewrite_supports_declaration(&children, state) {
                            Node::new(
                                NodeType::Block {
                                    delim,
                                    kind,
                                    children: rewritten,
                                },
                                location,
                            )
                        } else {
                            let children = self.transform_supports_prelude(children, state);
                            Node::new(NodeType::Block { delim, kind, children }, location)
                        }
                    }
                    NodeType::Function { name, children } => {
                        let children = self.transform_supports_prelude(children, state);
                        Node::new(NodeType::Function { name, children }, location)
                    }
                    other => Node::new(other, location),
                }
            })
            .collect()
    }

    /// If a block's contents look like `property: value`, pass them through the declaration
    /// rewriter and re-splice the result. Only single-declaration rewrites fit a block in place;
    /// the shorthand is left alone.
    fn rewrite_supports_declaration(&mut self, children: &[Node], state: &mut TransformState) -> Option<Vec<Node>> {
        let mut significant = children.iter().enumerate().filter(|(_, n)| !n.is_whitespace());

        let (_, first) = significant.next()?;
        let property = first.as_ident()?.to_string();

        let (colon_index, second) = significant.next()?;
        if !second.is_colon() {
            return None;
        }

        if property.cow_to_ascii_lowercase().as_ref() == "container" {
            return None;
        }

        let value = trim_whitespace(&children[colon_index + 1..]).to_vec();
        let transformed =
            self.transform_declaration(property, value, false, Location::default(), false, state);

        let [declaration] = transformed.as_slice() else {
            return None;
        };
        let (property, value, _) = declaration.as_declaration()?;

        let mut out = vec![
            Node::synthesized(TokenType::Ident(property.to_string())),
            Node::synthesized(TokenType::Colon),
            Node::synthesized(TokenType::Whitespace),
        ];
        out.extend(value.iter().cloned());

        Some(out)
    }
}

#[derive(Default)]
struct TransformState {
    descriptors: Vec<ContainerQueryDescriptor>,
    /// Element selectors collected per descriptor, parallel to `descriptors`
    element_selectors: Vec<Vec<String>>,
    warnings: Vec<TranspileWarning>,
}

/// `[data-cqs~="<uid>"]`
fn attribute_matcher(uid: &str) -> Node {
    Node::new(
        NodeType::Block {
            delim: BlockDelim::Bracket,
            kind: BlockKind::Simple,
            children: vec![
                Node::synthesized(TokenType::Ident(SELF_ATTRIBUTE.to_string())),
                Node::synthesized(TokenType::Delim('~')),
                Node::synthesized(TokenType::Delim('=')),
                Node::synthesized(TokenType::QuotedString(uid.to_string())),
            ],
        },
        Location::default(),
    )
}

/// Looks for the author-supplied `:not(.container-query-polyfill)` sentinel and swaps it for the
/// attribute matcher
fn replace_sentinel(prefix: &[Node], uid: &str) -> Option<Vec<Node>> {
    let position = prefix.windows(2).position(|pair| {
        pair[0].is_colon()
            && pair[1].as_function().is_some_and(|(name, children)| {
                if !name.eq_ignore_ascii_case("not") {
                    return false;
                }
                let inner = trim_whitespace(children);
                inner.len() == 2
                    && inner[0].is_delim('.')
                    && inner[1].as_ident().is_some_and(|s| s == SENTINEL_CLASS)
            })
    })?;

    let mut out = prefix[..position].to_vec();
    out.push(attribute_matcher(uid));
    out.extend(prefix[position + 2..].iter().cloned());
    Some(out)
}

fn random_salt() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect::<String>()
        .cow_to_ascii_lowercase()
        .into_owned()
}

/// Transpiles one stylesheet with a fresh transpiler and a random salt. On catastrophic internal
/// failure the input is returned unchanged with an empty descriptor list.
#[must_use]
pub fn transpile_style_sheet(source: &str, base_url: Option<&str>) -> TranspileResult {
    Transpiler::with_options(TranspileOptions {
        base_url: base_url.map(str::to_string),
        ..Default::default()
    })
    .transpile(source)
}
