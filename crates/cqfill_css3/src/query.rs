use crate::tokenizer::Number;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// The size features a container condition may query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SizeFeature {
    Width,
    Height,
    InlineSize,
    BlockSize,
    AspectRatio,
    Orientation,
}

impl SizeFeature {
    /// Maps a feature name (without any `min-`/`max-` prefix) to the feature
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "width" => Some(SizeFeature::Width),
            "height" => Some(SizeFeature::Height),
            "inline-size" => Some(SizeFeature::InlineSize),
            "block-size" => Some(SizeFeature::BlockSize),
            "aspect-ratio" => Some(SizeFeature::AspectRatio),
            "orientation" => Some(SizeFeature::Orientation),
            _ => None,
        }
    }

    /// Range features accept `min-`/`max-` prefixes and range comparisons; discrete ones do not
    #[must_use]
    pub fn is_range(self) -> bool {
        !matches!(self, SizeFeature::Orientation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonOp {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

/// A resolved (or unresolvable) operand value in a container condition
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryValue {
    Unknown,
    Number(Number),
    Dimension { value: Number, unit: String },
    Orientation(Orientation),
    Boolean(bool),
}

/// The condition expression tree of a container rule.
///
/// A plain tagged sum; the evaluator walks it by pattern matching. Leaves are either feature
/// references or literal values; an uninterpretable sub-expression is `Value(Unknown)` so CSS
/// forward-compatibility falls out of the three-valued logic.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryExpr {
    Not(Box<QueryExpr>),
    And(Box<QueryExpr>, Box<QueryExpr>),
    Or(Box<QueryExpr>, Box<QueryExpr>),
    Compare {
        op: ComparisonOp,
        left: Box<QueryExpr>,
        right: Box<QueryExpr>,
    },
    Feature(SizeFeature),
    Value(QueryValue),
}

/// A parsed `@container` rule: the optional container name, the condition tree and the set of
/// size features the condition references. The feature set short-circuits evaluation when a
/// precomputed feature is unknown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerRule {
    pub name: Option<String>,
    pub condition: QueryExpr,
    pub features: HashSet<SizeFeature>,
}

/// Whether the inline axis runs horizontally or vertically, derived from `writing-mode`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WritingAxis {
    Horizontal,
    Vertical,
}

/// The environment needed to resolve relative units in condition operands
#[derive(Debug, Clone, PartialEq)]
pub struct TreeContext {
    /// Pixels per `cqw` unit, when the horizontal container scale is known
    pub cqw: Option<Number>,
    /// Pixels per `cqh` unit, when the vertical container scale is known
    pub cqh: Option<Number>,
    pub font_size: Number,
    pub root_font_size: Number,
    pub writing_axis: WritingAxis,
}

impl TreeContext {
    /// Pixels per `cqi` unit
    #[must_use]
    pub fn cqi(&self) -> Option<Number> {
        match self.writing_axis {
            WritingAxis::Horizontal => self.cqw,
            WritingAxis::Vertical => self.cqh,
        }
    }

    /// Pixels per `cqb` unit
    #[must_use]
    pub fn cqb(&self) -> Option<Number> {
        match self.writing_axis {
            WritingAxis::Horizontal => self.cqh,
            WritingAxis::Vertical => self.cqw,
        }
    }
}

/// Everything the evaluator needs for one candidate container: the size snapshot supplied by the
/// host (physical axes) and the unit-resolution environment
#[derive(Debug, Clone, PartialEq)]
pub struct QueryContext {
    pub size_features: HashMap<SizeFeature, QueryValue>,
    pub tree_context: TreeContext,
}

/// Three-valued logic result of a condition evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriState {
    True,
    False,
    Unknown,
}

impl TriState {
    #[must_use]
    pub fn negate(self) -> TriState {
        match self {
            TriState::True => TriState::False,
            TriState::False => TriState::True,
            TriState::Unknown => TriState::Unknown,
        }
    }

    /// The nullable-boolean form used at the public boundary
    #[must_use]
    pub fn to_option(self) -> Option<bool> {
        match self {
            TriState::True => Some(true),
            TriState::False => Some(false),
            TriState::Unknown => None,
        }
    }
}

impl From<bool> for TriState {
    fn from(b: bool) -> Self {
        if b {
            TriState::True
        } else {
            TriState::False
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_names() {
        assert_eq!(SizeFeature::from_name("inline-size"), Some(SizeFeature::InlineSize));
        assert_eq!(SizeFeature::from_name("resolution"), None);
        assert!(SizeFeature::Width.is_range());
        assert!(!SizeFeature::Orientation.is_range());
    }

    #[test]
    fn tree_context_axis_mapping() {
        let ctx = TreeContext {
            cqw: Some(3.0),
            cqh: Some(7.0),
            font_size: 16.0,
            root_font_size: 16.0,
            writing_axis: WritingAxis::Vertical,
        };

        assert_eq!(ctx.cqi(), Some(7.0));
        assert_eq!(ctx.cqb(), Some(3.0));
    }

    #[test]
    fn tristate_negation() {
        assert_eq!(TriState::True.negate(), TriState::False);
        assert_eq!(TriState::Unknown.negate(), TriState::Unknown);
        assert_eq!(TriState::Unknown.to_option(), None);
    }
}
