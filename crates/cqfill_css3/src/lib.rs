use crate::parser_config::ParserConfig;
use crate::tokenizer::Tokenizer;
use cqfill_shared::byte_stream::ByteStream;
use cqfill_shared::errors::CssResult;

pub mod evaluator;
pub mod node;
pub mod parser;
pub mod parser_config;
pub mod query;
mod selector;
pub mod serializer;
pub mod tokenizer;
pub mod transformer;
pub mod walker;

pub use evaluator::evaluate;
pub use parser::container::{
    parse_container_name_property, parse_container_rule, parse_container_shorthand, parse_container_type_property,
};
pub use query::{ContainerRule, QueryContext, TreeContext, TriState, WritingAxis};
pub use transformer::{
    transpile_style_sheet, ContainerQueryDescriptor, TranspileOptions, TranspileResult, TranspileWarning, Transpiler,
};

/// The CSS parser: a thin driver over the tokenizer; the parsing algorithms live in the
/// `parser` submodules.
pub struct CssParser<'stream> {
    /// The tokenizer is responsible for reading the input stream
    pub tokenizer: Tokenizer<'stream>,
    /// The parser configuration as given
    config: ParserConfig,
}

impl<'stream> CssParser<'stream> {
    /// Creates a new parser with the given stream so only `parse()` needs to be called
    fn new(stream: &'stream mut ByteStream, config: ParserConfig) -> Self {
        let location = config.location.clone();
        Self {
            tokenizer: Tokenizer::new(stream, location),
            config,
        }
    }

    /// Parses a string into a stylesheet node tree
    pub fn parse_str(data: &str, config: ParserConfig) -> CssResult<node::Node> {
        let mut stream = ByteStream::new();
        stream.read_from_str(data);

        CssParser::parse_stream(&mut stream, config)
    }

    /// Parses a prepared stream into a stylesheet node tree
    pub fn parse_stream(stream: &'stream mut ByteStream, config: ParserConfig) -> CssResult<node::Node> {
        CssParser::new(stream, config).parse_stylesheet()
    }
}

/// Evaluates a parsed container rule against one candidate container, as a nullable boolean:
/// `None` means the condition could not be resolved in this context.
#[must_use]
pub fn evaluate_container_condition(rule: &ContainerRule, ctx: &QueryContext) -> Option<bool> {
    evaluator::evaluate(rule, ctx).to_option()
}
