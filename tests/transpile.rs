use cqfill_css3::parser_config::ParserConfig;
use cqfill_css3::query::{QueryValue, SizeFeature};
use cqfill_css3::serializer::serialize;
use cqfill_css3::transformer::{TranspileOptions, Transpiler};
use cqfill_css3::{evaluate_container_condition, CssParser, QueryContext, TreeContext, WritingAxis};
use std::collections::HashMap;
use test_case::test_case;

fn transpile(source: &str) -> String {
    Transpiler::with_salt("it").transpile(source).source
}

#[test_case(
    "@container (min-width: 200px) { .card { color: red; } }",
    "@media all { .card:where([data-cqs~=\"c0-it\"]) { color: red; } }";
    "basic min width"
)]
#[test_case(
    "@container sidebar (width > 10em) { nav a { color: red; } }",
    "@media all { nav a:where([data-cqs~=\"c0-it\"]) { color: red; } }";
    "named container with descendant selector"
)]
#[test_case(
    ".card { container: card / inline-size; }",
    ".card { --cq-name-it: card; --cq-type-it: inline-size; }";
    "shorthand declaration"
)]
#[test_case(
    ".card { width: 10cqi; margin: 1cqmax; }",
    ".card { width: calc(10 * var(--cq-i-it)); margin: calc(1 * max(var(--cq-i-it), var(--cq-b-it))); }";
    "logical container units"
)]
#[test_case(
    "@media print { @container (orientation: portrait) { p { margin: 0; } } }",
    "@media print { @media all { p:where([data-cqs~=\"c0-it\"]) { margin: 0; } } }";
    "container nested in media"
)]
#[test_case(
    "@supports (container-type: inline-size) { .a { color: red; } }",
    "@supports (--cq-type-it: inline-size) { .a { color: red; } }";
    "supports feature test"
)]
#[test_case(
    "@layer components { @container (width >= 100px) { .a { top: 0; } } }",
    "@layer components { @media all { .a:where([data-cqs~=\"c0-it\"]) { top: 0; } } }";
    "container nested in layer"
)]
#[test_case(
    ".a { color: red !important; }",
    ".a { color: red !important; }";
    "important survives the rewrite"
)]
fn golden_transpile(input: &str, expected: &str) {
    assert_eq!(transpile(input), expected);
}

#[test]
fn descriptor_metadata_round_trip() {
    let result = Transpiler::with_salt("it").transpile(
        "@container layout (100px <= width <= 800px) { .grid { gap: 1cqw; } .grid > * { min-width: 0; } }",
    );

    assert_eq!(result.descriptors.len(), 1);
    let descriptor = &result.descriptors[0];
    assert_eq!(descriptor.rule.name.as_deref(), Some("layout"));
    assert_eq!(descriptor.selector.as_deref(), Some(".grid, .grid > *"));
    assert_eq!(descriptor.rule.features, [SizeFeature::Width].into_iter().collect());
}

#[test]
fn descriptor_uids_stay_unique_across_a_large_sheet() {
    let source = (0..24)
        .map(|i| format!("@container (width > {i}px) {{ .c{i} {{ top: 0; }} }}"))
        .collect::<Vec<_>>()
        .join("\n");

    let result = Transpiler::with_salt("it").transpile(&source);

    assert_eq!(result.descriptors.len(), 24);
    let mut uids: Vec<&str> = result.descriptors.iter().map(|d| d.uid.as_str()).collect();
    uids.sort_unstable();
    uids.dedup();
    assert_eq!(uids.len(), 24);
}

#[test_case("a { color: red; }"; "plain rule")]
#[test_case("@media (min-width: 10px) { a { color: red; } }"; "media query")]
#[test_case("@container card (100px < width <= 400px) { .a::before { content: \"x\"; width: 50cqw; } }"; "container rule")]
#[test_case("a { font: x/**/y; width: .5em; background: url(img.png); }"; "tricky tokens")]
#[test_case("@font-face { font-family: \"Test\"; src: url(\"t.woff2\"); }"; "font face")]
fn serialization_reaches_a_fixpoint(input: &str) {
    let once = serialize(&CssParser::parse_str(input, ParserConfig::default()).unwrap());
    let twice = serialize(&CssParser::parse_str(&once, ParserConfig::default()).unwrap());

    assert_eq!(once, twice);
}

#[test]
fn transpiled_output_parses_cleanly() {
    let result = Transpiler::with_salt("it").transpile(
        "@container (width > 100px) { .a, .b::after { width: 2cqmin; } } .c { container: x / size; }",
    );

    let reparsed = CssParser::parse_str(&result.source, ParserConfig::default()).unwrap();
    assert_eq!(serialize(&reparsed), result.source);
}

fn host_context(width: f32, height: f32, axis: WritingAxis) -> QueryContext {
    let mut size_features = HashMap::new();
    size_features.insert(
        SizeFeature::Width,
        QueryValue::Dimension {
            value: width,
            unit: "px".into(),
        },
    );
    size_features.insert(
        SizeFeature::Height,
        QueryValue::Dimension {
            value: height,
            unit: "px".into(),
        },
    );

    QueryContext {
        size_features,
        tree_context: TreeContext {
            cqw: Some(width / 100.0),
            cqh: Some(height / 100.0),
            font_size: 16.0,
            root_font_size: 16.0,
            writing_axis: axis,
        },
    }
}

#[test]
fn transpile_then_evaluate_drives_the_attribute_decision() {
    let result = Transpiler::with_salt("it")
        .transpile("@container (inline-size > 250px) and (orientation: landscape) { .a { top: 0; } }");
    let rule = &result.descriptors[0].rule;

    assert_eq!(
        evaluate_container_condition(rule, &host_context(300.0, 100.0, WritingAxis::Horizontal)),
        Some(true)
    );
    assert_eq!(
        evaluate_container_condition(rule, &host_context(200.0, 100.0, WritingAxis::Horizontal)),
        Some(false)
    );
    // vertical writing mode maps inline-size to the height axis
    assert_eq!(
        evaluate_container_condition(rule, &host_context(300.0, 100.0, WritingAxis::Vertical)),
        Some(false)
    );
}

#[test]
fn unknown_scale_surfaces_as_null() {
    let result = Transpiler::with_salt("it").transpile("@container (width >= 50cqw) { .a { top: 0; } }");
    let rule = &result.descriptors[0].rule;

    let mut ctx = host_context(300.0, 100.0, WritingAxis::Horizontal);
    ctx.tree_context.cqw = None;

    assert_eq!(evaluate_container_condition(rule, &ctx), None);
}

#[test]
fn missing_sentinel_is_reported_not_silently_dropped() {
    let mut transpiler = Transpiler::with_options(TranspileOptions {
        salt: Some("it".into()),
        supports_where: false,
        ..Default::default()
    });

    let result = transpiler.transpile("@container (width > 1px) { .a { top: 0; } }");

    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].to_string().contains(".a"));
}

#[test]
fn unparseable_garbage_still_returns_usable_css() {
    let source = "@container ((( { .a { color: red; } .b { color: blue; }";
    let result = Transpiler::with_salt("it").transpile(source);

    // nothing to activate, but the output stays parseable CSS
    assert!(result.descriptors.is_empty());
    let reparsed = CssParser::parse_str(&result.source, ParserConfig::default());
    assert!(reparsed.is_ok());
}
