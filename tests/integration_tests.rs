//! Integration tests for the counter-forge pipeline.
//!
//! These tests validate:
//! - The counter engine against its reference scenarios
//! - Generated text for every sample template
//! - Cross-references, page placeholders and configuration
//! - JSON output is deterministic

use counter_forge::content_tree::{ContentNode, ContentTree};
use counter_forge::counters::{format_counter, CounterContext, ElementKey, GlyphStyle};
use counter_forge::dom::parse_html;
use counter_forge::pipeline::{generate_content, generate_content_json, PipelineConfig};
use counter_forge::stylesheet::PseudoElement;
use counter_forge::{templates, Error};
use sha2::{Digest, Sha256};

// =====================================================================
// Helper
// =====================================================================

fn default_config() -> PipelineConfig {
    PipelineConfig::default()
}

fn text_of(html: &str) -> String {
    generate_content(html, &default_config())
        .expect("generation succeeds")
        .text()
}

// =====================================================================
// Counter engine scenarios
// =====================================================================

#[test]
fn increment_inside_scope_updates_ancestor_value() {
    let mut ctx = CounterContext::new();
    ctx.reset("item", 0);
    ctx.increment("item", 1);
    ctx.on_enter(ElementKey(1));
    ctx.increment("item", 1);
    ctx.on_exit(ElementKey(1));
    assert_eq!(ctx.resolve("item", GlyphStyle::Decimal), "2");
}

#[test]
fn child_reset_is_isolated() {
    let mut ctx = CounterContext::new();
    ctx.reset("item", 0);
    ctx.on_enter(ElementKey(1));
    ctx.reset("item", 5);
    ctx.on_exit(ElementKey(1));
    assert_eq!(ctx.resolve("item", GlyphStyle::Decimal), "0");
}

#[test]
fn formatting_table() {
    assert_eq!(format_counter(4, GlyphStyle::LowerRoman), "iv");
    assert_eq!(format_counter(4000, GlyphStyle::UpperRoman), "4000");
    assert_eq!(format_counter(7, GlyphStyle::DecimalLeadingZero), "07");
    assert_eq!(format_counter(42, GlyphStyle::None), "");
}

#[test]
fn nested_values_join() {
    let mut ctx = CounterContext::new();
    ctx.reset("item", 1);
    ctx.on_enter(ElementKey(1));
    ctx.reset("item", 2);
    ctx.on_enter(ElementKey(2));
    ctx.reset("item", 3);
    assert_eq!(
        ctx.resolve_list("item", ".", GlyphStyle::Decimal),
        "1.2.3"
    );
    ctx.on_exit(ElementKey(2));
    ctx.on_exit(ElementKey(1));
    assert_eq!(ctx.open_scopes(), 0);
}

#[test]
fn target_reference_resolves_after_visit() {
    let mut ctx = CounterContext::new();
    assert_eq!(
        ctx.resolve_target_counter("x", "item", GlyphStyle::Decimal),
        None
    );
    ctx.reset("item", 7);
    ctx.on_visit_element_with_id("x");
    assert_eq!(
        ctx.resolve_target_counter("x", "item", GlyphStyle::LowerRoman),
        Some("vii".to_string())
    );
}

// =====================================================================
// Template tests
// =====================================================================

#[test]
fn minimal_template() {
    assert_eq!(text_of(templates::minimal_template()), "1. Hello, World!");
}

#[test]
fn report_template_numbering() {
    let tree = generate_content(templates::report_template(), &default_config()).unwrap();
    let text = tree.text();
    for expected in [
        "Overview ... page {page:#overview}",
        "Results ... page {page:#results}",
        "Chapter I: Overview",
        "1.1 Scope",
        "1.2 Method",
        "Figure 1. Pipeline",
        "Chapter II: Results",
        "2.1 Revenue",
        "Figure 2. Revenue by quarter",
        "the chart (figure 2).",
        "the method (figure 1).",
        "Page {page} of {pages}",
    ] {
        assert!(text.contains(expected), "missing {expected:?} in {text:?}");
    }
    assert!(!text.contains("Quarterly Report"), "head content leaked");

    assert_eq!(
        tree.glyph_styles,
        vec![GlyphStyle::UpperRoman, GlyphStyle::Decimal]
    );
    assert_eq!(tree.page_counters().len(), 4);

    match tree.find_by_id("results") {
        Some(ContentNode::Element {
            page_break_before, ..
        }) => assert!(*page_break_before),
        other => panic!("expected #results element, got {other:?}"),
    }
}

#[test]
fn nested_list_template_uses_counters() {
    let text = text_of(templates::nested_list_template());
    for expected in [
        "1 Introduction",
        "1.1 Background",
        "1.2 Goals",
        "1.2.1 Short term",
        "1.2.2 Long term",
        "2 Design",
        "3 Conclusion",
    ] {
        assert!(text.contains(expected), "missing {expected:?} in {text:?}");
    }
}

#[test]
fn list_styles_template() {
    let tree = generate_content(templates::list_styles_template(), &default_config()).unwrap();
    let text = tree.text();
    for expected in [
        "a. ab. bc. c",
        "I. aII. bIII. cIV. d",
        "\u{3B1}. a\u{3B2}. b",
        "01. a02. b",
        "\u{25AA} a",
        "\u{25E6} a",
        "10. ten11. eleven",
        "3. three2. two1. one",
        "5. five9. nine10. ten",
    ] {
        assert!(text.contains(expected), "missing {expected:?} in {text:?}");
    }
    assert_eq!(
        tree.glyph_styles,
        vec![
            GlyphStyle::Square,
            GlyphStyle::Circle,
            GlyphStyle::LowerLatin,
            GlyphStyle::LowerGreek,
            GlyphStyle::UpperRoman,
            GlyphStyle::Georgian,
            GlyphStyle::Armenian,
            GlyphStyle::DecimalLeadingZero,
            GlyphStyle::Decimal,
        ]
    );
}

#[test]
fn cross_reference_template() {
    let text = text_of(templates::cross_reference_template());
    for expected in [
        "Forward ref[2].",
        "[1] First note.",
        "[2] Second note.",
        "Backward ref[1].",
        "Jump to deep \u{A7}2.1.",
        "Dangling ref[].",
    ] {
        assert!(text.contains(expected), "missing {expected:?} in {text:?}");
    }
}

#[test]
fn all_templates_generate() {
    for (name, html) in templates::all_templates() {
        let tree = generate_content(html, &default_config())
            .unwrap_or_else(|e| panic!("template {name} failed: {e}"));
        assert!(tree.node_count() > 0, "template {name} is empty");
        assert_eq!(templates::template(name), Some(html));
    }
    assert!(templates::template("nope").is_none());
}

// =====================================================================
// Generated content
// =====================================================================

#[test]
fn marker_before_and_after_order() {
    let html = r#"<style>
        li::before { content: "<" }
        li::after { content: ">" }
    </style>
    <ol><li id="only">x</li></ol>"#;
    let tree = generate_content(html, &default_config()).unwrap();
    let li = tree.find_by_id("only").expect("li");
    let kinds: Vec<Option<PseudoElement>> = li.children().iter().map(|c| c.pseudo()).collect();
    assert_eq!(
        kinds,
        vec![
            Some(PseudoElement::Marker),
            Some(PseudoElement::Before),
            None,
            Some(PseudoElement::After),
        ]
    );
    assert_eq!(li.text(), "1. <x>");
}

#[test]
fn after_sees_counters_of_own_element() {
    let html = r#"<style>
        section { counter-reset: para }
        p { counter-increment: para }
        section::after { content: "(" counter(para) " paragraphs)" }
    </style>
    <section><p>a</p><p>b</p><p>c</p></section>"#;
    assert_eq!(text_of(html), "abc(3 paragraphs)");
}

#[test]
fn sibling_reset_scopes_continue() {
    let html = r#"<style>
        h2 { counter-reset: step }
        p { counter-increment: step }
        p::before { content: counter(step, lower-alpha) ") " }
    </style>
    <h2>One</h2><p>x</p><p>y</p><h2>Two</h2><p>z</p>"#;
    assert_eq!(text_of(html), "Onea) xb) yTwoa) z");
}

#[test]
fn target_counters_joins_nested_values() {
    let html = r##"<style>
        a::after { content: " " target-counters("#leaf", list-item, "-", upper-latin) }
    </style>
    <a href="x">ref</a>
    <ol><li>one<ol><li>two</li><li id="leaf">three</li></ol></li></ol>"##;
    let text = text_of(html);
    assert!(text.starts_with("ref A-B"), "{text}");
}

#[test]
fn quotes_and_attributes() {
    let html = r#"<style>q::before { content: open-quote } q::after { content: close-quote " (" attr(cite) ")" }</style>
    <q cite="Ada">Hello</q>"#;
    assert_eq!(text_of(html), "\u{201C}Hello\u{201D} (Ada)");
}

// =====================================================================
// Configuration & errors
// =====================================================================

#[test]
fn markers_can_be_disabled() {
    let config = PipelineConfig {
        list_markers: false,
        ..default_config()
    };
    let tree = generate_content("<ol><li>a</li><li>b</li></ol>", &config).unwrap();
    assert_eq!(tree.text(), "ab");
}

#[test]
fn depth_limit_is_reported() {
    let html = "<div>".repeat(40) + &"</div>".repeat(40);
    let config = PipelineConfig {
        max_depth: 16,
        ..default_config()
    };
    match generate_content(&html, &config) {
        Err(Error::DepthLimit { limit: 16 }) => {}
        other => panic!("expected depth limit error, got {other:?}"),
    }
    assert!(generate_content(&html, &default_config()).is_ok());
}

#[test]
fn very_deep_markup_reports_depth_limit() {
    let html = "<div>".repeat(200_000);
    match generate_content(&html, &default_config()) {
        Err(Error::DepthLimit { limit }) => assert_eq!(limit, default_config().max_depth),
        other => panic!("expected depth limit error, got {:?}", other.map(|t| t.node_count())),
    }
}

#[test]
fn title_from_config() {
    let config = PipelineConfig {
        title: "Handbook".into(),
        ..default_config()
    };
    let tree = generate_content("<p>x</p>", &config).unwrap();
    assert_eq!(tree.title, "Handbook");
}

#[test]
fn unsupported_css_is_ignored() {
    let html = r#"<style>
        @media print { p { counter-increment: n 100 } }
        div p { counter-increment: n 100 }
        p { counter-increment: n }
        p::before { content: counter(n) bogus(1) " " }
    </style>
    <div><p>a</p><p>b</p></div>"#;
    assert_eq!(text_of(html), "1 a2 b");
}

#[test]
fn dom_keeps_ids_for_targets() {
    let doc = parse_html(r#"<body><h1 id="top">T</h1></body>"#);
    let top = doc.find_by_id("top").expect("h1");
    assert_eq!(doc.element(top).map(|e| e.tag.as_str()), Some("h1"));
    assert_eq!(doc.text_content(doc.body()), "T");
}

// =====================================================================
// JSON / golden-sample stability
// =====================================================================

#[test]
fn content_tree_json_roundtrip() {
    let json = generate_content_json(templates::report_template()).unwrap();
    let tree = ContentTree::from_json(&json).unwrap();
    assert_eq!(tree.title, "counter-forge output");
    assert_eq!(tree.to_json(), json);
}

#[test]
fn json_output_is_deterministic() {
    for (name, html) in templates::all_templates() {
        let first = Sha256::digest(generate_content_json(html).unwrap().as_bytes());
        let second = Sha256::digest(generate_content_json(html).unwrap().as_bytes());
        assert_eq!(first, second, "template {name} output differs between runs");
    }
}
