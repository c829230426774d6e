//! Pipeline – ties together parsing, styling and content generation into a
//! single function call.

use crate::content_tree::ContentTree;
use crate::counters::CounterContext;
use crate::dom::parse_html;
use crate::error::Result;
use crate::generate::{Generator, DEFAULT_MAX_DEPTH};
use crate::style::compute_styles;
use crate::stylesheet::Stylesheet;

/// Configuration for the content generation pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Title recorded in the content tree (default: "counter-forge output").
    pub title: String,
    /// Maximum element nesting below `<body>` (default: 512).
    pub max_depth: usize,
    /// Generate `::marker` boxes for list items (default: true).
    pub list_markers: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            title: "counter-forge output".to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            list_markers: true,
        }
    }
}

/// Full pipeline: HTML string → content tree.
pub fn generate_content(html: &str, config: &PipelineConfig) -> Result<ContentTree> {
    // 1. Parse HTML
    let document = parse_html(html);

    // 2. Collect <style> blocks, in document order
    let mut sheet = Stylesheet::default();
    for css in document.style_sheets() {
        sheet.append(&css);
    }

    // 3. Cascade
    let styles = compute_styles(&document, &sheet);

    // 4. Generate, with counter state private to this document
    let mut ctx = CounterContext::new();
    let mut tree = Generator::new(&document, &styles)
        .max_depth(config.max_depth)
        .list_markers(config.list_markers)
        .run(&mut ctx)?;
    tree.title = config.title.clone();

    Ok(tree)
}

/// Convenience: generate with the default config and serialise to JSON.
pub fn generate_content_json(html: &str) -> Result<String> {
    Ok(generate_content(html, &PipelineConfig::default())?.to_json())
}
