//! # counter-forge – CSS counters and generated content
//!
//! This crate resolves CSS counters (`counter-reset`, `counter-set`,
//! `counter-increment`, `counter()`, `counters()`, `target-counter()`,
//! `target-counters()`) in controlled HTML documents and produces a content
//! tree for an external layout engine. The pipeline stages are:
//!
//! 1. **Parse** – HTML string → arena DOM ([`dom`])
//! 2. **Style** – `<style>` rules and `style` attributes ([`stylesheet`],
//!    [`content`]) cascaded per element ([`style`])
//! 3. **Generate** – depth-first walk driving the counter engine
//!    ([`generate`], [`counters`])
//! 4. **Emit** – serialisable [`content_tree::ContentTree`] with page
//!    numbers left as placeholders
//!
//! [`fonts`] checks whether a font can render the numbering styles used.

pub mod content;
pub mod content_tree;
pub mod counters;
pub mod dom;
pub mod error;
pub mod fonts;
pub mod generate;
pub mod pipeline;
pub mod style;
pub mod stylesheet;
pub mod templates;

// Re-exports for convenience
pub use content_tree::{ContentNode, ContentTree};
pub use counters::{CounterContext, GlyphStyle, PageCounterPlaceholder};
pub use error::{Error, Result};
pub use pipeline::{generate_content, generate_content_json, PipelineConfig};
