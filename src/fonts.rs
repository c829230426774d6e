//! Glyph coverage using `ttf-parser`.
//!
//! Counter text is rendered by the layout engine, not here, but a numbering
//! style is only useful if the chosen font has glyphs for it. This module
//! checks a font's `cmap` against the symbol set of every glyph style.

use std::collections::HashSet;

use crate::counters::{alphabet_for, GlyphStyle};
use crate::error::{Error, Result};

/// Which numbering symbols a font face can render.
#[derive(Debug, Clone)]
pub struct GlyphCoverage {
    family: Option<String>,
    covered: HashSet<char>,
}

impl GlyphCoverage {
    /// Parse a TTF/OTF face (index 0) and record its coverage.
    pub fn from_font_bytes(bytes: &[u8]) -> Result<Self> {
        let face = ttf_parser::Face::parse(bytes, 0)
            .map_err(|e| Error::Font(format!("failed to parse font: {e}")))?;

        let family = face
            .names()
            .into_iter()
            .filter(|name| name.name_id == ttf_parser::name_id::FAMILY)
            .find_map(|name| name.to_string());

        let mut covered = HashSet::new();
        for style in GlyphStyle::ALL {
            for &ch in alphabet_for(style) {
                if face.glyph_index(ch).is_some() {
                    covered.insert(ch);
                }
            }
        }
        log::debug!(
            "font {:?}: {} numbering symbols covered",
            family,
            covered.len()
        );

        Ok(Self { family, covered })
    }

    /// Build coverage from an explicit character set.
    pub fn from_chars(chars: impl IntoIterator<Item = char>) -> Self {
        Self {
            family: None,
            covered: chars.into_iter().collect(),
        }
    }

    /// The font's family name, when the `name` table has a Unicode entry.
    pub fn family(&self) -> Option<&str> {
        self.family.as_deref()
    }

    /// Symbols of `style` the font has no glyph for, in alphabet order.
    pub fn missing_glyphs(&self, style: GlyphStyle) -> Vec<char> {
        alphabet_for(style)
            .iter()
            .copied()
            .filter(|ch| !self.covered.contains(ch))
            .collect()
    }

    pub fn covers(&self, style: GlyphStyle) -> bool {
        self.missing_glyphs(style).is_empty()
    }

    /// Styles from `styles` the font can not fully render.
    pub fn uncovered<'s>(&self, styles: &'s [GlyphStyle]) -> Vec<&'s GlyphStyle> {
        styles.iter().filter(|s| !self.covers(**s)).collect()
    }
}
