//! Page counter placeholders.
//!
//! Page numbers only exist once the external layout engine has paginated the
//! document, so `counter(page)`, `counter(pages)` and page-valued
//! `target-counter()` calls are emitted as these leaf nodes instead of text.

use serde::{Deserialize, Serialize};

use super::numbering::GlyphStyle;

/// An immutable request for a page number, filled in after pagination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageCounterPlaceholder {
    is_total_page_count: bool,
    target: Option<String>,
    glyph_style: GlyphStyle,
}

impl PageCounterPlaceholder {
    /// `counter(page)`: the page this placeholder ends up on.
    pub fn current_page(glyph_style: GlyphStyle) -> Self {
        Self {
            is_total_page_count: false,
            target: None,
            glyph_style,
        }
    }

    /// `counter(pages)`: the number of pages in the document.
    pub fn total_pages(glyph_style: GlyphStyle) -> Self {
        Self {
            is_total_page_count: true,
            target: None,
            glyph_style,
        }
    }

    /// `target-counter(#id, page)`: the page holding the element with `id`.
    pub fn page_of(target: impl Into<String>, glyph_style: GlyphStyle) -> Self {
        Self {
            is_total_page_count: false,
            target: Some(target.into()),
            glyph_style,
        }
    }

    /// `true` for the total page count, `false` for a page number.
    pub fn is_total_page_count(&self) -> bool {
        self.is_total_page_count
    }

    /// Element id whose page is requested; `None` means the current page.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn glyph_style(&self) -> GlyphStyle {
        self.glyph_style
    }
}
