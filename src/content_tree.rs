//! Content tree – the intermediate representation between content
//! generation and the external layout engine. Every counter is already
//! resolved to text except the page-based ones, which stay as
//! [`PageCounterPlaceholder`] leaves until pagination.

use serde::{Deserialize, Serialize};

use crate::counters::{GlyphStyle, PageCounterPlaceholder};
use crate::error::Result;
use crate::stylesheet::PseudoElement;

/// A generated document, ready for layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentTree {
    #[serde(default = "ContentTree::default_title")]
    pub title: String,
    /// Glyph styles the numbering in this document was rendered with, so the
    /// layout engine can pick fonts that cover them.
    #[serde(default)]
    pub glyph_styles: Vec<GlyphStyle>,
    pub nodes: Vec<ContentNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentNode {
    Element {
        tag: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        /// Set for boxes generated by `::marker`, `::before` and `::after`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pseudo: Option<PseudoElement>,
        #[serde(default)]
        page_break_before: bool,
        #[serde(default)]
        page_break_after: bool,
        children: Vec<ContentNode>,
    },
    Text(String),
    PageCounter(PageCounterPlaceholder),
}

impl ContentTree {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            glyph_styles: Vec::new(),
            nodes: Vec::new(),
        }
    }

    fn default_title() -> String {
        "counter-forge output".to_string()
    }

    /// Serialise to pretty JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Deserialise from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Flattened text of the whole tree. Page placeholders render as
    /// `{page}`, `{pages}` and `{page:#id}`.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.write_text(&mut out);
        }
        out
    }

    /// Total number of nodes, at every depth.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().map(ContentNode::node_count).sum()
    }

    /// Every page placeholder, in document order.
    pub fn page_counters(&self) -> Vec<&PageCounterPlaceholder> {
        let mut out = Vec::new();
        for node in &self.nodes {
            node.collect_page_counters(&mut out);
        }
        out
    }

    /// First element carrying `id`.
    pub fn find_by_id(&self, id: &str) -> Option<&ContentNode> {
        self.nodes.iter().find_map(|n| n.find_by_id(id))
    }
}

impl ContentNode {
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out);
        out
    }

    pub fn children(&self) -> &[ContentNode] {
        match self {
            ContentNode::Element { children, .. } => children,
            _ => &[],
        }
    }

    pub fn pseudo(&self) -> Option<PseudoElement> {
        match self {
            ContentNode::Element { pseudo, .. } => *pseudo,
            _ => None,
        }
    }

    /// The generated child box of kind `pseudo`, if any.
    pub fn pseudo_child(&self, pseudo: PseudoElement) -> Option<&ContentNode> {
        self.children().iter().find(|c| c.pseudo() == Some(pseudo))
    }

    fn write_text(&self, out: &mut String) {
        match self {
            ContentNode::Element { children, .. } => {
                for child in children {
                    child.write_text(out);
                }
            }
            ContentNode::Text(text) => out.push_str(text),
            ContentNode::PageCounter(p) => match (p.target(), p.is_total_page_count()) {
                (_, true) => out.push_str("{pages}"),
                (Some(target), false) => {
                    out.push_str("{page:#");
                    out.push_str(target);
                    out.push('}');
                }
                (None, false) => out.push_str("{page}"),
            },
        }
    }

    fn node_count(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(ContentNode::node_count)
            .sum::<usize>()
    }

    fn collect_page_counters<'a>(&'a self, out: &mut Vec<&'a PageCounterPlaceholder>) {
        match self {
            ContentNode::PageCounter(p) => out.push(p),
            ContentNode::Element { children, .. } => {
                for child in children {
                    child.collect_page_counters(out);
                }
            }
            ContentNode::Text(_) => {}
        }
    }

    fn find_by_id(&self, wanted: &str) -> Option<&ContentNode> {
        if let ContentNode::Element { id: Some(id), .. } = self {
            if id == wanted {
                return Some(self);
            }
        }
        self.children().iter().find_map(|c| c.find_by_id(wanted))
    }
}
