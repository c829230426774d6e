//! HTML parser – converts an HTML string into an arena-backed DOM.
//!
//! Every node is stored once in [`Document`] and addressed by its
//! [`NodeId`], which stays stable for the whole conversion and doubles as
//! the element identity used by counter scoping.
//!
//! The parser handles the controlled template subset: nested elements,
//! quoted/unquoted attributes, void elements, comments, doctypes, and raw
//! text bodies for `<style>` / `<script>`.

use std::collections::HashMap;

use crate::counters::ElementKey;

// ---------------------------------------------------------------------------
// DOM types
// ---------------------------------------------------------------------------

/// Index of a node inside its [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<NodeId> for ElementKey {
    fn from(id: NodeId) -> Self {
        ElementKey(id.0)
    }
}

/// Element tag and attributes. Tag names are lower-cased.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    pub tag: String,
    pub attributes: HashMap<String, String>,
}

impl ElementData {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id").filter(|id| !id.is_empty())
    }

    pub fn classes(&self) -> Vec<&str> {
        self.attributes
            .get("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn inline_style(&self) -> Option<&str> {
        self.attr("style")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub data: NodeData,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// A parsed document. Node 0 is a synthetic `#document` root element.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

const ROOT_TAG: &str = "#document";

/// Elements that never have children.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose body is kept as a single raw text child.
const RAW_TEXT_ELEMENTS: &[&str] = &["style", "script"];

impl Document {
    fn new() -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Element(ElementData::new(ROOT_TAG)),
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes[id.0].data {
            NodeData::Element(e) => Some(e),
            NodeData::Text(_) => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Text(t) => Some(t),
            NodeData::Element(_) => None,
        }
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// All node ids in document (pre-)order, root first.
    pub fn descendants(&self, from: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// The `<body>` element, or the root when the markup has none.
    pub fn body(&self) -> NodeId {
        self.descendants(self.root())
            .into_iter()
            .find(|&id| self.element(id).is_some_and(|e| e.tag == "body"))
            .unwrap_or_else(|| self.root())
    }

    /// First element carrying `id`.
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|&n| self.element(n).and_then(|e| e.id()) == Some(id))
    }

    /// Text of every `<style>` element, in document order.
    pub fn style_sheets(&self) -> Vec<String> {
        self.descendants(self.root())
            .into_iter()
            .filter(|&id| self.element(id).is_some_and(|e| e.tag == "style"))
            .map(|id| self.text_content(id))
            .collect()
    }

    /// Concatenated text of `id` and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|n| self.text(n))
            .collect()
    }

    fn push(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[id.0].data {
            NodeData::Element(e) => Some(e),
            NodeData::Text(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Parser – single pass over the markup with an explicit open-element stack
// ---------------------------------------------------------------------------

/// Parse an HTML string into a [`Document`].
///
/// Nesting depth never grows the call stack: open elements are tracked on a
/// `Vec`, so arbitrarily deep input only costs heap.
pub fn parse_html(html: &str) -> Document {
    let mut doc = Document::new();
    let mut parser = Parser::new(html);
    parser.run(&mut doc);
    doc
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    /// Elements whose closing tag has not been seen yet, innermost last.
    open: Vec<(NodeId, String)>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            open: Vec::new(),
        }
    }

    fn run(&mut self, doc: &mut Document) {
        loop {
            self.skip_whitespace_between_tags();
            if self.eof() {
                break;
            }
            if self.starts_with("</") {
                let tag = self.parse_closing_tag();
                self.close_element(&tag);
            } else if self.starts_with("<!--") {
                self.skip_past("-->");
            } else if self.starts_with("<!") || self.starts_with("<?") {
                self.skip_past(">");
            } else if self.starts_with("<") && self.peek_tag_start() {
                self.open_element(doc);
            } else {
                let parent = self.current_parent(doc);
                self.parse_text(doc, parent);
            }
        }
    }

    fn current_parent(&self, doc: &Document) -> NodeId {
        self.open.last().map_or(doc.root(), |(id, _)| *id)
    }

    /// Close the innermost open `tag` and everything opened inside it.
    fn close_element(&mut self, tag: &str) {
        match self.open.iter().rposition(|(_, open)| open == tag) {
            Some(index) => self.open.truncate(index),
            None => log::debug!("ignoring stray closing tag </{tag}>"),
        }
    }

    fn parse_text(&mut self, doc: &mut Document, parent: NodeId) {
        let start = self.pos;
        // A '<' that does not open a tag is literal text.
        if self.starts_with("<") {
            self.advance(1);
        }
        while !self.eof() && !self.starts_with("<") {
            self.advance(1);
        }
        let text = decode_entities(&self.input[start..self.pos]);
        doc.push(parent, NodeData::Text(text));
    }

    fn open_element(&mut self, doc: &mut Document) {
        self.advance(1); // '<'
        let tag = self.parse_name().to_ascii_lowercase();
        let parent = self.current_parent(doc);
        let id = doc.push(parent, NodeData::Element(ElementData::new(tag.clone())));

        loop {
            self.skip_whitespace();
            if self.eof() || self.starts_with(">") || self.starts_with("/>") {
                break;
            }
            let (key, value) = self.parse_attribute();
            if key.is_empty() {
                // Unparseable attribute byte; skip it.
                self.advance(1);
                continue;
            }
            if let Some(e) = doc.element_mut(id) {
                e.attributes.entry(key).or_insert(value);
            }
        }

        if self.starts_with("/>") {
            self.advance(2);
            return;
        }
        if self.starts_with(">") {
            self.advance(1);
        }
        if VOID_ELEMENTS.contains(&tag.as_str()) {
            return;
        }

        if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
            let close = format!("</{tag}");
            let start = self.pos;
            let end = self.input[start..]
                .to_ascii_lowercase()
                .find(&close)
                .map_or(self.input.len(), |i| start + i);
            let body = &self.input[start..end];
            if !body.is_empty() {
                doc.push(id, NodeData::Text(body.to_string()));
            }
            self.pos = end;
            if self.starts_with("</") {
                self.parse_closing_tag();
            }
            return;
        }

        self.open.push((id, tag));
    }

    /// Consume `</name ...>` and return the lower-cased name.
    fn parse_closing_tag(&mut self) -> String {
        self.advance(2);
        let tag = self.parse_name().to_ascii_lowercase();
        self.skip_past(">");
        tag
    }

    fn parse_name(&mut self) -> String {
        let start = self.pos;
        while !self.eof() {
            let c = self.current_char();
            if c.is_alphanumeric() || c == '-' || c == '_' || c == ':' {
                self.advance(1);
            } else {
                break;
            }
        }
        self.input[start..self.pos].to_string()
    }

    fn parse_attribute(&mut self) -> (String, String) {
        let key = self.parse_name().to_ascii_lowercase();
        self.skip_whitespace();
        if !self.starts_with("=") {
            return (key, String::new());
        }
        self.advance(1);
        self.skip_whitespace();
        (key, self.parse_attr_value())
    }

    fn parse_attr_value(&mut self) -> String {
        for quote in ["\"", "'"] {
            if self.starts_with(quote) {
                self.advance(1);
                let start = self.pos;
                while !self.eof() && !self.starts_with(quote) {
                    self.advance(1);
                }
                let value = decode_entities(&self.input[start..self.pos]);
                if !self.eof() {
                    self.advance(1);
                }
                return value;
            }
        }
        let start = self.pos;
        while !self.eof() {
            let c = self.current_char();
            if c.is_whitespace() || c == '>' || self.starts_with("/>") {
                break;
            }
            self.advance(1);
        }
        decode_entities(&self.input[start..self.pos])
    }

    fn peek_tag_start(&self) -> bool {
        self.input[self.pos + 1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
    }

    fn skip_whitespace(&mut self) {
        while !self.eof() && self.current_char().is_whitespace() {
            self.advance(1);
        }
    }

    /// Skip whitespace-only runs between tags; keep whitespace inside text.
    fn skip_whitespace_between_tags(&mut self) {
        let saved = self.pos;
        self.skip_whitespace();
        if !self.eof() && !self.starts_with("<") {
            self.pos = saved;
        }
    }

    fn skip_past(&mut self, terminator: &str) {
        match self.input[self.pos..].find(terminator) {
            Some(i) => self.pos += i + terminator.len(),
            None => self.pos = self.input.len(),
        }
    }

    fn starts_with(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn current_char(&self) -> char {
        self.input[self.pos..].chars().next().unwrap_or('\0')
    }

    fn advance(&mut self, n: usize) {
        for _ in 0..n {
            if let Some(c) = self.input[self.pos..].chars().next() {
                self.pos += c.len_utf8();
            }
        }
    }
}

fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", "\u{00A0}")
        .replace("&amp;", "&")
}
