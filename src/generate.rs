//! Content generation – the depth-first walk that drives the counter engine.
//!
//! For every element, in document order:
//!
//! 1. `counter-reset`, `counter-increment`, `counter-set`
//! 2. capture pending `target-counter()` references to its `id`
//! 3. `::marker` and `::before` content
//! 4. enter the element's scope and visit the children
//! 5. `::after` content, then leave the scope
//!
//! Target references are registered before the walk starts, so a reference
//! to an element that was already visited still resolves. References to
//! elements further down the document are left as deferred slots and filled
//! in once the walk is complete.

use std::collections::HashSet;

use crate::content::{
    strip_hash, ContentItem, ContentValue, CounterTarget, CLOSE_QUOTE, OPEN_QUOTE,
};
use crate::content_tree::{ContentNode, ContentTree};
use crate::counters::{CounterContext, GlyphStyle, PageCounterPlaceholder};
use crate::dom::{Document, ElementData, NodeData, NodeId};
use crate::error::{Error, Result};
use crate::style::{ComputedStyle, Display, StyleMap};
use crate::stylesheet::PseudoElement;

/// Counter names that only exist after pagination.
const PAGE: &str = "page";
const PAGES: &str = "pages";

pub const DEFAULT_MAX_DEPTH: usize = 512;

// ---------------------------------------------------------------------------
// Draft tree
// ---------------------------------------------------------------------------

/// A `target-counter(s)` reference that was not resolvable when evaluated.
#[derive(Debug, Clone)]
struct DeferredRef {
    id: String,
    name: String,
    separator: Option<String>,
    style: GlyphStyle,
}

/// The tree under construction; deferred references are filled in by
/// [`Draft::finish`].
#[derive(Debug)]
enum Draft {
    Element {
        tag: String,
        id: Option<String>,
        pseudo: Option<PseudoElement>,
        page_break_before: bool,
        page_break_after: bool,
        children: Vec<Draft>,
    },
    Text(String),
    PageCounter(PageCounterPlaceholder),
    Deferred(DeferredRef),
}

impl Draft {
    fn finish(self, ctx: &mut CounterContext) -> ContentNode {
        match self {
            Draft::Element {
                tag,
                id,
                pseudo,
                page_break_before,
                page_break_after,
                children,
            } => {
                let mut out: Vec<ContentNode> = Vec::with_capacity(children.len());
                for child in children {
                    push_merged(&mut out, child.finish(ctx));
                }
                ContentNode::Element {
                    tag,
                    id,
                    pseudo,
                    page_break_before,
                    page_break_after,
                    children: out,
                }
            }
            Draft::Text(text) => ContentNode::Text(text),
            Draft::PageCounter(p) => ContentNode::PageCounter(p),
            Draft::Deferred(r) => ContentNode::Text(resolve_deferred(ctx, &r)),
        }
    }
}

/// Append `node`, joining it with a preceding text node.
fn push_merged(out: &mut Vec<ContentNode>, node: ContentNode) {
    if let ContentNode::Text(text) = &node {
        if text.is_empty() {
            return;
        }
        if let Some(ContentNode::Text(prev)) = out.last_mut() {
            prev.push_str(text);
            return;
        }
    }
    out.push(node);
}

fn resolve_deferred(ctx: &mut CounterContext, r: &DeferredRef) -> String {
    let resolved = match &r.separator {
        Some(sep) => ctx.resolve_target_counters(&r.id, &r.name, sep, r.style),
        None => ctx.resolve_target_counter(&r.id, &r.name, r.style),
    };
    resolved.unwrap_or_else(|| {
        log::warn!(
            "target-counter reference to #{} ({}) never resolved",
            r.id,
            r.name
        );
        String::new()
    })
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Walks a styled document and produces its [`ContentTree`].
pub struct Generator<'a> {
    document: &'a Document,
    styles: &'a StyleMap,
    max_depth: usize,
    list_markers: bool,
    glyph_styles: HashSet<GlyphStyle>,
}

impl<'a> Generator<'a> {
    pub fn new(document: &'a Document, styles: &'a StyleMap) -> Self {
        Self {
            document,
            styles,
            max_depth: DEFAULT_MAX_DEPTH,
            list_markers: true,
            glyph_styles: HashSet::new(),
        }
    }

    /// Maximum element nesting below `<body>`.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Whether list items get `::marker` boxes.
    pub fn list_markers(mut self, enabled: bool) -> Self {
        self.list_markers = enabled;
        self
    }

    /// Generate the content of the document body.
    ///
    /// `ctx` should be fresh; it holds the counter state of this document
    /// only.
    pub fn run(mut self, ctx: &mut CounterContext) -> Result<ContentTree> {
        let body = self.document.body();
        self.register_targets(ctx, body);

        let draft = self.visit(ctx, body, 0)?;
        debug_assert_eq!(ctx.open_scopes(), 0);

        let mut tree = ContentTree::new(String::new());
        let nodes = match draft {
            Some(Draft::Element { children, .. }) if body == self.document.root() => children,
            Some(draft) => vec![draft],
            None => Vec::new(),
        };
        for node in nodes {
            push_merged(&mut tree.nodes, node.finish(ctx));
        }

        for pending in ctx.targets().pending_ids() {
            log::debug!("target #{pending} referenced but not found in the document");
        }

        tree.glyph_styles = GlyphStyle::ALL
            .into_iter()
            .filter(|s| self.glyph_styles.contains(s))
            .collect();
        Ok(tree)
    }

    fn style_of(&self, id: NodeId) -> Option<&'a ComputedStyle> {
        self.styles.get(id)
    }

    /// Query every statically known target reference once so the registry
    /// tracks it from the start of the walk.
    fn register_targets(&self, ctx: &mut CounterContext, from: NodeId) {
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            let (Some(element), Some(style)) = (self.document.element(id), self.style_of(id))
            else {
                continue;
            };
            if style.display == Display::None {
                continue;
            }
            let marker = style.marker_content();
            let values = [&marker, &style.before, &style.after];
            for item in values.into_iter().flat_map(ContentValue::items) {
                match item {
                    ContentItem::TargetCounter {
                        target,
                        name,
                        style,
                    } if name != PAGE => {
                        if let Some(target_id) = target_id(target, element) {
                            ctx.resolve_target_counter(&target_id, name, *style);
                        }
                    }
                    ContentItem::TargetCounters {
                        target,
                        name,
                        separator,
                        style,
                    } if name != PAGE => {
                        if let Some(target_id) = target_id(target, element) {
                            ctx.resolve_target_counters(&target_id, name, separator, *style);
                        }
                    }
                    _ => {}
                }
            }
            stack.extend(self.document.children(id).iter().rev().copied());
        }
    }

    fn visit(
        &mut self,
        ctx: &mut CounterContext,
        id: NodeId,
        depth: usize,
    ) -> Result<Option<Draft>> {
        let element = match &self.document.node(id).data {
            NodeData::Text(text) => {
                if text.trim().is_empty() {
                    return Ok(None);
                }
                return Ok(Some(Draft::Text(text.clone())));
            }
            NodeData::Element(element) => element,
        };

        if depth > self.max_depth {
            return Err(Error::DepthLimit {
                limit: self.max_depth,
            });
        }

        let default_style = ComputedStyle::default();
        let style = self.style_of(id).unwrap_or(&default_style);
        if style.display == Display::None {
            return Ok(None);
        }

        for (name, value) in &style.counter_reset {
            ctx.reset(name, *value);
        }
        for (name, delta) in &style.counter_increment {
            ctx.increment(name, *delta);
        }
        for (name, value) in &style.counter_set {
            ctx.set(name, *value);
        }
        if let Some(element_id) = element.id() {
            ctx.on_visit_element_with_id(element_id);
        }

        let mut children = Vec::new();
        if self.list_markers {
            let marker = style.marker_content();
            children.extend(self.pseudo(ctx, element, PseudoElement::Marker, &marker));
        }
        let before = style.content(PseudoElement::Before);
        children.extend(self.pseudo(ctx, element, PseudoElement::Before, before));

        {
            let mut scope = ctx.enter(id.into());
            for &child in self.document.children(id) {
                if let Some(draft) = self.visit(&mut scope, child, depth + 1)? {
                    children.push(draft);
                }
            }
            let after = style.content(PseudoElement::After);
            children.extend(self.pseudo(&mut scope, element, PseudoElement::After, after));
        }

        Ok(Some(Draft::Element {
            tag: element.tag.clone(),
            id: element.id().map(str::to_string),
            pseudo: None,
            page_break_before: style.page_break_before,
            page_break_after: style.page_break_after,
            children,
        }))
    }

    fn pseudo(
        &mut self,
        ctx: &mut CounterContext,
        element: &ElementData,
        kind: PseudoElement,
        value: &ContentValue,
    ) -> Option<Draft> {
        if !value.generates_box() {
            return None;
        }
        let children = value
            .items()
            .iter()
            .filter_map(|item| self.evaluate(ctx, element, item))
            .collect();
        Some(Draft::Element {
            tag: element.tag.clone(),
            id: None,
            pseudo: Some(kind),
            page_break_before: false,
            page_break_after: false,
            children,
        })
    }

    fn evaluate(
        &mut self,
        ctx: &mut CounterContext,
        element: &ElementData,
        item: &ContentItem,
    ) -> Option<Draft> {
        let draft = match item {
            ContentItem::String(text) => Draft::Text(text.clone()),
            ContentItem::OpenQuote => Draft::Text(OPEN_QUOTE.to_string()),
            ContentItem::CloseQuote => Draft::Text(CLOSE_QUOTE.to_string()),
            ContentItem::Attr(name) => {
                Draft::Text(element.attr(name).unwrap_or_default().to_string())
            }
            ContentItem::Counter { name, style } | ContentItem::Counters { name, style, .. }
                if name == PAGE =>
            {
                self.glyph_styles.insert(*style);
                Draft::PageCounter(PageCounterPlaceholder::current_page(*style))
            }
            ContentItem::Counter { name, style } | ContentItem::Counters { name, style, .. }
                if name == PAGES =>
            {
                self.glyph_styles.insert(*style);
                Draft::PageCounter(PageCounterPlaceholder::total_pages(*style))
            }
            ContentItem::Counter { name, style } => {
                self.glyph_styles.insert(*style);
                Draft::Text(ctx.resolve(name, *style))
            }
            ContentItem::Counters {
                name,
                separator,
                style,
            } => {
                self.glyph_styles.insert(*style);
                Draft::Text(ctx.resolve_list(name, separator, *style))
            }
            ContentItem::TargetCounter {
                target,
                name,
                style,
            } => {
                self.glyph_styles.insert(*style);
                let id = target_id(target, element)?;
                if name == PAGE {
                    Draft::PageCounter(PageCounterPlaceholder::page_of(id, *style))
                } else {
                    match ctx.resolve_target_counter(&id, name, *style) {
                        Some(text) => Draft::Text(text),
                        None => Draft::Deferred(DeferredRef {
                            id,
                            name: name.clone(),
                            separator: None,
                            style: *style,
                        }),
                    }
                }
            }
            ContentItem::TargetCounters {
                target,
                name,
                separator,
                style,
            } => {
                self.glyph_styles.insert(*style);
                let id = target_id(target, element)?;
                if name == PAGE {
                    Draft::PageCounter(PageCounterPlaceholder::page_of(id, *style))
                } else {
                    match ctx.resolve_target_counters(&id, name, separator, *style) {
                        Some(text) => Draft::Text(text),
                        None => Draft::Deferred(DeferredRef {
                            id,
                            name: name.clone(),
                            separator: Some(separator.clone()),
                            style: *style,
                        }),
                    }
                }
            }
        };
        Some(draft)
    }
}

/// The element id a target reference points at, if it names one.
fn target_id(target: &CounterTarget, element: &ElementData) -> Option<String> {
    let raw = match target {
        CounterTarget::Id(id) => id.as_str(),
        CounterTarget::Attr(name) => match element.attr(name) {
            Some(value) => strip_hash(value),
            None => {
                log::warn!("<{}> has no '{name}' attribute for target-counter()", element.tag);
                return None;
            }
        },
    };
    if raw.is_empty() {
        return None;
    }
    Some(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;
    use crate::style::compute_styles;
    use crate::stylesheet::Stylesheet;

    fn generate(html: &str) -> ContentTree {
        try_generate(html, DEFAULT_MAX_DEPTH).unwrap()
    }

    fn try_generate(html: &str, max_depth: usize) -> Result<ContentTree> {
        let doc = parse_html(html);
        let mut sheet = Stylesheet::default();
        for css in doc.style_sheets() {
            sheet.append(&css);
        }
        let styles = compute_styles(&doc, &sheet);
        let mut ctx = CounterContext::new();
        let tree = Generator::new(&doc, &styles)
            .max_depth(max_depth)
            .run(&mut ctx);
        assert_eq!(ctx.open_scopes(), 0);
        tree
    }

    #[test]
    fn ordered_list_markers() {
        let tree = generate("<ol><li>a</li><li>b</li><li>c</li></ol>");
        assert_eq!(tree.text(), "1. a2. b3. c");
        assert_eq!(tree.glyph_styles, vec![GlyphStyle::Decimal]);
    }

    #[test]
    fn nested_lists_with_counters() {
        let tree = generate(
            r#"<style>li::before { content: counters(list-item, ".") " " }</style>
               <body><ol>
                 <li>a<ol><li>b</li><li>c</li></ol></li>
                 <li>d</li>
               </ol></body>"#,
        );
        assert_eq!(tree.text(), "1. 1 a1. 1.1 b2. 1.2 c2. 2 d");
    }

    #[test]
    fn sections_reset_subsections() {
        let tree = generate(
            r#"<style>
                 body { counter-reset: chapter }
                 h1 { counter-increment: chapter; counter-reset: section }
                 h2 { counter-increment: section }
                 h1::before { content: counter(chapter, upper-roman) ". " }
                 h2::before { content: counter(chapter) "." counter(section) " " }
               </style>
               <body><h1>A</h1><h2>x</h2><h2>y</h2><h1>B</h1><h2>z</h2></body>"#,
        );
        assert_eq!(tree.text(), "I. A1.1 x1.2 yII. B2.1 z");
    }

    #[test]
    fn backward_and_forward_target_references() {
        let tree = generate(
            r##"<style>
                 figure { counter-increment: fig }
                 a::after { content: " (see figure " target-counter(attr(href), fig) ")" }
               </style>
               <body>
                 <figure id="one"></figure>
                 <p><a href="#one">back</a> <a href="#two">ahead</a></p>
                 <figure id="two"></figure>
                 <a href="#missing">nowhere</a>
               </body>"##,
        );
        let text = tree.text();
        assert!(text.contains("back (see figure 1)"), "{text}");
        assert!(text.contains("ahead (see figure 2)"), "{text}");
        assert!(text.contains("nowhere (see figure )"), "{text}");
    }

    #[test]
    fn page_counters_become_placeholders() {
        let tree = generate(
            r##"<style>
                 .toc::after { content: " p. " target-counter("#end", page) }
                 footer::before { content: counter(page) " of " counter(pages, lower-roman) }
               </style>
               <body><p class="toc">End</p><footer></footer><p id="end">x</p></body>"##,
        );
        assert_eq!(tree.text(), "End p. {page:#end}{page} of {pages}x");
        let pages = tree.page_counters();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[2].glyph_style(), GlyphStyle::LowerRoman);
    }

    #[test]
    fn hidden_elements_have_no_counter_effects() {
        let tree = generate(
            r#"<ol><li>a</li><li style="display: none">hidden</li><li>b</li></ol>"#,
        );
        assert_eq!(tree.text(), "1. a2. b");
    }

    #[test]
    fn counter_set_and_markers_disabled() {
        let doc = parse_html(
            r#"<ol><li>a</li><li style="counter-set: list-item 9">b</li><li>c</li></ol>"#,
        );
        let styles = compute_styles(&doc, &Stylesheet::default());
        let mut ctx = CounterContext::new();
        let tree = Generator::new(&doc, &styles).run(&mut ctx).unwrap();
        // the implicit increment runs first, then the set wins
        assert_eq!(tree.text(), "1. a9. b10. c");

        let mut ctx = CounterContext::new();
        let tree = Generator::new(&doc, &styles)
            .list_markers(false)
            .run(&mut ctx)
            .unwrap();
        assert_eq!(tree.text(), "abc");
    }

    #[test]
    fn html_list_attributes() {
        let tree = generate(
            r#"<ol start="3"><li>a</li><li value="7">b</li><li>c</li></ol>
               <ol reversed><li>x</li><li>y</li></ol>"#,
        );
        assert_eq!(tree.text(), "3. a7. b8. c2. x1. y");
    }

    #[test]
    fn depth_limit_closes_scopes() {
        let html = "<div>".repeat(10) + &"</div>".repeat(10);
        assert!(try_generate(&html, 20).is_ok());
        match try_generate(&html, 5) {
            Err(Error::DepthLimit { limit }) => assert_eq!(limit, 5),
            other => panic!("expected depth limit, got {other:?}"),
        }
    }

    #[test]
    fn element_ids_and_breaks_are_kept() {
        let tree = generate(r#"<h1 id="t" style="page-break-after: always">T</h1>"#);
        match &tree.nodes[0] {
            ContentNode::Element {
                tag,
                id,
                page_break_after,
                ..
            } => {
                assert_eq!(tag, "h1");
                assert_eq!(id.as_deref(), Some("t"));
                assert!(*page_break_after);
            }
            other => panic!("unexpected node {other:?}"),
        }
    }
}
