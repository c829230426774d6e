//! Style resolver – runs the cascade for the counter-related properties and
//! produces one [`ComputedStyle`] per element.
//!
//! Order of application: inherited values, tag defaults, HTML list
//! attributes (`start`, `reversed`, `value`), stylesheet rules (by
//! specificity, then source order), inline `style` attribute.

use cssparser::{Parser, ParserInput, Token};

use crate::content::{parse_content, ContentItem, ContentValue};
use crate::counters::GlyphStyle;
use crate::dom::{Document, ElementData, NodeId};
use crate::stylesheet::{parse_declarations, Declaration, PseudoElement, Stylesheet};

/// Name of the counter implicitly incremented by list items.
pub const LIST_ITEM: &str = "list-item";

/// Resolved counter-related style for a single element.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    pub display: Display,
    pub counter_reset: Vec<(String, i32)>,
    pub counter_set: Vec<(String, i32)>,
    pub counter_increment: Vec<(String, i32)>,
    /// Inherited.
    pub list_style_type: GlyphStyle,
    pub page_break_before: bool,
    pub page_break_after: bool,
    /// `<ol reversed>`: child list items count down.
    pub reversed_list: bool,
    pub before: ContentValue,
    pub after: ContentValue,
    pub marker: ContentValue,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: Display::Block,
            counter_reset: Vec::new(),
            counter_set: Vec::new(),
            counter_increment: Vec::new(),
            list_style_type: GlyphStyle::Disc,
            page_break_before: false,
            page_break_after: false,
            reversed_list: false,
            before: ContentValue::Normal,
            after: ContentValue::Normal,
            marker: ContentValue::Normal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Block,
    Inline,
    ListItem,
    None,
}

impl ComputedStyle {
    pub fn content(&self, pseudo: PseudoElement) -> &ContentValue {
        match pseudo {
            PseudoElement::Marker => &self.marker,
            PseudoElement::Before => &self.before,
            PseudoElement::After => &self.after,
        }
    }

    /// The `::marker` content actually generated: the authored value, or the
    /// default marker of a list item.
    pub fn marker_content(&self) -> ContentValue {
        if self.display != Display::ListItem {
            return ContentValue::None;
        }
        match &self.marker {
            ContentValue::Normal => default_marker(self.list_style_type),
            authored => authored.clone(),
        }
    }
}

fn default_marker(style: GlyphStyle) -> ContentValue {
    match style {
        GlyphStyle::None => ContentValue::None,
        s => {
            let suffix = if s.is_symbolic() { " " } else { ". " };
            ContentValue::Items(vec![
                ContentItem::Counter {
                    name: LIST_ITEM.to_string(),
                    style: s,
                },
                ContentItem::String(suffix.to_string()),
            ])
        }
    }
}

// ---------------------------------------------------------------------------
// Style resolution
// ---------------------------------------------------------------------------

/// Computed styles of every element of a document, indexed by [`NodeId`].
#[derive(Debug, Clone, Default)]
pub struct StyleMap {
    styles: Vec<Option<ComputedStyle>>,
}

impl StyleMap {
    pub fn get(&self, id: NodeId) -> Option<&ComputedStyle> {
        self.styles.get(id.index()).and_then(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.styles.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolve styles top-down for the whole document.
pub fn compute_styles(document: &Document, sheet: &Stylesheet) -> StyleMap {
    let mut styles: Vec<Option<ComputedStyle>> = vec![None; document.len()];

    // Pre-order guarantees a parent is resolved before its children.
    for id in document.descendants(document.root()) {
        let Some(element) = document.element(id) else {
            continue;
        };
        let parent = document
            .parent(id)
            .and_then(|p| styles[p.index()].as_ref());
        let list_items = document
            .children(id)
            .iter()
            .filter(|&&child| document.element(child).is_some_and(|e| e.tag == "li"))
            .count();
        styles[id.index()] = Some(resolve_style(element, parent, sheet, list_items));
    }

    StyleMap { styles }
}

/// Resolve the style for an element, inheriting `list-style-type` from its
/// parent. `list_items` is the number of `<li>` children, the first value
/// of an `<ol reversed>` without `start`.
pub fn resolve_style(
    element: &ElementData,
    parent: Option<&ComputedStyle>,
    sheet: &Stylesheet,
    list_items: usize,
) -> ComputedStyle {
    let mut style = ComputedStyle::default();
    if let Some(p) = parent {
        style.list_style_type = p.list_style_type;
    }
    apply_tag_defaults(&mut style, &element.tag);
    apply_list_attributes(&mut style, element, list_items);

    let mut explicit_list_item = false;
    let inline = element
        .inline_style()
        .map(parse_declarations)
        .unwrap_or_default();
    let author = sheet.matching_declarations(element, None);
    for decl in author.into_iter().chain(inline.iter()) {
        apply_css_property(&mut style, decl);
        if decl.property == "counter-increment" {
            explicit_list_item = style.counter_increment.iter().any(|(n, _)| n == LIST_ITEM);
        }
    }

    for pseudo in [
        PseudoElement::Marker,
        PseudoElement::Before,
        PseudoElement::After,
    ] {
        for decl in sheet.matching_declarations(element, Some(pseudo)) {
            if decl.property == "content" {
                let value = parse_content(&decl.value);
                match pseudo {
                    PseudoElement::Marker => style.marker = value,
                    PseudoElement::Before => style.before = value,
                    PseudoElement::After => style.after = value,
                }
            }
        }
    }

    if style.display == Display::ListItem && !explicit_list_item {
        let delta = if parent.is_some_and(|p| p.reversed_list) { -1 } else { 1 };
        style.counter_increment.push((LIST_ITEM.to_string(), delta));
    }

    style
}

/// User-agent defaults for the tags that matter to counters.
fn apply_tag_defaults(s: &mut ComputedStyle, tag: &str) {
    match tag {
        "ol" => {
            s.counter_reset = vec![(LIST_ITEM.to_string(), 0)];
            s.list_style_type = GlyphStyle::Decimal;
        }
        "ul" | "menu" => {
            s.counter_reset = vec![(LIST_ITEM.to_string(), 0)];
            s.list_style_type = GlyphStyle::Disc;
        }
        "li" => s.display = Display::ListItem,
        "head" | "style" | "script" | "title" | "meta" | "link" => s.display = Display::None,
        "span" | "a" | "em" | "strong" | "b" | "i" | "code" | "small" | "sup" | "sub" => {
            s.display = Display::Inline
        }
        _ => {}
    }
}

/// Presentational hints of `<ol start>`, `<ol reversed>` and `<li value>`.
fn apply_list_attributes(s: &mut ComputedStyle, element: &ElementData, list_items: usize) {
    match element.tag.as_str() {
        "ol" => {
            let start = element.attr("start").and_then(parse_integer_attr);
            if element.attr("reversed").is_some() {
                let first = start.unwrap_or_else(|| i32::try_from(list_items).unwrap_or(i32::MAX));
                s.counter_reset = vec![(LIST_ITEM.to_string(), first.saturating_add(1))];
                s.reversed_list = true;
            } else if let Some(first) = start {
                s.counter_reset = vec![(LIST_ITEM.to_string(), first.saturating_sub(1))];
            }
        }
        "li" => {
            if let Some(value) = element.attr("value").and_then(parse_integer_attr) {
                s.counter_set = vec![(LIST_ITEM.to_string(), value)];
            }
        }
        _ => {}
    }
}

fn parse_integer_attr(value: &str) -> Option<i32> {
    match value.trim().parse() {
        Ok(n) => Some(n),
        Err(_) => {
            log::debug!("ignoring non-integer list attribute '{value}'");
            None
        }
    }
}

fn apply_css_property(s: &mut ComputedStyle, decl: &Declaration) {
    let val = decl.value.trim();
    match decl.property.as_str() {
        "display" => {
            s.display = match val.to_ascii_lowercase().as_str() {
                "none" => Display::None,
                "list-item" => Display::ListItem,
                "inline" | "inline-block" => Display::Inline,
                _ => Display::Block,
            }
        }
        "counter-reset" => {
            if let Some(list) = parse_counter_list(val, 0) {
                s.counter_reset = list;
            }
        }
        "counter-set" => {
            if let Some(list) = parse_counter_list(val, 0) {
                s.counter_set = list;
            }
        }
        "counter-increment" => {
            if let Some(list) = parse_counter_list(val, 1) {
                s.counter_increment = list;
            }
        }
        "list-style-type" => match GlyphStyle::from_keyword(val) {
            Some(style) => s.list_style_type = style,
            None => log::warn!("unknown list-style-type '{val}'"),
        },
        "list-style" => {
            if let Some(style) = val.split_whitespace().find_map(GlyphStyle::from_keyword) {
                s.list_style_type = style;
            }
        }
        "page-break-before" | "break-before" => s.page_break_before = is_forced_break(val),
        "page-break-after" | "break-after" => s.page_break_after = is_forced_break(val),
        "content" => {
            log::debug!("ignoring 'content' on an element box");
        }
        _ => {}
    }
}

fn is_forced_break(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "always" | "page" | "left" | "right" | "recto" | "verso"
    )
}

/// Parse `name [<integer>]...` lists as used by `counter-reset`,
/// `counter-set` and `counter-increment`.
///
/// Returns `None` for an invalid value, which leaves the property untouched.
pub fn parse_counter_list(value: &str, default_value: i32) -> Option<Vec<(String, i32)>> {
    if value.trim().eq_ignore_ascii_case("none") {
        return Some(Vec::new());
    }

    let mut input = ParserInput::new(value);
    let mut parser = Parser::new(&mut input);
    let mut list: Vec<(String, i32)> = Vec::new();
    let mut has_value = true;

    loop {
        let token = match parser.next() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        match token {
            Token::Ident(name) => {
                if matches!(
                    name.to_ascii_lowercase().as_str(),
                    "none" | "inherit" | "initial" | "unset" | "default"
                ) {
                    return None;
                }
                list.push((name.to_string(), default_value));
                has_value = false;
            }
            Token::Number {
                int_value: Some(v), ..
            } if !has_value => {
                if let Some(last) = list.last_mut() {
                    last.1 = v;
                }
                has_value = true;
            }
            _ => return None,
        }
    }

    if list.is_empty() {
        return None;
    }
    Some(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    fn styles_for(html: &str) -> (Document, StyleMap) {
        let doc = parse_html(html);
        let mut sheet = Stylesheet::default();
        for css in doc.style_sheets() {
            sheet.append(&css);
        }
        let styles = compute_styles(&doc, &sheet);
        (doc, styles)
    }

    fn style_of<'a>(doc: &Document, styles: &'a StyleMap, id: &str) -> &'a ComputedStyle {
        let node = doc.find_by_id(id).expect("element");
        styles.get(node).expect("style")
    }

    #[test]
    fn counter_lists() {
        assert_eq!(
            parse_counter_list("a 3 b", 0),
            Some(vec![("a".into(), 3), ("b".into(), 0)])
        );
        assert_eq!(
            parse_counter_list("a -1 b", 1),
            Some(vec![("a".into(), -1), ("b".into(), 1)])
        );
        assert_eq!(parse_counter_list("none", 1), Some(vec![]));
        assert_eq!(parse_counter_list("3 a", 0), None);
        assert_eq!(parse_counter_list("a 1 2", 0), None);
        assert_eq!(parse_counter_list("a 1.5", 0), None);
    }

    #[test]
    fn list_defaults() {
        let (doc, styles) = styles_for(
            r#"<ol id="o"><li id="a">x</li></ol><ul id="u"><li id="b">y</li></ul>"#,
        );
        let ol = style_of(&doc, &styles, "o");
        assert_eq!(ol.counter_reset, vec![(LIST_ITEM.to_string(), 0)]);
        let a = style_of(&doc, &styles, "a");
        assert_eq!(a.display, Display::ListItem);
        assert_eq!(a.list_style_type, GlyphStyle::Decimal);
        assert_eq!(a.counter_increment, vec![(LIST_ITEM.to_string(), 1)]);
        assert_eq!(
            a.marker_content().items(),
            &[
                ContentItem::Counter {
                    name: LIST_ITEM.into(),
                    style: GlyphStyle::Decimal
                },
                ContentItem::String(". ".into())
            ]
        );
        let b = style_of(&doc, &styles, "b");
        assert_eq!(b.list_style_type, GlyphStyle::Disc);
        assert_eq!(
            b.marker_content().items(),
            &[
                ContentItem::Counter {
                    name: LIST_ITEM.into(),
                    style: GlyphStyle::Disc
                },
                ContentItem::String(" ".into())
            ]
        );
    }

    #[test]
    fn cascade_and_inline() {
        let (doc, styles) = styles_for(
            r#"<style>
                 h2 { counter-increment: section; page-break-before: always }
                 .intro { counter-increment: section 5 }
                 h2::before { content: counter(section) ". " }
                 ol { list-style-type: lower-roman }
               </style>
               <h2 id="x" class="intro">A</h2>
               <h2 id="y" style="counter-increment: none">B</h2>
               <ol><li id="z" style="list-style-type: upper-latin"></li></ol>"#,
        );
        let x = style_of(&doc, &styles, "x");
        assert_eq!(x.counter_increment, vec![("section".into(), 5)]);
        assert!(x.page_break_before);
        assert!(x.before.generates_box());
        assert_eq!(x.after, ContentValue::Normal);
        assert_eq!(x.marker_content(), ContentValue::None);

        let y = style_of(&doc, &styles, "y");
        assert!(y.counter_increment.is_empty());

        let z = style_of(&doc, &styles, "z");
        assert_eq!(z.list_style_type, GlyphStyle::UpperLatin);
    }

    #[test]
    fn explicit_list_item_increment_suppresses_implicit_one() {
        let (doc, styles) = styles_for(
            r#"<ol><li id="a" style="counter-increment: list-item 2"></li>
               <li id="b" style="counter-increment: other"></li></ol>"#,
        );
        assert_eq!(
            style_of(&doc, &styles, "a").counter_increment,
            vec![(LIST_ITEM.to_string(), 2)]
        );
        assert_eq!(
            style_of(&doc, &styles, "b").counter_increment,
            vec![("other".to_string(), 1), (LIST_ITEM.to_string(), 1)]
        );
    }

    #[test]
    fn list_attributes_map_to_counters() {
        let (doc, styles) = styles_for(
            r#"<ol id="s" start="5"><li id="v" value="10">a</li></ol>
               <ol id="r" reversed><li id="d">a</li><li>b</li><li>c</li></ol>
               <ol id="rs" reversed start="10"><li>a</li></ol>
               <ol id="bad" start="x"><li value="2.5" id="w">a</li></ol>"#,
        );
        assert_eq!(
            style_of(&doc, &styles, "s").counter_reset,
            vec![(LIST_ITEM.to_string(), 4)]
        );
        assert_eq!(
            style_of(&doc, &styles, "v").counter_set,
            vec![(LIST_ITEM.to_string(), 10)]
        );

        let reversed = style_of(&doc, &styles, "r");
        assert!(reversed.reversed_list);
        assert_eq!(reversed.counter_reset, vec![(LIST_ITEM.to_string(), 4)]);
        assert_eq!(
            style_of(&doc, &styles, "d").counter_increment,
            vec![(LIST_ITEM.to_string(), -1)]
        );
        assert_eq!(
            style_of(&doc, &styles, "rs").counter_reset,
            vec![(LIST_ITEM.to_string(), 11)]
        );

        assert_eq!(
            style_of(&doc, &styles, "bad").counter_reset,
            vec![(LIST_ITEM.to_string(), 0)]
        );
        assert!(style_of(&doc, &styles, "w").counter_set.is_empty());
    }

    #[test]
    fn author_rules_override_list_attributes() {
        let (doc, styles) = styles_for(
            r#"<style>ol { counter-reset: list-item 20 }</style><ol id="o" start="3"></ol>"#,
        );
        assert_eq!(
            style_of(&doc, &styles, "o").counter_reset,
            vec![(LIST_ITEM.to_string(), 20)]
        );
    }

    #[test]
    fn hidden_elements() {
        let (doc, styles) = styles_for("<head><title>t</title></head><body><p id='p'></p></body>");
        let head = doc.children(doc.root())[0];
        assert_eq!(styles.get(head).map(|s| s.display), Some(Display::None));
        assert_eq!(style_of(&doc, &styles, "p").display, Display::Block);
    }
}
