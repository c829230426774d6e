//! The `content` property: strings, counter functions and quotes.
//!
//! A value is tokenized with `cssparser`; each top-level token or function
//! call becomes one [`ContentItem`]. An item that can not be understood is
//! dropped on its own, the rest of the value survives.

use cssparser::{ParseError, Parser, ParserInput, Token};

use crate::counters::GlyphStyle;

/// Where a `target-counter()` points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterTarget {
    /// A literal reference, `"#id"` or `url(#id)`, stored without the `#`.
    Id(String),
    /// `attr(name)`: the id is read from the element's attribute.
    Attr(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentItem {
    String(String),
    Counter {
        name: String,
        style: GlyphStyle,
    },
    Counters {
        name: String,
        separator: String,
        style: GlyphStyle,
    },
    TargetCounter {
        target: CounterTarget,
        name: String,
        style: GlyphStyle,
    },
    TargetCounters {
        target: CounterTarget,
        name: String,
        separator: String,
        style: GlyphStyle,
    },
    Attr(String),
    OpenQuote,
    CloseQuote,
}

/// Parsed value of a `content` declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ContentValue {
    #[default]
    Normal,
    None,
    Items(Vec<ContentItem>),
}

impl ContentValue {
    pub fn items(&self) -> &[ContentItem] {
        match self {
            ContentValue::Items(items) => items,
            _ => &[],
        }
    }

    /// Whether this value generates a box at all.
    pub fn generates_box(&self) -> bool {
        matches!(self, ContentValue::Items(items) if !items.is_empty())
    }
}

pub const OPEN_QUOTE: &str = "\u{201C}";
pub const CLOSE_QUOTE: &str = "\u{201D}";

pub fn parse_content(text: &str) -> ContentValue {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("normal") {
        return ContentValue::Normal;
    }
    if trimmed.eq_ignore_ascii_case("none") {
        return ContentValue::None;
    }

    let mut input = ParserInput::new(trimmed);
    let mut parser = Parser::new(&mut input);
    let mut items = Vec::new();

    loop {
        let token = match parser.next() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        match token {
            Token::QuotedString(s) => items.push(ContentItem::String(s.to_string())),
            Token::Ident(ident) => match ident.to_ascii_lowercase().as_str() {
                "open-quote" => items.push(ContentItem::OpenQuote),
                "close-quote" => items.push(ContentItem::CloseQuote),
                "no-open-quote" | "no-close-quote" => {}
                other => log::debug!("ignoring content keyword '{other}'"),
            },
            Token::Function(name) => {
                let name = name.to_ascii_lowercase();
                let item = parser
                    .parse_nested_block(|p| Ok::<_, ParseError<'_, ()>>(parse_function(&name, p)))
                    .ok()
                    .flatten();
                match item {
                    Some(item) => items.push(item),
                    None => log::debug!("ignoring malformed content function '{name}()'"),
                }
            }
            other => log::debug!("ignoring content token {other:?}"),
        }
    }

    ContentValue::Items(items)
}

fn parse_function(name: &str, p: &mut Parser<'_, '_>) -> Option<ContentItem> {
    let item = match name {
        "counter" => {
            let name = p.expect_ident_cloned().ok()?.to_string();
            let style = optional_style(p);
            ContentItem::Counter { name, style }
        }
        "counters" => {
            let name = p.expect_ident_cloned().ok()?.to_string();
            p.expect_comma().ok()?;
            let separator = p.expect_string_cloned().ok()?.to_string();
            let style = optional_style(p);
            ContentItem::Counters {
                name,
                separator,
                style,
            }
        }
        "target-counter" => {
            let target = parse_target(p)?;
            p.expect_comma().ok()?;
            let name = p.expect_ident_cloned().ok()?.to_string();
            let style = optional_style(p);
            ContentItem::TargetCounter {
                target,
                name,
                style,
            }
        }
        "target-counters" => {
            let target = parse_target(p)?;
            p.expect_comma().ok()?;
            let name = p.expect_ident_cloned().ok()?.to_string();
            p.expect_comma().ok()?;
            let separator = p.expect_string_cloned().ok()?.to_string();
            let style = optional_style(p);
            ContentItem::TargetCounters {
                target,
                name,
                separator,
                style,
            }
        }
        "attr" => ContentItem::Attr(p.expect_ident_cloned().ok()?.to_ascii_lowercase()),
        _ => return None,
    };
    p.is_exhausted().then_some(item)
}

/// `, <counter-style>`; decimal when absent or unknown.
fn optional_style(p: &mut Parser<'_, '_>) -> GlyphStyle {
    let Ok(keyword) = p.try_parse(|p| {
        p.expect_comma()?;
        p.expect_ident_cloned()
    }) else {
        return GlyphStyle::Decimal;
    };
    GlyphStyle::from_keyword(&keyword.to_ascii_lowercase()).unwrap_or_else(|| {
        log::warn!("unknown counter style '{keyword}', using decimal");
        GlyphStyle::Decimal
    })
}

fn parse_target<'i>(p: &mut Parser<'i, '_>) -> Option<CounterTarget> {
    if let Ok(url) = p.try_parse(|p| p.expect_url_or_string()) {
        return Some(CounterTarget::Id(strip_hash(&url).to_string()));
    }
    p.expect_function_matching("attr").ok()?;
    let attr = p
        .parse_nested_block(|p| -> Result<_, ParseError<'i, ()>> { Ok(p.expect_ident_cloned()?) })
        .ok()?;
    Some(CounterTarget::Attr(attr.to_ascii_lowercase()))
}

pub(crate) fn strip_hash(reference: &str) -> &str {
    let reference = reference.trim();
    reference.strip_prefix('#').unwrap_or(reference)
}
