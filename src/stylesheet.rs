//! Stylesheet parsing – `<style>` blocks and `style=""` attributes.
//!
//! Rules are tokenized with `cssparser`. Only compound selectors are
//! understood (`*`, `tag`, `.class`, `#id` and combinations, optionally with
//! a `::before` / `::after` / `::marker` pseudo-element); rules with any
//! other selector are dropped. Declaration values are kept as raw text and
//! interpreted later by the cascade.

use cssparser::{ParseError, Parser, ParserInput, Token};
use serde::{Deserialize, Serialize};

use crate::dom::ElementData;

/// Pseudo-elements that can carry generated content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PseudoElement {
    Marker,
    Before,
    After,
}

/// A single `property: value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
}

/// A compound selector with an optional trailing pseudo-element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub pseudo: Option<PseudoElement>,
}

/// (ids, classes, types) – compared lexicographically.
pub type Specificity = (u32, u32, u32);

impl Selector {
    /// Parse one selector of a selector list.
    pub fn parse(text: &str) -> Option<Self> {
        let mut input = ParserInput::new(text.trim());
        let mut parser = Parser::new(&mut input);
        let mut selector = Selector::default();
        let mut universal = false;

        loop {
            let token = match parser.next_including_whitespace() {
                Ok(token) => token.clone(),
                Err(_) => break,
            };
            // Nothing may follow a pseudo-element.
            if selector.pseudo.is_some() {
                return None;
            }
            match token {
                Token::Ident(name) => {
                    if universal || selector != Selector::default() {
                        return None;
                    }
                    selector.tag = Some(name.to_ascii_lowercase());
                }
                Token::Delim('*') => {
                    if universal || selector != Selector::default() {
                        return None;
                    }
                    universal = true;
                }
                Token::Delim('.') => {
                    let class = parser.expect_ident_cloned().ok()?;
                    selector.classes.push(class.to_string());
                }
                Token::IDHash(id) => {
                    if selector.id.is_some() {
                        return None;
                    }
                    selector.id = Some(id.to_string());
                }
                Token::Colon => {
                    let double = parser.try_parse(|p| p.expect_colon()).is_ok();
                    let name = parser.expect_ident_cloned().ok()?;
                    selector.pseudo = Some(match name.to_ascii_lowercase().as_str() {
                        "before" => PseudoElement::Before,
                        "after" => PseudoElement::After,
                        "marker" if double => PseudoElement::Marker,
                        _ => return None,
                    });
                }
                _ => return None,
            }
        }

        if !universal && selector == Selector::default() {
            return None;
        }
        Some(selector)
    }

    pub fn specificity(&self) -> Specificity {
        (
            u32::from(self.id.is_some()),
            self.classes.len() as u32,
            u32::from(self.tag.is_some()) + u32::from(self.pseudo.is_some()),
        )
    }

    /// Whether the element part of the selector matches `element`.
    pub fn matches(&self, element: &ElementData) -> bool {
        if let Some(tag) = &self.tag {
            if *tag != element.tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.id() != Some(id.as_str()) {
                return false;
            }
        }
        let classes = element.classes();
        self.classes.iter().all(|c| classes.contains(&c.as_str()))
    }
}

#[derive(Debug, Clone)]
pub struct StyleRule {
    pub selector: Selector,
    pub declarations: Vec<Declaration>,
    pub source_order: usize,
}

/// All author rules of a document, in source order.
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    rules: Vec<StyleRule>,
}

impl Stylesheet {
    pub fn parse(css: &str) -> Self {
        let mut sheet = Self::default();
        sheet.append(css);
        sheet
    }

    /// Parse `css` and add its rules after the existing ones.
    pub fn append(&mut self, css: &str) {
        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);

        loop {
            parser.skip_whitespace();
            if parser.is_exhausted() {
                break;
            }
            let Some((prelude, declarations)) = parse_rule(&mut parser) else {
                continue;
            };
            for part in prelude.split(',') {
                match Selector::parse(part) {
                    Some(selector) => {
                        let source_order = self.rules.len();
                        self.rules.push(StyleRule {
                            selector,
                            declarations: declarations.clone(),
                            source_order,
                        });
                    }
                    None => log::debug!("ignoring unsupported selector '{}'", part.trim()),
                }
            }
        }
    }

    pub fn rules(&self) -> &[StyleRule] {
        &self.rules
    }

    /// Declarations applying to `element` (or one of its pseudo-elements),
    /// lowest precedence first.
    pub fn matching_declarations(
        &self,
        element: &ElementData,
        pseudo: Option<PseudoElement>,
    ) -> Vec<&Declaration> {
        let mut matched: Vec<&StyleRule> = self
            .rules
            .iter()
            .filter(|r| r.selector.pseudo == pseudo && r.selector.matches(element))
            .collect();
        matched.sort_by_key(|r| (r.selector.specificity(), r.source_order));
        matched
            .into_iter()
            .flat_map(|r| r.declarations.iter())
            .collect()
    }
}

/// Parse the declarations of a `style` attribute.
pub fn parse_declarations(text: &str) -> Vec<Declaration> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    parse_declaration_list(&mut parser)
}

/// Consume one rule. Returns `None` for at-rules and unterminated input.
fn parse_rule<'i>(parser: &mut Parser<'i, '_>) -> Option<(String, Vec<Declaration>)> {
    let start = parser.position();
    let mut at_rule = false;
    let prelude_end;

    loop {
        let before = parser.position();
        let token = match parser.next_including_whitespace() {
            Ok(token) => token.clone(),
            Err(_) => return None,
        };
        match token {
            Token::CurlyBracketBlock => {
                prelude_end = before;
                break;
            }
            Token::AtKeyword(_) => at_rule = true,
            Token::Semicolon if at_rule => return None,
            _ => {}
        }
    }

    if at_rule {
        // The block is skipped by the next call to `next()`.
        return None;
    }

    let prelude = parser.slice(start..prelude_end).trim().to_string();
    let declarations = parser
        .parse_nested_block(|p| Ok::<_, ParseError<'i, ()>>(parse_declaration_list(p)))
        .unwrap_or_default();
    Some((prelude, declarations))
}

fn parse_declaration_list(parser: &mut Parser<'_, '_>) -> Vec<Declaration> {
    let mut declarations = Vec::new();

    loop {
        parser.skip_whitespace();
        if parser.is_exhausted() {
            break;
        }

        let property = match parser.try_parse(|p| p.expect_ident_cloned()) {
            Ok(name) => name.to_ascii_lowercase(),
            Err(_) => {
                skip_declaration(parser);
                continue;
            }
        };
        if parser.expect_colon().is_err() {
            skip_declaration(parser);
            continue;
        }

        let value = declaration_value(parser);
        if value.is_empty() {
            continue;
        }
        declarations.push(Declaration { property, value });
    }

    declarations
}

/// Collect the raw value text up to the next top-level `;`.
fn declaration_value(parser: &mut Parser<'_, '_>) -> String {
    let start = parser.position();
    let mut end;
    loop {
        end = parser.position();
        let at_semicolon = match parser.next_including_whitespace() {
            Ok(Token::Semicolon) => true,
            Ok(_) => false,
            Err(_) => break,
        };
        if at_semicolon {
            break;
        }
    }
    let raw = parser.slice(start..end).trim();
    strip_important(raw).to_string()
}

fn strip_important(value: &str) -> &str {
    let lower = value.to_ascii_lowercase();
    match lower.rfind("!important") {
        Some(i) if lower[i..].trim_end() == "!important" => value[..i].trim_end(),
        _ => value,
    }
}

fn skip_declaration(parser: &mut Parser<'_, '_>) {
    loop {
        let done = !matches!(parser.next_including_whitespace(), Ok(t) if *t != Token::Semicolon);
        if done {
            break;
        }
    }
}
