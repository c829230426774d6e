//! Numbering formatter – renders a counter value through one of the
//! supported glyph styles (`list-style-type` keywords).
//!
//! Every style either produces a representation or falls back to plain
//! decimal; formatting never fails:
//! - alphabetic and Greek styles are defined for `n > 0`
//! - Roman numerals are defined for `1..=3999`
//! - Armenian is defined for `1..=9999`, Georgian for `1..=19999`

use std::fmt;

use serde::{Deserialize, Serialize};

/// The numbering system used to render a counter as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GlyphStyle {
    None,
    Disc,
    Square,
    Circle,
    UpperLatin,
    LowerLatin,
    LowerGreek,
    UpperRoman,
    LowerRoman,
    Georgian,
    Armenian,
    DecimalLeadingZero,
    #[default]
    Decimal,
}

impl GlyphStyle {
    /// Every style, in declaration order.
    pub const ALL: [GlyphStyle; 13] = [
        GlyphStyle::None,
        GlyphStyle::Disc,
        GlyphStyle::Square,
        GlyphStyle::Circle,
        GlyphStyle::UpperLatin,
        GlyphStyle::LowerLatin,
        GlyphStyle::LowerGreek,
        GlyphStyle::UpperRoman,
        GlyphStyle::LowerRoman,
        GlyphStyle::Georgian,
        GlyphStyle::Armenian,
        GlyphStyle::DecimalLeadingZero,
        GlyphStyle::Decimal,
    ];

    /// Parse a `list-style-type` keyword (ASCII case-insensitive).
    ///
    /// Both the `-alpha` and `-latin` spellings are accepted.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let style = match keyword.trim().to_ascii_lowercase().as_str() {
            "none" => GlyphStyle::None,
            "disc" => GlyphStyle::Disc,
            "square" => GlyphStyle::Square,
            "circle" => GlyphStyle::Circle,
            "upper-alpha" | "upper-latin" => GlyphStyle::UpperLatin,
            "lower-alpha" | "lower-latin" => GlyphStyle::LowerLatin,
            "lower-greek" => GlyphStyle::LowerGreek,
            "upper-roman" => GlyphStyle::UpperRoman,
            "lower-roman" => GlyphStyle::LowerRoman,
            "georgian" => GlyphStyle::Georgian,
            "armenian" | "upper-armenian" => GlyphStyle::Armenian,
            "decimal-leading-zero" => GlyphStyle::DecimalLeadingZero,
            "decimal" => GlyphStyle::Decimal,
            _ => return None,
        };
        Some(style)
    }

    /// The canonical CSS keyword for this style.
    pub fn as_keyword(&self) -> &'static str {
        match self {
            GlyphStyle::None => "none",
            GlyphStyle::Disc => "disc",
            GlyphStyle::Square => "square",
            GlyphStyle::Circle => "circle",
            GlyphStyle::UpperLatin => "upper-latin",
            GlyphStyle::LowerLatin => "lower-latin",
            GlyphStyle::LowerGreek => "lower-greek",
            GlyphStyle::UpperRoman => "upper-roman",
            GlyphStyle::LowerRoman => "lower-roman",
            GlyphStyle::Georgian => "georgian",
            GlyphStyle::Armenian => "armenian",
            GlyphStyle::DecimalLeadingZero => "decimal-leading-zero",
            GlyphStyle::Decimal => "decimal",
        }
    }

    /// Bullet styles render a fixed symbol regardless of the value.
    pub fn is_symbolic(&self) -> bool {
        matches!(
            self,
            GlyphStyle::Disc | GlyphStyle::Square | GlyphStyle::Circle
        )
    }

    /// Format `value` with this style. See [`format_counter`].
    pub fn format(&self, value: i32) -> String {
        format_counter(value, *self)
    }
}

impl fmt::Display for GlyphStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_keyword())
    }
}

// ---------------------------------------------------------------------------
// Symbol tables
// ---------------------------------------------------------------------------

const DECIMAL_DIGITS: [char; 10] = ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9'];

const LOWER_LATIN: [char; 26] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z',
];

const UPPER_LATIN: [char; 26] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

// Final sigma is not part of the numbering sequence.
const LOWER_GREEK: [char; 24] = [
    'α', 'β', 'γ', 'δ', 'ε', 'ζ', 'η', 'θ', 'ι', 'κ', 'λ', 'μ', 'ν', 'ξ', 'ο', 'π', 'ρ', 'σ', 'τ',
    'υ', 'φ', 'χ', 'ψ', 'ω',
];

const LOWER_ROMAN_LETTERS: [char; 7] = ['i', 'v', 'x', 'l', 'c', 'd', 'm'];
const UPPER_ROMAN_LETTERS: [char; 7] = ['I', 'V', 'X', 'L', 'C', 'D', 'M'];

const ROMAN_UPPER: [(i32, &str); 13] = [
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

const ROMAN_LOWER: [(i32, &str); 13] = [
    (1000, "m"),
    (900, "cm"),
    (500, "d"),
    (400, "cd"),
    (100, "c"),
    (90, "xc"),
    (50, "l"),
    (40, "xl"),
    (10, "x"),
    (9, "ix"),
    (5, "v"),
    (4, "iv"),
    (1, "i"),
];

/// Armenian additive weights, largest first.
#[rustfmt::skip]
const ARMENIAN: [(i32, char); 36] = [
    (9000, 'Ք'), (8000, 'Փ'), (7000, 'Ւ'), (6000, 'Ց'), (5000, 'Ր'), (4000, 'Տ'),
    (3000, 'Վ'), (2000, 'Ս'), (1000, 'Ռ'), (900, 'Ջ'), (800, 'Պ'), (700, 'Չ'),
    (600, 'Ո'), (500, 'Շ'), (400, 'Ն'), (300, 'Յ'), (200, 'Մ'), (100, 'Ճ'),
    (90, 'Ղ'), (80, 'Ձ'), (70, 'Հ'), (60, 'Կ'), (50, 'Ծ'), (40, 'Խ'),
    (30, 'Լ'), (20, 'Ի'), (10, 'Ժ'), (9, 'Թ'), (8, 'Ը'), (7, 'Է'),
    (6, 'Զ'), (5, 'Ե'), (4, 'Դ'), (3, 'Գ'), (2, 'Բ'), (1, 'Ա'),
];

/// Georgian additive weights, largest first.
#[rustfmt::skip]
const GEORGIAN: [(i32, char); 37] = [
    (10000, 'ჵ'), (9000, 'ჰ'), (8000, 'ჯ'), (7000, 'ჴ'), (6000, 'ხ'), (5000, 'ჭ'),
    (4000, 'წ'), (3000, 'ძ'), (2000, 'ც'), (1000, 'ჩ'), (900, 'შ'), (800, 'ყ'),
    (700, 'ღ'), (600, 'ქ'), (500, 'ფ'), (400, 'ჳ'), (300, 'ტ'), (200, 'ს'),
    (100, 'რ'), (90, 'ჟ'), (80, 'პ'), (70, 'ო'), (60, 'ჲ'), (50, 'ნ'),
    (40, 'მ'), (30, 'ლ'), (20, 'კ'), (10, 'ი'), (9, 'თ'), (8, 'ჱ'),
    (7, 'ზ'), (6, 'ვ'), (5, 'ე'), (4, 'დ'), (3, 'გ'), (2, 'ბ'), (1, 'ა'),
];

// Same glyphs as the additive tables, smallest weight first.
const ARMENIAN_ALPHABET: [char; 36] = [
    'Ա', 'Բ', 'Գ', 'Դ', 'Ե', 'Զ', 'Է', 'Ը', 'Թ', 'Ժ', 'Ի', 'Լ', 'Խ', 'Ծ', 'Կ', 'Հ', 'Ձ', 'Ղ',
    'Ճ', 'Մ', 'Յ', 'Ն', 'Շ', 'Ո', 'Չ', 'Պ', 'Ջ', 'Ռ', 'Ս', 'Վ', 'Տ', 'Ր', 'Ց', 'Ւ', 'Փ', 'Ք',
];

const GEORGIAN_ALPHABET: [char; 37] = [
    'ა', 'ბ', 'გ', 'დ', 'ე', 'ვ', 'ზ', 'ჱ', 'თ', 'ი', 'კ', 'ლ', 'მ', 'ნ', 'ჲ', 'ო', 'პ', 'ჟ', 'რ',
    'ს', 'ტ', 'ჳ', 'ფ', 'ქ', 'ღ', 'ყ', 'შ', 'ჩ', 'ც', 'ძ', 'წ', 'ჭ', 'ხ', 'ჴ', 'ჯ', 'ჰ', 'ჵ',
];

const DISC: char = '\u{2022}';
const CIRCLE: char = '\u{25E6}';
const SQUARE: char = '\u{25AA}';

const ROMAN_MAX: i32 = 3999;
const ARMENIAN_MAX: i32 = 9999;
const GEORGIAN_MAX: i32 = 19999;

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

/// Render `value` in the given glyph style.
///
/// Values outside a style's defined range are rendered in decimal.
pub fn format_counter(value: i32, style: GlyphStyle) -> String {
    match style {
        GlyphStyle::None => String::new(),
        GlyphStyle::Disc => DISC.to_string(),
        GlyphStyle::Square => SQUARE.to_string(),
        GlyphStyle::Circle => CIRCLE.to_string(),
        GlyphStyle::Decimal => value.to_string(),
        GlyphStyle::DecimalLeadingZero => decimal_leading_zero(value),
        GlyphStyle::LowerLatin => alphabetic(value, &LOWER_LATIN),
        GlyphStyle::UpperLatin => alphabetic(value, &UPPER_LATIN),
        GlyphStyle::LowerGreek => alphabetic(value, &LOWER_GREEK),
        GlyphStyle::LowerRoman => roman(value, &ROMAN_LOWER),
        GlyphStyle::UpperRoman => roman(value, &ROMAN_UPPER),
        GlyphStyle::Armenian => additive(value, ARMENIAN_MAX, &ARMENIAN),
        GlyphStyle::Georgian => additive(value, GEORGIAN_MAX, &GEORGIAN),
    }
}

/// The ordered symbol set a style draws its output from.
///
/// Fallback decimal digits are not included for styles that only fall back
/// to decimal outside their range.
pub fn alphabet_for(style: GlyphStyle) -> &'static [char] {
    match style {
        GlyphStyle::None => &[],
        GlyphStyle::Disc => &[DISC],
        GlyphStyle::Square => &[SQUARE],
        GlyphStyle::Circle => &[CIRCLE],
        GlyphStyle::Decimal | GlyphStyle::DecimalLeadingZero => &DECIMAL_DIGITS,
        GlyphStyle::LowerLatin => &LOWER_LATIN,
        GlyphStyle::UpperLatin => &UPPER_LATIN,
        GlyphStyle::LowerGreek => &LOWER_GREEK,
        GlyphStyle::LowerRoman => &LOWER_ROMAN_LETTERS,
        GlyphStyle::UpperRoman => &UPPER_ROMAN_LETTERS,
        GlyphStyle::Armenian => &ARMENIAN_ALPHABET,
        GlyphStyle::Georgian => &GEORGIAN_ALPHABET,
    }
}

fn decimal_leading_zero(value: i32) -> String {
    let digits = value.unsigned_abs().to_string();
    let sign = if value < 0 { "-" } else { "" };
    if digits.len() < 2 {
        format!("{sign}0{digits}")
    } else {
        format!("{sign}{digits}")
    }
}

/// Bijective base-N numbering: a, b, …, z, aa, ab, …
fn alphabetic(value: i32, symbols: &[char]) -> String {
    if value <= 0 {
        return value.to_string();
    }
    let base = symbols.len() as u32;
    let mut n = value as u32;
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(symbols[(n % base) as usize]);
        n /= base;
    }
    out.iter().rev().collect()
}

fn roman(value: i32, table: &[(i32, &str)]) -> String {
    if !(1..=ROMAN_MAX).contains(&value) {
        return value.to_string();
    }
    let mut n = value;
    let mut out = String::new();
    for &(weight, symbol) in table {
        while n >= weight {
            out.push_str(symbol);
            n -= weight;
        }
    }
    out
}

fn additive(value: i32, max: i32, table: &[(i32, char)]) -> String {
    if !(1..=max).contains(&value) {
        return value.to_string();
    }
    let mut n = value;
    let mut out = String::new();
    for &(weight, symbol) in table {
        while n >= weight {
            out.push(symbol);
            n -= weight;
        }
    }
    out
}
