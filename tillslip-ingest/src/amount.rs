//! Currency-like numeric tokens in a line of OCR text.
//!
//! A token is an optional `$`, an integer part with optional thousands
//! separators, and exactly two decimal digits: `4.50`, `$12.99`, `$ 1,234.56`.
//! A third decimal digit disqualifies the token; a trailing letter such as a
//! tax flag (`3.49F`) does not.

use std::sync::LazyLock;

use regex::Regex;

static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\$?\s*((?:\d{1,3}(?:,\d{3})+|\d+)\.\d{2})").expect("amount pattern")
});

/// A matched amount and where it sits in the line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmountToken {
    pub value: f64,
    /// Byte offset where the match starts, including any whitespace before
    /// the `$` or the first digit
    pub start: usize,
    pub end: usize,
}

/// Every amount token in `line`, left to right.
/// Tokens that fail numeric conversion are skipped.
pub fn find_amounts(line: &str) -> Vec<AmountToken> {
    AMOUNT_RE
        .captures_iter(line)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            if line[whole.end()..].starts_with(|c: char| c.is_ascii_digit()) {
                return None;
            }
            let value = parse_amount(caps.get(1)?.as_str())?;
            Some(AmountToken {
                value,
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

/// The last amount on the line; on receipts this is the price column.
pub fn last_amount(line: &str) -> Option<AmountToken> {
    find_amounts(line).pop()
}

/// Strip `$`, thousands separators and whitespace, then parse.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
