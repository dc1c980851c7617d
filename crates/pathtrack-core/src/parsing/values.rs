use crate::model::RangeBounds;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;

/// Characters accepted between the two bounds of a range: hyphen, en dash, em dash, tilde.
pub(crate) const RANGE_DASHES: &str = r"[\-\u{2013}\u{2014}~]";

static JOINED_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^([+-]?\d+(?:\.\d+)?){RANGE_DASHES}([+-]?\d+(?:\.\d+)?)$"
    ))
    .expect("joined range pattern is valid")
});

/// Parse a number from report text.
///
/// Handles formats like:
/// - "56" -> 56
/// - "+1.8" -> 1.8
/// - "-2" -> -2
/// - "1e3" -> 1000
///
/// Returns None for anything that is not a representable decimal.
pub fn parse_number(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Parse a value cell, dropping every character that is not a digit, dot, or minus.
///
/// "5.6 mmol/L" -> 5.6, "<0.1" -> 0.1, "abc" -> None.
pub fn parse_loose_number(s: &str) -> Option<Decimal> {
    let kept: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    parse_number(&kept)
}

/// Split a joined reference range such as "0-4" or "1.8–7.5" into bounds.
///
/// Whitespace anywhere in the token is ignored. A token that does not look
/// like two numbers around a dash yields empty bounds. Each bound is parsed
/// independently, so an unrepresentable side leaves only that side absent.
pub fn split_ref_range(token: &str) -> RangeBounds {
    let compact: String = token.chars().filter(|c| !c.is_whitespace()).collect();
    match JOINED_RANGE.captures(&compact) {
        Some(caps) => RangeBounds {
            low: parse_number(&caps[1]),
            high: parse_number(&caps[2]),
        },
        None => RangeBounds::default(),
    }
}
