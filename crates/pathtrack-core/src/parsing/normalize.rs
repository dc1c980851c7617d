use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Runs of whitespace that do not include a line break.
static INLINE_WS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\S\r\n]+").expect("inline whitespace pattern is valid"));

static SPACED_DOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" ?\. ?").expect("spaced dot pattern is valid"));

/// Clean OCR artifacts from raw report text.
///
/// Steps:
/// 1. Collapse every run of non-newline whitespace to one space
/// 2. Close up periods with spaces around them when both neighbours are
///    letters or digits: "Hb . A1c" -> "Hb.A1c", "5 . 6" -> "5.6"
///
/// Line structure is never changed.
pub fn normalize_text(raw: &str) -> String {
    let collapsed = INLINE_WS.replace_all(raw, " ");
    SPACED_DOT
        .replace_all(&collapsed, |caps: &Captures| {
            let m = caps.get(0).map(|m| (m.start(), m.end(), m.as_str()));
            let Some((start, end, text)) = m else {
                return String::new();
            };
            let before = collapsed[..start].chars().next_back();
            let after = collapsed[end..].chars().next();
            match (before, after) {
                (Some(b), Some(a)) if b.is_alphanumeric() && a.is_alphanumeric() => ".".into(),
                _ => text.to_string(),
            }
        })
        .into_owned()
}

/// Key used to compare test names: trimmed and lowercased.
pub fn normalize_test_name(name: &str) -> String {
    name.trim().to_lowercase()
}
