use super::date::resolve_date;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

/// Vendor flag markers at the start of a line: up to three `*`, optionally
/// followed by an `x`/`k` flag, or a lone `x`/`k` flag followed by whitespace.
static FLAG_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\*{1,3}[xk]?\s*|[xk]\s+)").expect("flag marker pattern is valid")
});

/// A header keyword followed by a numeric date ("11/07/2025", "2025-7-3",
/// "11.07.2025") or a day, month name, and year ("11 Jul 2025").
static DATE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:collected|date|reported)\s*[:\-]?\s*(\d{1,2}[/\-.]\d{1,2}[/\-.]\d{2,4}|\d{4}[/\-.]\d{1,2}[/\-.]\d{1,2}|\d{1,2}\s+[a-z]{3,9}\s+\d{4})",
    )
    .expect("date header pattern is valid")
});

/// What a single report line is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// A collection/report date announcement. `date` is None when the
    /// embedded token could not be resolved.
    DateHeader { date: Option<NaiveDate> },
    /// Anything else: a candidate for measurement extraction, with flag markers removed.
    Candidate(&'a str),
}

/// Classify one trimmed, non-empty line.
pub fn classify_line(line: &str) -> LineKind<'_> {
    let line = strip_flag_marker(line);
    match DATE_HEADER.captures(line) {
        Some(caps) => LineKind::DateHeader {
            date: resolve_date(&caps[1]),
        },
        None => LineKind::Candidate(line),
    }
}

/// Remove a leading vendor flag marker ("**", "*x", "k ") from a line.
pub fn strip_flag_marker(line: &str) -> &str {
    match FLAG_MARKER.find(line) {
        Some(m) => &line[m.end()..],
        None => line,
    }
}
