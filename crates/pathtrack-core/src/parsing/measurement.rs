use super::values::{parse_number, RANGE_DASHES};
use crate::model::RangeBounds;
use regex::Regex;
use rust_decimal::Decimal;
use std::sync::LazyLock;

const NUMBER: &str = r"[+-]?\d+(?:\.\d+)?";
const UNIT_CHARS: &str = r"[A-Za-z0-9\u{03BC}\u{00B5}/^%]";

/// Test name followed by its value. The name is matched lazily so the first
/// number set apart by whitespace or a `:`/`-` separator is the value. Plain
/// whitespace is tried first so "Base excess -2" keeps its sign.
static HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(?P<test>[A-Za-z][A-Za-z0-9 ._/^%()\-]+?)(?:\s+|\s*[:\-]\s*)(?P<value>{NUMBER})"
    ))
    .expect("measurement head pattern is valid")
});

/// Unit, then a parenthesized range: "ng/mL (ref 0-4)".
static PAREN_TAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^\s*(?P<unit>{UNIT_CHARS}*?)\s*\((?:ref(?:erence)?\s*)?(?P<low>{NUMBER})\s*{RANGE_DASHES}\s*(?P<high>{NUMBER})\)"
    ))
    .expect("parenthesized range pattern is valid")
});

/// Unit, then a bare range: "nmol/L 50-150".
static BARE_TAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\s*(?P<unit>{UNIT_CHARS}*?)\s*(?P<low>{NUMBER})\s*{RANGE_DASHES}\s*(?P<high>{NUMBER})"
    ))
    .expect("bare range pattern is valid")
});

/// Unit with no range.
static UNIT_TAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\s*(?P<unit>{UNIT_CHARS}*)")).expect("unit pattern is valid")
});

/// Fields pulled from a single measurement line, before a date is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measurement {
    pub test: String,
    pub value: Decimal,
    pub unit: Option<String>,
    pub range: RangeBounds,
}

/// Extract a measurement from a candidate line.
///
/// Returns None when the line has no test name followed by a number, or when
/// that number is not representable. Range bounds that fail to parse are left
/// absent without discarding the row.
pub fn extract_measurement(line: &str) -> Option<Measurement> {
    let head = HEAD.captures(line)?;
    let test = head.name("test")?.as_str().trim();
    let value_match = head.name("value")?;
    let value = parse_number(value_match.as_str())?;
    if test.is_empty() {
        return None;
    }

    let tail = &line[value_match.end()..];
    let (unit, range) = match PAREN_TAIL
        .captures(tail)
        .or_else(|| BARE_TAIL.captures(tail))
    {
        Some(caps) => (
            caps.name("unit").map(|m| m.as_str()),
            RangeBounds {
                low: caps.name("low").and_then(|m| parse_number(m.as_str())),
                high: caps.name("high").and_then(|m| parse_number(m.as_str())),
            },
        ),
        None => (
            UNIT_TAIL
                .captures(tail)
                .and_then(|caps| caps.name("unit"))
                .map(|m| m.as_str()),
            RangeBounds::default(),
        ),
    };

    Some(Measurement {
        test: test.to_string(),
        value,
        unit: unit.filter(|u| !u.is_empty()).map(str::to_string),
        range,
    })
}
