use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

/// Numeric dates may carry a trailing time ("2025/07/11 09:30"), which is ignored.
static YEAR_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})[/-](\d{1,2})[/-](\d{1,2})(?:[ T].*)?$")
        .expect("year-first date pattern is valid")
});

static DAY_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})[/-](\d{1,2})[/-](\d{2}|\d{4})(?:[ T].*)?$")
        .expect("day-first date pattern is valid")
});

/// Formats tried, in order, for tokens that are not purely numeric.
const DATE_FORMATS: &[&str] = &[
    "%d %b %Y",
    "%d %B %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d-%b-%Y",
    "%d-%b-%y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Resolve a loosely formatted date token to a calendar date.
///
/// Rules, first match wins:
/// 1. `YYYY-M-D` / `YYYY/M/D`
/// 2. `D/M/YY(YY)` / `D-M-YY(YY)`, always read day first; two-digit years are 20YY
/// 3. Generic calendar formats ("11 Jul 2025", "July 11, 2025", RFC 3339, ...)
///
/// Backslashes and dots are read as slashes ("11.07.2025"). Tokens naming an
/// impossible date ("2025-13-40") are unresolved.
pub fn resolve_date(token: &str) -> Option<NaiveDate> {
    let t = token.trim();
    if t.is_empty() {
        return None;
    }
    let numeric = t.replace(['\\', '.'], "/");

    if let Some(caps) = YEAR_FIRST.captures(&numeric) {
        let (y, m, d) = (num(&caps[1])?, num(&caps[2])?, num(&caps[3])?);
        if let Some(date) = ymd(y, m, d) {
            return Some(date);
        }
    } else if let Some(caps) = DAY_FIRST.captures(&numeric) {
        let (d, m) = (num(&caps[1])?, num(&caps[2])?);
        let year = &caps[3];
        let y = if year.len() == 2 {
            2000 + num(year)?
        } else {
            num(year)?
        };
        if let Some(date) = ymd(y, m, d) {
            return Some(date);
        }
    }

    parse_calendar(t)
}

/// Canonical `YYYY-MM-DD` form of a token, if it resolves.
pub fn canonical_date(token: &str) -> Option<String> {
    resolve_date(token).map(|d| d.format("%Y-%m-%d").to_string())
}

fn parse_calendar(t: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(t) {
        return Some(dt.date_naive());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(t, f).ok())
    {
        return Some(dt.date());
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(t, f).ok())
}

fn num(s: &str) -> Option<i32> {
    s.parse().ok()
}

fn ymd(y: i32, m: i32, d: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, u32::try_from(m).ok()?, u32::try_from(d).ok()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iso(token: &str) -> Option<String> {
        canonical_date(token)
    }

    #[test]
    fn test_year_first_padded() {
        assert_eq!(iso("2025-7-3").as_deref(), Some("2025-07-03"));
        assert_eq!(iso("2025/07/03").as_deref(), Some("2025-07-03"));
    }

    #[test]
    fn test_iso_unchanged() {
        assert_eq!(iso("2025-09-03").as_deref(), Some("2025-09-03"));
    }

    #[test]
    fn test_day_first_two_digit_year() {
        assert_eq!(iso("03/09/25").as_deref(), Some("2025-09-03"));
    }

    #[test]
    fn test_day_first_four_digit_year() {
        assert_eq!(iso("11/07/2025").as_deref(), Some("2025-07-11"));
        assert_eq!(iso("3-9-2025").as_deref(), Some("2025-09-03"));
    }

    #[test]
    fn test_trailing_time_ignored() {
        assert_eq!(iso("11/07/2025 09:30").as_deref(), Some("2025-07-11"));
        assert_eq!(iso("2025/07/11 09:30").as_deref(), Some("2025-07-11"));
        assert_eq!(iso("2025-7-3T08:15:00").as_deref(), Some("2025-07-03"));
        assert_eq!(iso("03/09/25 14:00").as_deref(), Some("2025-09-03"));
    }

    #[test]
    fn test_dotted_and_backslash() {
        assert_eq!(iso("11.07.2025").as_deref(), Some("2025-07-11"));
        assert_eq!(iso(r"2025\7\11").as_deref(), Some("2025-07-11"));
    }

    #[test]
    fn test_month_names() {
        assert_eq!(iso("11 Jul 2025").as_deref(), Some("2025-07-11"));
        assert_eq!(iso("July 11, 2025").as_deref(), Some("2025-07-11"));
    }

    #[test]
    fn test_rfc3339_takes_date_portion() {
        assert_eq!(iso("2025-07-11T09:30:00Z").as_deref(), Some("2025-07-11"));
    }

    #[test]
    fn test_impossible_date_unresolved() {
        assert!(iso("2025-13-40").is_none());
        assert!(iso("31/02/2025").is_none());
    }

    #[test]
    fn test_garbage_unresolved() {
        assert!(iso("").is_none());
        assert!(iso("yesterday").is_none());
        assert!(iso("12/2025").is_none());
    }
}
