pub mod date;
pub mod header;
pub mod measurement;
pub mod normalize;
pub mod values;

use crate::model::MeasurementRow;
use chrono::NaiveDate;
use header::{classify_line, LineKind};
use measurement::extract_measurement;
use normalize::normalize_text;

/// Running state of one free-text parse.
struct ParseState {
    current_date: NaiveDate,
    rows: Vec<MeasurementRow>,
}

/// Parse free report text into measurement rows, using `today` for rows that
/// appear before any date header.
///
/// Lines are read in order. A date header sets the date for every following
/// measurement until the next header. Lines that are neither are skipped.
pub fn parse_text_on(text: &str, today: NaiveDate) -> Vec<MeasurementRow> {
    let normalized = normalize_text(text);

    let state = normalized
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .fold(
            ParseState {
                current_date: today,
                rows: Vec::new(),
            },
            |mut state, line| {
                match classify_line(line) {
                    LineKind::DateHeader { date: Some(date) } => state.current_date = date,
                    LineKind::DateHeader { date: None } => {
                        tracing::debug!(line, "date header with unreadable date, keeping current date");
                    }
                    LineKind::Candidate(candidate) => match to_row(candidate, state.current_date) {
                        Some(row) => state.rows.push(row),
                        None => tracing::debug!(line, "no measurement on line"),
                    },
                }
                state
            },
        );

    state.rows
}

fn to_row(line: &str, date: NaiveDate) -> Option<MeasurementRow> {
    let m = extract_measurement(line)?;
    Some(
        MeasurementRow::new(date, &m.test, m.value)?
            .with_unit(m.unit.as_deref())
            .with_range(m.range),
    )
}
