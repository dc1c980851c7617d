use crate::model::{MeasurementRow, RangeBounds};
use crate::parsing::date::resolve_date;
use crate::parsing::values::{parse_loose_number, parse_number, split_ref_range};

/// Accepted header names per field, matched case-insensitively and exactly.
const DATE_COLUMNS: &[&str] = &["date", "collected"];
const TEST_COLUMNS: &[&str] = &["test", "analyte", "name"];
const VALUE_COLUMNS: &[&str] = &["value", "result"];
const UNIT_COLUMNS: &[&str] = &["unit"];
const REF_LOW_COLUMNS: &[&str] = &["ref low", "ref_low"];
const REF_HIGH_COLUMNS: &[&str] = &["ref high", "ref_high"];
const RANGE_COLUMNS: &[&str] = &["ref range", "ref_range", "reference range", "range"];
const CATEGORY_COLUMNS: &[&str] = &["category"];

/// Parse comma-separated rows with a header line.
pub fn parse_csv(text: &str) -> Vec<MeasurementRow> {
    parse_delimited(text, b',')
}

/// Parse tab-separated rows with a header line.
pub fn parse_tsv(text: &str) -> Vec<MeasurementRow> {
    parse_delimited(text, b'\t')
}

/// Parse delimited text whose first line names the columns.
///
/// A record is dropped when its date, test name, or value cannot be read.
/// Malformed records are skipped without aborting the rest.
pub fn parse_delimited(text: &str, delimiter: u8) -> Vec<MeasurementRow> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = match reader.headers() {
        Ok(h) => h.iter().map(|h| h.trim().to_lowercase()).collect(),
        Err(e) => {
            tracing::debug!(error = %e, "unreadable header line");
            return Vec::new();
        }
    };
    let columns = Columns::new(&headers);

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let line_no = idx + 2;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(line_no, error = %e, "skipping malformed record");
                continue;
            }
        };
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        match columns.to_row(&record) {
            Some(row) => rows.push(row),
            None => tracing::debug!(line_no, "record lacks a date, test, or value"),
        }
    }
    rows
}

/// Column positions for each field, resolved once from the header.
struct Columns {
    date: Vec<usize>,
    test: Vec<usize>,
    value: Vec<usize>,
    unit: Vec<usize>,
    ref_low: Vec<usize>,
    ref_high: Vec<usize>,
    range: Vec<usize>,
    category: Vec<usize>,
}

impl Columns {
    fn new(headers: &[String]) -> Self {
        let find = |aliases: &[&str]| -> Vec<usize> {
            aliases
                .iter()
                .filter_map(|alias| headers.iter().position(|h| h == alias))
                .collect()
        };
        Columns {
            date: find(DATE_COLUMNS),
            test: find(TEST_COLUMNS),
            value: find(VALUE_COLUMNS),
            unit: find(UNIT_COLUMNS),
            ref_low: find(REF_LOW_COLUMNS),
            ref_high: find(REF_HIGH_COLUMNS),
            range: find(RANGE_COLUMNS),
            category: find(CATEGORY_COLUMNS),
        }
    }

    fn to_row(&self, record: &csv::StringRecord) -> Option<MeasurementRow> {
        let date = resolve_date(first_cell(record, &self.date)?)?;
        let test = first_cell(record, &self.test)?;
        let value = parse_loose_number(first_cell(record, &self.value)?)?;

        let mut range = RangeBounds {
            low: first_cell(record, &self.ref_low).and_then(parse_number),
            high: first_cell(record, &self.ref_high).and_then(parse_number),
        };
        if range.is_empty() {
            if let Some(joined) = first_cell(record, &self.range) {
                range = split_ref_range(joined);
            }
        }

        Some(
            MeasurementRow::new(date, test, value)?
                .with_unit(first_cell(record, &self.unit))
                .with_category(first_cell(record, &self.category))
                .with_range(range),
        )
    }
}

/// The first non-empty cell among the given columns, in alias order.
fn first_cell<'r>(record: &'r csv::StringRecord, columns: &[usize]) -> Option<&'r str> {
    columns
        .iter()
        .filter_map(|&i| record.get(i))
        .map(str::trim)
        .find(|cell| !cell.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_basic_csv() {
        let rows = parse_csv("date,test,value,unit\n2025-01-01,Glucose,90,mg/dL\n");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date.to_string(), "2025-01-01");
        assert_eq!(rows[0].test, "Glucose");
        assert_eq!(rows[0].value, dec!(90));
        assert_eq!(rows[0].unit.as_deref(), Some("mg/dL"));
        assert_eq!(rows[0].ref_low, None);
        assert_eq!(rows[0].ref_high, None);
    }

    #[test]
    fn test_non_numeric_value_dropped_rest_kept() {
        let text = "date,test,value\n2025-01-01,Glucose,abc\n2025-01-02,Glucose,95\n";
        let rows = parse_csv(text);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, dec!(95));
    }

    #[test]
    fn test_header_aliases_case_insensitive() {
        let text = "Collected,Analyte,Result,Ref Low,REF_HIGH\n11/07/2025,PSA,56 ng/mL,0,4\n";
        let rows = parse_csv(text);
        assert_eq!(rows[0].date.to_string(), "2025-07-11");
        assert_eq!(rows[0].test, "PSA");
        assert_eq!(rows[0].value, dec!(56));
        assert_eq!(rows[0].ref_low, Some(dec!(0)));
        assert_eq!(rows[0].ref_high, Some(dec!(4)));
    }

    #[test]
    fn test_header_match_is_exact() {
        let rows = parse_csv("test date,test,value\n2025-01-01,PSA,1\n");
        assert!(rows.is_empty());
    }

    #[test]
    fn test_missing_ref_cells_are_absent_not_zero() {
        let rows = parse_csv("date,test,value,ref_low,ref_high\n2025-01-01,PSA,1,,\n");
        assert_eq!(rows[0].ref_low, None);
        assert_eq!(rows[0].ref_high, None);
    }

    #[test]
    fn test_joined_range_column() {
        let rows = parse_csv("date,test,value,ref range\n2025-01-01,PSA,1,0–4\n");
        assert_eq!(rows[0].ref_low, Some(dec!(0)));
        assert_eq!(rows[0].ref_high, Some(dec!(4)));
    }

    #[test]
    fn test_tsv_with_quoted_cells() {
        let text = "date\ttest\tvalue\tcategory\n2025-01-01\t\"Vitamin D\"\t137\tVitamins\n";
        let rows = parse_tsv(text);
        assert_eq!(rows[0].test, "Vitamin D");
        assert_eq!(rows[0].category.as_deref(), Some("Vitamins"));
    }

    #[test]
    fn test_timestamped_date_cells() {
        let rows = parse_csv("date,test,value\n11/07/2025 09:30,PSA,56\n2025/07/12 08:00,PSA,50\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date.to_string(), "2025-07-11");
        assert_eq!(rows[1].date.to_string(), "2025-07-12");
    }

    #[test]
    fn test_unresolvable_date_dropped() {
        assert!(parse_csv("date,test,value\nsoon,PSA,1\n").is_empty());
    }

    #[test]
    fn test_header_only_or_empty() {
        assert!(parse_csv("date,test,value\n").is_empty());
        assert!(parse_csv("").is_empty());
    }

    #[test]
    fn test_short_record_is_skipped() {
        let rows = parse_csv("date,test,value\n2025-01-01,PSA\n2025-01-01,TSH,2\n");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].test, "TSH");
    }
}
