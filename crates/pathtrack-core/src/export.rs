use crate::error::PathtrackError;
use crate::model::MeasurementRow;
use std::io::Write;

const HEADER: [&str; 7] = [
    "Date", "Category", "Test", "Value", "Unit", "Ref Low", "Ref High",
];

/// Write rows as CSV with a header line. Absent fields are empty cells, and
/// the output reads back through `parse_csv` unchanged.
pub fn write_csv<W: Write>(rows: &[MeasurementRow], writer: W) -> Result<(), PathtrackError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(HEADER)?;
    for row in rows {
        let opt = |d: Option<rust_decimal::Decimal>| d.map(|d| d.to_string()).unwrap_or_default();
        out.write_record([
            row.date.to_string(),
            row.category.clone().unwrap_or_default(),
            row.test.clone(),
            row.value.to_string(),
            row.unit.clone().unwrap_or_default(),
            opt(row.ref_low),
            opt(row.ref_high),
        ])?;
    }
    out.flush()?;
    Ok(())
}

/// CSV export as a string.
pub fn to_csv_string(rows: &[MeasurementRow]) -> Result<String, PathtrackError> {
    let mut buf = Vec::new();
    write_csv(rows, &mut buf)?;
    String::from_utf8(buf).map_err(|e| PathtrackError::InvalidFile(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RangeBounds;
    use crate::structured::parse_csv;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn sample() -> Vec<MeasurementRow> {
        let date = NaiveDate::from_ymd_opt(2025, 7, 11).unwrap();
        vec![
            MeasurementRow::new(date, "PSA", dec!(56))
                .unwrap()
                .with_unit(Some("ng/mL"))
                .with_category(Some("Tumour markers"))
                .with_range(RangeBounds {
                    low: Some(dec!(0)),
                    high: Some(dec!(4)),
                }),
            MeasurementRow::new(date, "eGFR, calc", dec!(-1.5))
                .unwrap()
                .with_range(RangeBounds {
                    low: Some(dec!(60)),
                    high: None,
                }),
        ]
    }

    #[test]
    fn test_header_and_empty_cells() {
        let csv = to_csv_string(&sample()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Date,Category,Test,Value,Unit,Ref Low,Ref High"));
        assert_eq!(lines.next(), Some("2025-07-11,Tumour markers,PSA,56,ng/mL,0,4"));
        assert_eq!(lines.next(), Some("2025-07-11,,\"eGFR, calc\",-1.5,,60,"));
    }

    #[test]
    fn test_export_reads_back() {
        let rows = sample();
        let csv = to_csv_string(&rows).unwrap();
        assert_eq!(parse_csv(&csv), rows);
    }
}
