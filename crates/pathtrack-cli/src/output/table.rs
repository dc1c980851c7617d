use pathtrack_core::model::MeasurementRow;

const HEADERS: [&str; 6] = ["Date", "Test", "Value", "Unit", "Range", "Category"];

pub fn print(rows: &[MeasurementRow]) {
    print!("{}", format_rows(rows));
}

/// Render rows as left-aligned columns, one row per line.
pub fn format_rows(rows: &[MeasurementRow]) -> String {
    let cells: Vec<[String; 6]> = rows.iter().map(row_cells).collect();

    let mut widths = HEADERS.map(str::len);
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &HEADERS.map(String::from), &widths);
    for row in &cells {
        push_line(&mut out, row, &widths);
    }
    out
}

fn row_cells(row: &MeasurementRow) -> [String; 6] {
    [
        row.date.to_string(),
        row.test.clone(),
        row.value.to_string(),
        row.unit.clone().unwrap_or_default(),
        format_range(row),
        row.category.clone().unwrap_or_default(),
    ]
}

fn format_range(row: &MeasurementRow) -> String {
    match (row.ref_low, row.ref_high) {
        (Some(low), Some(high)) => format!("{low}-{high}"),
        (Some(low), None) => format!(">= {low}"),
        (None, Some(high)) => format!("<= {high}"),
        (None, None) => String::new(),
    }
}

fn push_line(out: &mut String, cells: &[String; 6], widths: &[usize; 6]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pathtrack_core::model::RangeBounds;
    use rust_decimal_macros::dec;

    #[test]
    fn test_columns_aligned() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 11).unwrap();
        let rows = vec![
            MeasurementRow::new(date, "PSA", dec!(56))
                .unwrap()
                .with_unit(Some("ng/mL"))
                .with_range(RangeBounds {
                    low: Some(dec!(0)),
                    high: Some(dec!(4)),
                }),
            MeasurementRow::new(date, "Vitamin D", dec!(137)).unwrap(),
        ];
        let table = format_rows(&rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Date        Test       Value  Unit   Range  Category");
        assert_eq!(lines[1], "2025-07-11  PSA        56     ng/mL  0-4");
        assert_eq!(lines[2], "2025-07-11  Vitamin D  137");
    }
}
