use crate::model::{MeasurementRow, RowMeta};
use crate::parsing::normalize::normalize_test_name;

/// Collect the most recently recorded metadata for a test.
///
/// `history` is ordered oldest first. It is scanned newest to oldest and each
/// field is taken from the first row that has it, so different fields may come
/// from different rows. Scanning stops once every field is known.
pub fn lookup_meta(test: &str, history: &[MeasurementRow]) -> RowMeta {
    let key = normalize_test_name(test);
    let mut meta = RowMeta::default();

    for prior in history.iter().rev() {
        if prior.test_key() != key {
            continue;
        }
        if meta.category.is_none() {
            meta.category = prior.category.clone().filter(|c| !c.trim().is_empty());
        }
        if meta.unit.is_none() {
            meta.unit = prior.unit.clone().filter(|u| !u.trim().is_empty());
        }
        if meta.ref_low.is_none() {
            meta.ref_low = prior.ref_low;
        }
        if meta.ref_high.is_none() {
            meta.ref_high = prior.ref_high;
        }
        if meta.is_complete() {
            break;
        }
    }

    meta
}

/// Fill absent category, unit, and reference bounds from history.
///
/// Fields already present on `row` are never replaced.
pub fn apply_meta_if_missing(row: MeasurementRow, history: &[MeasurementRow]) -> MeasurementRow {
    if row.category.is_some() && row.unit.is_some() && row.ref_low.is_some() && row.ref_high.is_some()
    {
        return row;
    }
    let meta = lookup_meta(&row.test, history);
    MeasurementRow {
        category: row.category.or(meta.category),
        unit: row.unit.or(meta.unit),
        ref_low: row.ref_low.or(meta.ref_low),
        ref_high: row.ref_high.or(meta.ref_high),
        ..row
    }
}

/// Backfill every new row against `history`. New rows do not fill each other.
pub fn backfill_rows(rows: Vec<MeasurementRow>, history: &[MeasurementRow]) -> Vec<MeasurementRow> {
    rows.into_iter()
        .map(|row| apply_meta_if_missing(row, history))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn row(test: &str, value: Decimal) -> MeasurementRow {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        MeasurementRow::new(date, test, value).unwrap()
    }

    #[test]
    fn test_fields_come_from_newest_row_that_has_them() {
        let mut older = row("PSA", dec!(50)).with_unit(Some("ng/mL"));
        older.ref_low = Some(dec!(0));
        let mut newer = row("PSA", dec!(55));
        newer.ref_high = Some(dec!(4));
        let history = vec![older, newer];

        let filled = apply_meta_if_missing(row("PSA", dec!(60)), &history);
        assert_eq!(filled.unit.as_deref(), Some("ng/mL"));
        assert_eq!(filled.ref_low, Some(dec!(0)));
        assert_eq!(filled.ref_high, Some(dec!(4)));
        assert_eq!(filled.category, None);
    }

    #[test]
    fn test_most_recent_wins() {
        let history = vec![
            row("TSH", dec!(1)).with_unit(Some("uIU/mL")),
            row("TSH", dec!(2)).with_unit(Some("mIU/L")),
        ];
        let meta = lookup_meta("TSH", &history);
        assert_eq!(meta.unit.as_deref(), Some("mIU/L"));
    }

    #[test]
    fn test_name_match_ignores_case_and_spaces() {
        let history = vec![row("Vitamin D", dec!(80)).with_category(Some("Vitamins"))];
        let filled = apply_meta_if_missing(row("  vitamin d ", dec!(90)), &history);
        assert_eq!(filled.category.as_deref(), Some("Vitamins"));
    }

    #[test]
    fn test_present_fields_never_overwritten() {
        let mut prior = row("PSA", dec!(1)).with_unit(Some("ug/L"));
        prior.ref_low = Some(dec!(1));
        let mut new_row = row("PSA", dec!(2)).with_unit(Some("ng/mL"));
        new_row.ref_low = Some(dec!(0));

        let filled = apply_meta_if_missing(new_row, &[prior]);
        assert_eq!(filled.unit.as_deref(), Some("ng/mL"));
        assert_eq!(filled.ref_low, Some(dec!(0)));
        assert_eq!(filled.value, dec!(2));
    }

    #[test]
    fn test_other_tests_ignored() {
        let history = vec![row("Glucose", dec!(5)).with_unit(Some("mmol/L"))];
        assert_eq!(lookup_meta("PSA", &history), RowMeta::default());
    }

    #[test]
    fn test_new_rows_do_not_fill_each_other() {
        let rows = vec![
            row("PSA", dec!(1)).with_unit(Some("ng/mL")),
            row("PSA", dec!(2)),
        ];
        let out = backfill_rows(rows, &[]);
        assert_eq!(out[1].unit, None);
    }
}
