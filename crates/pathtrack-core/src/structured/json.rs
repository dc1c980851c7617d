use crate::error::PathtrackError;
use crate::model::{MeasurementRow, RangeBounds};
use crate::parsing::date::resolve_date;
use crate::parsing::values::{parse_number, split_ref_range};
use rust_decimal::Decimal;
use serde_json::Value;

/// Parse a JSON upload: a top-level array of row objects, or an object with a
/// `rows` array. Malformed JSON is an `InvalidFile` error; individual records
/// that lack a date, test, or numeric value are dropped.
pub fn parse_json(text: &str) -> Result<Vec<MeasurementRow>, PathtrackError> {
    let data: Value = serde_json::from_str(text)
        .map_err(|e| PathtrackError::InvalidFile(format!("malformed JSON: {e}")))?;
    Ok(rows_from_value(&data))
}

/// Map the records found in a parsed JSON document to rows.
///
/// Anything that is neither an array nor an object with a `rows` array holds
/// no records.
pub fn rows_from_value(data: &Value) -> Vec<MeasurementRow> {
    let records: &[Value] = match data {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("rows") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    };

    records
        .iter()
        .enumerate()
        .filter_map(|(idx, record)| {
            let row = row_from_record(record);
            if row.is_none() {
                tracing::debug!(index = idx, "record lacks a date, test, or value");
            }
            row
        })
        .collect()
}

/// Map one record object. Accepted fields: `date`, `test` (or `name`),
/// `value`, `unit`, `category`, `ref_low`, `ref_high`, and a joined
/// `ref_range` used when neither bound is given.
pub fn row_from_record(record: &Value) -> Option<MeasurementRow> {
    let obj = record.as_object()?;

    let date = resolve_date(obj.get("date").and_then(Value::as_str)?)?;
    let test = text_field(record, "test").or_else(|| text_field(record, "name"))?;
    let value = number_field(obj.get("value")?)?;

    let mut range = RangeBounds {
        low: obj.get("ref_low").and_then(number_field),
        high: obj.get("ref_high").and_then(number_field),
    };
    if range.is_empty() {
        if let Some(joined) = text_field(record, "ref_range") {
            range = split_ref_range(joined);
        }
    }

    Some(
        MeasurementRow::new(date, test, value)?
            .with_unit(text_field(record, "unit"))
            .with_category(text_field(record, "category"))
            .with_range(range),
    )
}

fn text_field<'v>(record: &'v Value, key: &str) -> Option<&'v str> {
    record
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// A JSON number or a string holding one.
fn number_field(v: &Value) -> Option<Decimal> {
    match v {
        Value::Number(n) => parse_number(&n.to_string()),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}
