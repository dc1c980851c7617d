use pathtrack_core::error::PathtrackError;
use pathtrack_core::model::MeasurementRow;

pub fn print(rows: &[MeasurementRow]) -> Result<(), PathtrackError> {
    let json = serde_json::to_string_pretty(rows)?;
    println!("{json}");
    Ok(())
}
