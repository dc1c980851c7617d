use pathtrack_core::config::Config;
use pathtrack_core::error::PathtrackError;
use pathtrack_core::store::{history, JsonFileStore, RowStore};
use std::path::PathBuf;

use super::KindArg;

use crate::output;

pub fn run(
    config: &Config,
    input_file: PathBuf,
    kind: Option<KindArg>,
    use_llm: bool,
    history_store: Option<PathBuf>,
    output_format: &str,
    output_file: Option<PathBuf>,
) -> Result<(), PathtrackError> {
    let known = match history_store {
        Some(path) => history(JsonFileStore::open(path)?.load_all()?),
        None => Vec::new(),
    };

    let rows = super::import_file(config, &input_file, kind, use_llm, &known)?;
    if rows.is_empty() {
        super::report_no_rows(&input_file);
        return Ok(());
    }

    match output_file {
        Some(path) => {
            // Always write JSON when saving to file
            let json = serde_json::to_string_pretty(&rows)?;
            std::fs::write(&path, json)?;
            eprintln!("Parsed {} row(s), written to {}", rows.len(), path.display());
        }
        None => match output_format {
            "json" => output::json::print(&rows)?,
            _ => output::table::print(&rows),
        },
    }

    Ok(())
}
