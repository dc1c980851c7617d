use pathtrack_core::config::Config;
use pathtrack_core::error::PathtrackError;
use pathtrack_core::store::{history, save_rows, JsonFileStore, RowStore};
use std::path::PathBuf;

use super::KindArg;

pub fn run(
    config: &Config,
    input_file: PathBuf,
    store_path: PathBuf,
    kind: Option<KindArg>,
    use_llm: bool,
) -> Result<(), PathtrackError> {
    let mut store = JsonFileStore::open(&store_path)?;
    let known = history(store.load_all()?);

    let rows = super::import_file(config, &input_file, kind, use_llm, &known)?;
    if rows.is_empty() {
        super::report_no_rows(&input_file);
        return Ok(());
    }

    let saved = save_rows(&mut store, &rows, config.store.batch_size)?;
    eprintln!(
        "Imported {} row(s) into {}",
        saved.len(),
        store_path.display()
    );
    Ok(())
}
