use pathtrack_core::error::PathtrackError;
use pathtrack_core::export::write_csv;
use pathtrack_core::store::{history, JsonFileStore, RowStore};
use std::path::PathBuf;

pub fn run(store_path: PathBuf, output_file: Option<PathBuf>) -> Result<(), PathtrackError> {
    let rows = history(JsonFileStore::open(&store_path)?.load_all()?);

    match output_file {
        Some(path) => {
            let file = std::fs::File::create(&path)?;
            write_csv(&rows, std::io::BufWriter::new(file))?;
            eprintln!("Exported {} row(s) to {}", rows.len(), path.display());
        }
        None => write_csv(&rows, std::io::stdout().lock())?,
    }
    Ok(())
}
