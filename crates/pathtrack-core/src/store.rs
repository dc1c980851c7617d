//! Persistence of accepted rows.
//!
//! Rows are written in fixed-size batches; a failed batch aborts the save
//! and reports which batch failed, leaving earlier batches committed.

use crate::error::PathtrackError;
use crate::model::{MeasurementRow, StoredRow};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Why a single batch insert was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreFailure {
    pub status: Option<u16>,
    pub message: String,
}

impl StoreFailure {
    pub fn new(message: impl Into<String>) -> Self {
        StoreFailure {
            status: None,
            message: message.into(),
        }
    }
}

/// Backend that can persist rows and return the full history.
pub trait RowStore {
    /// Insert one batch, returning the rows with their assigned ids.
    fn insert_batch(&mut self, rows: &[MeasurementRow]) -> Result<Vec<StoredRow>, StoreFailure>;

    /// All stored rows, in insertion order.
    fn load_all(&self) -> Result<Vec<StoredRow>, PathtrackError>;
}

/// Insert `rows` in batches of `batch_size`. Batch numbers in errors are
/// 1-based.
pub fn save_rows(
    store: &mut dyn RowStore,
    rows: &[MeasurementRow],
    batch_size: usize,
) -> Result<Vec<StoredRow>, PathtrackError> {
    let mut saved = Vec::with_capacity(rows.len());
    for (idx, batch) in rows.chunks(batch_size.max(1)).enumerate() {
        let stored = store.insert_batch(batch).map_err(|f| PathtrackError::Store {
            batch: idx + 1,
            status: f.status,
            message: f.message,
        })?;
        tracing::debug!(batch = idx + 1, rows = stored.len(), "batch inserted");
        saved.extend(stored);
    }
    Ok(saved)
}

/// Plain historical rows ordered by measurement date, oldest first.
///
/// Reports are often imported out of order, so insertion order says nothing
/// about which result is the most recent. The sort is stable: rows sharing a
/// date keep their insertion order.
pub fn history(stored: Vec<StoredRow>) -> Vec<MeasurementRow> {
    let mut rows: Vec<MeasurementRow> = stored.into_iter().map(|s| s.row).collect();
    rows.sort_by_key(|r| r.date);
    rows
}

fn assign_ids(next_id: &mut u64, rows: &[MeasurementRow]) -> Vec<StoredRow> {
    rows.iter()
        .map(|row| {
            *next_id += 1;
            StoredRow {
                id: *next_id,
                row: row.clone(),
            }
        })
        .collect()
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Vec<StoredRow>,
    next_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RowStore for MemoryStore {
    fn insert_batch(&mut self, rows: &[MeasurementRow]) -> Result<Vec<StoredRow>, StoreFailure> {
        let stored = assign_ids(&mut self.next_id, rows);
        self.rows.extend(stored.iter().cloned());
        Ok(stored)
    }

    fn load_all(&self) -> Result<Vec<StoredRow>, PathtrackError> {
        Ok(self.rows.clone())
    }
}

/// Store backed by a JSON array on disk. Every batch rewrites the file
/// atomically, so a crash never leaves a half-written history.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    rows: Vec<StoredRow>,
    next_id: u64,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty history.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PathtrackError> {
        let path = path.as_ref().to_path_buf();
        let rows: Vec<StoredRow> = match std::fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Vec::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|e| {
                PathtrackError::InvalidFile(format!("{}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        let next_id = rows.iter().map(|r| r.id).max().unwrap_or(0);
        tracing::debug!(path = %path.display(), rows = rows.len(), "opened row store");
        Ok(JsonFileStore {
            path,
            rows,
            next_id,
        })
    }

    fn persist(&self, rows: &[StoredRow]) -> Result<(), PathtrackError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, rows)?;
        tmp.write_all(b"\n")?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl RowStore for JsonFileStore {
    fn insert_batch(&mut self, rows: &[MeasurementRow]) -> Result<Vec<StoredRow>, StoreFailure> {
        let mut next_id = self.next_id;
        let stored = assign_ids(&mut next_id, rows);

        let mut all = self.rows.clone();
        all.extend(stored.iter().cloned());
        self.persist(&all)
            .map_err(|e| StoreFailure::new(e.to_string()))?;

        self.rows = all;
        self.next_id = next_id;
        Ok(stored)
    }

    fn load_all(&self) -> Result<Vec<StoredRow>, PathtrackError> {
        Ok(self.rows.clone())
    }
}
