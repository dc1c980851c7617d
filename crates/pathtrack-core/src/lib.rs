//! Turns pathology reports into dated measurement rows.
//!
//! Free text (typed, copied from a PDF, or OCR output) goes through the
//! rule-based pipeline in [`parsing`]; CSV/TSV/JSON uploads go through the
//! [`structured`] adapters; an optional model-assisted path lives in [`llm`].
//! Rows missing a category, unit, or range can be completed from earlier
//! results with [`backfill`].

pub mod backfill;
pub mod config;
pub mod error;
pub mod export;
pub mod extraction;
pub mod llm;
pub mod model;
pub mod parsing;
pub mod store;
pub mod structured;

use error::PathtrackError;
use extraction::DocumentReader;
use llm::{LlmClient, RetryPolicy};
use model::{InputKind, MeasurementRow};

pub use backfill::backfill_rows;
pub use structured::{parse_csv, parse_json, parse_tsv};

/// Parse free report text, dating rows before any header with today's local date.
pub fn parse_text(text: &str) -> Vec<MeasurementRow> {
    parsing::parse_text_on(text, chrono::Local::now().date_naive())
}

/// Parse already-decoded input according to its kind. PDF, image, and text
/// inputs all use the free-text pipeline.
pub fn parse_input(kind: InputKind, text: &str) -> Result<Vec<MeasurementRow>, PathtrackError> {
    match kind {
        InputKind::Csv => Ok(parse_csv(text)),
        InputKind::Tsv => Ok(parse_tsv(text)),
        InputKind::Json => parse_json(text),
        InputKind::Pdf | InputKind::Image | InputKind::Text => Ok(parse_text(text)),
    }
}

/// Turn uploaded bytes into text using the reader's backends.
pub fn read_document(
    reader: &DocumentReader,
    kind: InputKind,
    bytes: &[u8],
) -> Result<String, PathtrackError> {
    reader.read(kind, bytes)
}

/// How rows are pulled out of unstructured documents.
pub enum RowSource<'a> {
    /// The rule-based line parser.
    Rules,
    /// A language model, retried per `policy` when rate limited.
    Model {
        client: &'a dyn LlmClient,
        policy: RetryPolicy,
    },
}

/// Read a document, extract its rows, and complete missing metadata from
/// `history`. Structured kinds always use their adapters.
pub fn import_document(
    reader: &DocumentReader,
    source: &RowSource<'_>,
    kind: InputKind,
    bytes: &[u8],
    history: &[MeasurementRow],
) -> Result<Vec<MeasurementRow>, PathtrackError> {
    let text = read_document(reader, kind, bytes)?;

    let rows = match source {
        RowSource::Model { client, policy } if !kind.is_structured() => {
            llm::extract_rows(*client, policy, &text)?
        }
        _ => parse_input(kind, &text)?,
    };

    let rows = backfill_rows(rows, history);
    tracing::info!(kind = %kind, rows = rows.len(), "document imported");
    Ok(rows)
}
