pub mod export;
pub mod import;
pub mod parse;

use pathtrack_core::config::Config;
use pathtrack_core::error::PathtrackError;
use pathtrack_core::extraction::DocumentReader;
use pathtrack_core::llm::OpenAiClient;
use pathtrack_core::model::{InputKind, MeasurementRow};
use pathtrack_core::RowSource;
use std::path::Path;

/// Values accepted by `--kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum KindArg {
    Pdf,
    #[value(aliases = ["png", "jpg", "jpeg"])]
    Image,
    Csv,
    Tsv,
    Json,
    #[value(alias = "txt")]
    Text,
}

impl From<KindArg> for InputKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Pdf => InputKind::Pdf,
            KindArg::Image => InputKind::Image,
            KindArg::Csv => InputKind::Csv,
            KindArg::Tsv => InputKind::Tsv,
            KindArg::Json => InputKind::Json,
            KindArg::Text => InputKind::Text,
        }
    }
}

/// The input kind from `--kind`, or guessed from the file extension.
fn input_kind(path: &Path, kind: Option<KindArg>) -> InputKind {
    kind.map_or_else(|| InputKind::from_path(path), InputKind::from)
}

fn document_reader(config: &Config) -> DocumentReader {
    DocumentReader::system(&config.extraction.ocr_language)
        .with_min_selectable_chars(config.extraction.min_selectable_chars)
}

fn model_client(config: &Config) -> Result<OpenAiClient, PathtrackError> {
    let llm = &config.llm;
    OpenAiClient::new(&llm.api_url, &llm.api_key()?, &llm.model, llm.timeout_secs)
}

/// Read, extract, and backfill one input file.
fn import_file(
    config: &Config,
    input_file: &Path,
    kind: Option<KindArg>,
    use_llm: bool,
    history: &[MeasurementRow],
) -> Result<Vec<MeasurementRow>, PathtrackError> {
    let kind = input_kind(input_file, kind);
    let bytes = std::fs::read(input_file)?;
    let reader = document_reader(config);

    if use_llm {
        let client = model_client(config)?;
        let source = RowSource::Model {
            client: &client,
            policy: config.llm.retry_policy(),
        };
        pathtrack_core::import_document(&reader, &source, kind, &bytes, history)
    } else {
        pathtrack_core::import_document(&reader, &RowSource::Rules, kind, &bytes, history)
    }
}

fn report_no_rows(input_file: &Path) {
    eprintln!(
        "No measurements found in {}. The file was readable; check its formatting.",
        input_file.display()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::ValueEnum;

    #[test]
    fn test_kind_flag_overrides_extension() {
        let path = Path::new("results.txt");
        assert_eq!(input_kind(path, Some(KindArg::Csv)), InputKind::Csv);
        assert_eq!(input_kind(path, None), InputKind::Text);
    }

    #[test]
    fn test_kind_values_and_aliases() {
        assert_eq!(KindArg::from_str("pdf", true), Ok(KindArg::Pdf));
        assert_eq!(KindArg::from_str("JPG", true), Ok(KindArg::Image));
        assert_eq!(KindArg::from_str("txt", false), Ok(KindArg::Text));
        assert!(KindArg::from_str("xlsx", true).is_err());
    }
}
