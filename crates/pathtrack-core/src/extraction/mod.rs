pub mod ocr;
pub mod pdftotext;

use crate::error::PathtrackError;
use crate::model::InputKind;
use std::process::Output;

/// Selectable PDF text no longer than this (after collapsing whitespace) is
/// taken to be a scanned document.
pub const DEFAULT_MIN_SELECTABLE_CHARS: usize = 30;

/// Trait for document-to-text backends.
pub trait TextExtractor: Send + Sync {
    /// Produce a best-effort plain-text rendering of a document.
    fn extract_text(&self, bytes: &[u8]) -> Result<String, PathtrackError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Turns uploaded bytes into text, choosing a backend per input kind.
///
/// PDFs go through the selectable-text backend first and fall back to OCR
/// when that yields too little text. Images always use OCR. Structured and
/// text inputs are decoded as UTF-8.
pub struct DocumentReader {
    pdf_text: Box<dyn TextExtractor>,
    pdf_ocr: Box<dyn TextExtractor>,
    image_ocr: Box<dyn TextExtractor>,
    min_selectable_chars: usize,
}

impl DocumentReader {
    pub fn new(
        pdf_text: Box<dyn TextExtractor>,
        pdf_ocr: Box<dyn TextExtractor>,
        image_ocr: Box<dyn TextExtractor>,
    ) -> Self {
        DocumentReader {
            pdf_text,
            pdf_ocr,
            image_ocr,
            min_selectable_chars: DEFAULT_MIN_SELECTABLE_CHARS,
        }
    }

    /// Reader backed by poppler-utils and the tesseract CLI.
    pub fn system(ocr_language: &str) -> Self {
        DocumentReader::new(
            Box::new(pdftotext::PdftotextExtractor::new()),
            Box::new(ocr::PdfOcrExtractor::new(ocr_language)),
            Box::new(ocr::TesseractOcr::new(ocr_language)),
        )
    }

    pub fn with_min_selectable_chars(mut self, min: usize) -> Self {
        self.min_selectable_chars = min;
        self
    }

    pub fn read(&self, kind: InputKind, bytes: &[u8]) -> Result<String, PathtrackError> {
        match kind {
            InputKind::Pdf => self.read_pdf(bytes),
            InputKind::Image => {
                tracing::info!(backend = self.image_ocr.backend_name(), "running OCR on image");
                self.image_ocr.extract_text(bytes)
            }
            InputKind::Csv | InputKind::Tsv | InputKind::Json | InputKind::Text => {
                Ok(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }

    fn read_pdf(&self, bytes: &[u8]) -> Result<String, PathtrackError> {
        let selectable = self.pdf_text.extract_text(bytes)?;
        if has_enough_text(&selectable, self.min_selectable_chars) {
            return Ok(selectable);
        }
        tracing::warn!(
            backend = self.pdf_ocr.backend_name(),
            chars = collapsed_len(&selectable),
            "PDF has little selectable text, falling back to OCR"
        );
        self.pdf_ocr.extract_text(bytes)
    }
}

/// True when the text, with whitespace runs collapsed, is longer than `min`.
pub fn has_enough_text(text: &str, min: usize) -> bool {
    collapsed_len(text) > min
}

fn collapsed_len(text: &str) -> usize {
    let words: Vec<&str> = text.split_whitespace().collect();
    let chars: usize = words.iter().map(|w| w.chars().count()).sum();
    chars + words.len().saturating_sub(1)
}

/// Map the output of an external tool to its stdout text or a tool error.
pub(crate) fn tool_stdout(tool: &str, output: Output) -> Result<String, PathtrackError> {
    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        return Err(PathtrackError::ToolFailed {
            tool: tool.to_string(),
            code,
            stderr,
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Map a spawn failure of an external tool.
pub(crate) fn spawn_error(tool: &str, e: std::io::Error) -> PathtrackError {
    if e.kind() == std::io::ErrorKind::NotFound {
        PathtrackError::ToolNotFound {
            tool: tool.to_string(),
        }
    } else {
        PathtrackError::Extraction(format!("{tool} failed: {e}"))
    }
}
