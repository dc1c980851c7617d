use crate::error::PathtrackError;
use crate::extraction::{spawn_error, tool_stdout, TextExtractor};
use std::io::Write;
use std::process::Command;

/// Selectable-text backend using pdftotext (from poppler-utils).
///
/// Uses `pdftotext -layout` so each table row of a report stays on one line.
pub struct PdftotextExtractor;

impl PdftotextExtractor {
    pub fn new() -> Self {
        PdftotextExtractor
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PdftotextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, PathtrackError> {
        let mut tmpfile =
            tempfile::NamedTempFile::new().map_err(|e| PathtrackError::Extraction(e.to_string()))?;
        tmpfile
            .write_all(bytes)
            .map_err(|e| PathtrackError::Extraction(e.to_string()))?;

        let output = Command::new("pdftotext")
            .arg("-layout")
            .arg(tmpfile.path())
            .arg("-") // output to stdout
            .output()
            .map_err(|e| spawn_error("pdftotext", e))?;

        let text = tool_stdout("pdftotext", output)?;

        // pdftotext separates pages with form feeds
        Ok(join_pages(text.split('\x0c')))
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

/// Join page texts with newlines, dropping pages that are blank.
pub(crate) fn join_pages<'a>(pages: impl Iterator<Item = &'a str>) -> String {
    pages
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_pages_drops_blank_pages() {
        let text = "Collected: 11/07/2025\nPSA 56\n\x0c\n\x0cTSH 2.1\n\x0c";
        assert_eq!(
            join_pages(text.split('\x0c')),
            "Collected: 11/07/2025\nPSA 56\nTSH 2.1"
        );
    }
}
