use crate::error::PathtrackError;
use crate::extraction::pdftotext::join_pages;
use crate::extraction::{spawn_error, tool_stdout, TextExtractor};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Resolution used when rasterizing PDF pages for OCR.
const RENDER_DPI: u32 = 200;

/// Image OCR through the `tesseract` CLI.
pub struct TesseractOcr {
    language: String,
}

impl TesseractOcr {
    pub fn new(language: &str) -> Self {
        TesseractOcr {
            language: language.to_string(),
        }
    }

    fn recognize_file(&self, path: &Path) -> Result<String, PathtrackError> {
        let output = Command::new("tesseract")
            .arg(path)
            .arg("-") // output to stdout
            .arg("-l")
            .arg(&self.language)
            .output()
            .map_err(|e| spawn_error("tesseract", e))?;
        tool_stdout("tesseract", output)
    }
}

impl TextExtractor for TesseractOcr {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, PathtrackError> {
        let mut tmpfile =
            tempfile::NamedTempFile::new().map_err(|e| PathtrackError::Extraction(e.to_string()))?;
        tmpfile
            .write_all(bytes)
            .map_err(|e| PathtrackError::Extraction(e.to_string()))?;
        let text = self.recognize_file(tmpfile.path())?;
        Ok(text.trim().to_string())
    }

    fn backend_name(&self) -> &str {
        "tesseract"
    }
}

/// OCR for scanned PDFs: rasterize every page with `pdftoppm`, then run
/// tesseract on the pages in order.
pub struct PdfOcrExtractor {
    ocr: TesseractOcr,
}

impl PdfOcrExtractor {
    pub fn new(language: &str) -> Self {
        PdfOcrExtractor {
            ocr: TesseractOcr::new(language),
        }
    }
}

impl TextExtractor for PdfOcrExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, PathtrackError> {
        let workdir = tempfile::tempdir().map_err(|e| PathtrackError::Extraction(e.to_string()))?;
        let pdf_path = workdir.path().join("input.pdf");
        std::fs::write(&pdf_path, bytes).map_err(|e| PathtrackError::Extraction(e.to_string()))?;

        let output = Command::new("pdftoppm")
            .arg("-r")
            .arg(RENDER_DPI.to_string())
            .arg("-png")
            .arg(&pdf_path)
            .arg(workdir.path().join("page"))
            .output()
            .map_err(|e| spawn_error("pdftoppm", e))?;
        tool_stdout("pdftoppm", output)?;

        let pages = page_images(workdir.path())?;
        let mut texts = Vec::with_capacity(pages.len());
        for (i, page) in pages.iter().enumerate() {
            tracing::info!(page = i + 1, total = pages.len(), "OCR page");
            texts.push(self.ocr.recognize_file(page)?);
        }
        Ok(join_pages(texts.iter().map(String::as_str)))
    }

    fn backend_name(&self) -> &str {
        "pdftoppm+tesseract"
    }
}

/// Rendered page images in page order. pdftoppm names them `page-1.png`,
/// `page-01.png`, ... depending on the page count.
fn page_images(dir: &Path) -> Result<Vec<PathBuf>, PathtrackError> {
    let mut pages: Vec<(u32, PathBuf)> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter_map(|path| page_number(&path).map(|n| (n, path)))
        .collect();
    pages.sort_by_key(|(n, _)| *n);
    Ok(pages.into_iter().map(|(_, p)| p).collect())
}

fn page_number(path: &Path) -> Option<u32> {
    if path.extension()?.to_str()? != "png" {
        return None;
    }
    path.file_stem()?
        .to_str()?
        .strip_prefix("page-")?
        .parse()
        .ok()
}
