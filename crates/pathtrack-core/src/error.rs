#[derive(Debug, thiserror::Error)]
pub enum PathtrackError {
    #[error("text extraction failed: {0}")]
    Extraction(String),

    #[error("{tool} not found. Install poppler-utils and tesseract-ocr (apt) or poppler and tesseract (brew)")]
    ToolNotFound { tool: String },

    #[error("{tool} failed with exit code {code}: {stderr}")]
    ToolFailed {
        tool: String,
        code: i32,
        stderr: String,
    },

    #[error("invalid file: {0}")]
    InvalidFile(String),

    #[error("LLM request failed: {message}")]
    Llm {
        status: Option<u16>,
        message: String,
    },

    #[error("model did not return valid JSON: {0}")]
    LlmResponse(String),

    #[error("insert of batch {batch} failed: {message}")]
    Store {
        batch: usize,
        status: Option<u16>,
        message: String,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl PathtrackError {
    /// True for upstream responses that ask the caller to slow down (HTTP 429).
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, PathtrackError::Llm { status: Some(429), .. })
    }
}
