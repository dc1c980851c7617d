use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// One extracted measurement: a single test result on a single date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementRow {
    pub date: NaiveDate,
    pub test: String,
    pub value: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_low: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_high: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl MeasurementRow {
    /// Build a row with no optional fields set.
    ///
    /// Returns None when the trimmed test name is empty.
    pub fn new(date: NaiveDate, test: &str, value: Decimal) -> Option<MeasurementRow> {
        let test = test.trim();
        if test.is_empty() {
            return None;
        }
        Some(MeasurementRow {
            date,
            test: test.to_string(),
            value,
            unit: None,
            ref_low: None,
            ref_high: None,
            category: None,
        })
    }

    pub fn with_unit(mut self, unit: Option<&str>) -> Self {
        self.unit = non_blank(unit);
        self
    }

    pub fn with_range(mut self, range: RangeBounds) -> Self {
        self.ref_low = range.low;
        self.ref_high = range.high;
        self
    }

    pub fn with_category(mut self, category: Option<&str>) -> Self {
        self.category = non_blank(category);
        self
    }

    /// Key used to match rows of the same test across reports.
    pub fn test_key(&self) -> String {
        crate::parsing::normalize::normalize_test_name(&self.test)
    }
}

/// Low/high bounds of a reference range. Each side is independent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeBounds {
    pub low: Option<Decimal>,
    pub high: Option<Decimal>,
}

impl RangeBounds {
    pub fn is_empty(&self) -> bool {
        self.low.is_none() && self.high.is_none()
    }
}

/// Metadata carried over from earlier rows of the same test.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowMeta {
    pub category: Option<String>,
    pub unit: Option<String>,
    pub ref_low: Option<Decimal>,
    pub ref_high: Option<Decimal>,
}

impl RowMeta {
    pub fn is_complete(&self) -> bool {
        self.category.is_some()
            && self.unit.is_some()
            && self.ref_low.is_some()
            && self.ref_high.is_some()
    }
}

/// A row as returned by a store, with its assigned identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRow {
    pub id: u64,
    #[serde(flatten)]
    pub row: MeasurementRow,
}

/// The kind of an uploaded input, which decides how it is turned into rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Pdf,
    Image,
    Csv,
    Tsv,
    Json,
    Text,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputKind::Pdf => write!(f, "pdf"),
            InputKind::Image => write!(f, "image"),
            InputKind::Csv => write!(f, "csv"),
            InputKind::Tsv => write!(f, "tsv"),
            InputKind::Json => write!(f, "json"),
            InputKind::Text => write!(f, "text"),
        }
    }
}

impl InputKind {
    /// Guess the kind from a file extension. Unknown extensions are read as text.
    pub fn from_path(path: &Path) -> InputKind {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => InputKind::Pdf,
            "png" | "jpg" | "jpeg" | "webp" | "tif" | "tiff" => InputKind::Image,
            "csv" => InputKind::Csv,
            "tsv" => InputKind::Tsv,
            "json" => InputKind::Json,
            _ => InputKind::Text,
        }
    }

    /// Kinds that carry their own columns and bypass the free-text parser.
    pub fn is_structured(&self) -> bool {
        matches!(self, InputKind::Csv | InputKind::Tsv | InputKind::Json)
    }
}

fn non_blank(s: Option<&str>) -> Option<String> {
    s.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
