//! Adapters for inputs that already carry structure (CSV/TSV/JSON) and bypass
//! the free-text pipeline. They share the date resolver and range splitter so
//! every path yields the same row shape.

pub mod delimited;
pub mod json;

pub use delimited::{parse_csv, parse_tsv};
pub use json::parse_json;
