//! Excel spreadsheet extractor.

use super::DocumentExtractor;
use crate::Result;
use crate::core::config::ExtractionConfig;
use crate::extraction::excel::read_workbook;
use crate::types::Content;
use std::path::Path;

/// Excel spreadsheet extractor using calamine.
///
/// Supports: .xlsx, .xls
#[derive(Debug, Default)]
pub struct ExcelExtractor;

impl ExcelExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentExtractor for ExcelExtractor {
    fn name(&self) -> &str {
        "excel"
    }

    fn extract_file(&self, path: &Path, _config: &ExtractionConfig) -> Result<Content> {
        Ok(Content::Workbook(read_workbook(path)?))
    }
}
