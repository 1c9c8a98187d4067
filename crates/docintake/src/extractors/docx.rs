//! Word document extractor.

use super::DocumentExtractor;
use crate::Result;
use crate::core::config::ExtractionConfig;
use crate::extraction::docx::extract_docx_file;
use crate::types::Content;
use std::path::Path;

#[derive(Debug, Default)]
pub struct DocxExtractor;

impl DocxExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentExtractor for DocxExtractor {
    fn name(&self) -> &str {
        "docx"
    }

    fn extract_file(&self, path: &Path, _config: &ExtractionConfig) -> Result<Content> {
        Ok(Content::Text(extract_docx_file(path)?))
    }
}
