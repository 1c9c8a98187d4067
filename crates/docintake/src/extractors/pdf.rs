//! PDF extractor.

use super::DocumentExtractor;
use crate::Result;
use crate::core::config::ExtractionConfig;
use crate::ocr::OcrBackend;
use crate::pdf::extract_pdf_text;
use crate::types::Content;
use std::path::Path;
use std::sync::Arc;

/// Text layer first, OCR only when the text layer is empty.
pub struct PdfExtractor {
    ocr: Arc<dyn OcrBackend>,
}

impl PdfExtractor {
    pub fn new(ocr: Arc<dyn OcrBackend>) -> Self {
        Self { ocr }
    }
}

impl DocumentExtractor for PdfExtractor {
    fn name(&self) -> &str {
        "pdf"
    }

    fn extract_file(&self, path: &Path, config: &ExtractionConfig) -> Result<Content> {
        let recovered = extract_pdf_text(path, self.ocr.as_ref(), config)?;
        Ok(Content::Text(recovered.text))
    }
}
