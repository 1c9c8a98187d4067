//! Scanned image extractor.

use super::DocumentExtractor;
use crate::Result;
use crate::core::config::ExtractionConfig;
use crate::extraction::image::extract_image_text;
use crate::ocr::OcrBackend;
use crate::types::Content;
use std::path::Path;
use std::sync::Arc;

pub struct ImageExtractor {
    ocr: Arc<dyn OcrBackend>,
}

impl ImageExtractor {
    pub fn new(ocr: Arc<dyn OcrBackend>) -> Self {
        Self { ocr }
    }
}

impl DocumentExtractor for ImageExtractor {
    fn name(&self) -> &str {
        "image"
    }

    fn extract_file(&self, path: &Path, config: &ExtractionConfig) -> Result<Content> {
        Ok(Content::Text(extract_image_text(path, self.ocr.as_ref(), config)?))
    }
}
