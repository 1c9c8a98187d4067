//! Document extractors used by the dispatcher.
//!
//! Each extractor handles one file class and returns the file's [`Content`]. Entity
//! extraction and failure recording happen in the dispatcher, not here.

pub mod docx;
pub mod excel;
pub mod image;
pub mod pdf;

pub use self::docx::DocxExtractor;
pub use self::excel::ExcelExtractor;
pub use self::image::ImageExtractor;
pub use self::pdf::PdfExtractor;

use crate::Result;
use crate::core::config::ExtractionConfig;
use crate::types::Content;
use std::path::Path;

/// Extracts content from files of one class.
///
/// Implementations must be `Send + Sync`: one instance serves every worker thread.
pub trait DocumentExtractor: Send + Sync {
    fn name(&self) -> &str;

    fn extract_file(&self, path: &Path, config: &ExtractionConfig) -> Result<Content>;
}
