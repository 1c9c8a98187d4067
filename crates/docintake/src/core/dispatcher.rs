//! Format dispatcher: the per-file entry point of the pipeline.
//!
//! [`Dispatcher::process`] never fails. Every outcome, including a panic inside a
//! parser, ends up in the returned [`ExtractionResult`], so one bad file cannot stop
//! a batch.

use crate::Result;
use crate::core::config::ExtractionConfig;
use crate::core::formats::{self, FileKind};
use crate::entities::{EntityRegistry, extract_entities};
use crate::error::DocintakeError;
use crate::extraction::excel::profile_data;
use crate::extractors::{DocumentExtractor, DocxExtractor, ExcelExtractor, ImageExtractor, PdfExtractor};
use crate::ocr::{OcrBackend, TesseractBackend};
use crate::types::{Content, ExtractionResult};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Routes files to extractors and assembles uniform results.
///
/// The dispatcher owns no mutable state; one instance is shared by every worker
/// of a batch.
///
/// # Example
///
/// ```rust,no_run
/// use docintake::{Dispatcher, ExtractionConfig};
///
/// # fn main() -> docintake::Result<()> {
/// let dispatcher = Dispatcher::new(ExtractionConfig::default())?;
/// let result = dispatcher.process("scan.pdf");
/// if let Some(error) = &result.error {
///     eprintln!("{}: {}", result.filename, error);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Dispatcher {
    config: ExtractionConfig,
    registry: Arc<EntityRegistry>,
    pdf: Arc<dyn DocumentExtractor>,
    spreadsheet: Arc<dyn DocumentExtractor>,
    word: Arc<dyn DocumentExtractor>,
    image: Arc<dyn DocumentExtractor>,
}

impl Dispatcher {
    /// Build a dispatcher using the Tesseract executable for OCR.
    pub fn new(config: ExtractionConfig) -> Result<Self> {
        let ocr: Arc<dyn OcrBackend> = Arc::new(TesseractBackend::from_config(&config.ocr));
        Self::with_ocr_backend(config, ocr)
    }

    /// Build a dispatcher around a caller-supplied OCR backend.
    pub fn with_ocr_backend(config: ExtractionConfig, ocr: Arc<dyn OcrBackend>) -> Result<Self> {
        config.validate()?;
        let registry = EntityRegistry::from_config(config.entities.as_deref())?;

        Ok(Self {
            pdf: Arc::new(PdfExtractor::new(Arc::clone(&ocr))),
            spreadsheet: Arc::new(ExcelExtractor::new()),
            word: Arc::new(DocxExtractor::new()),
            image: Arc::new(ImageExtractor::new(ocr)),
            registry: Arc::new(registry),
            config,
        })
    }

    /// Replace the extractor for one file class.
    pub fn with_extractor(mut self, kind: FileKind, extractor: Arc<dyn DocumentExtractor>) -> Self {
        match kind {
            FileKind::Pdf => self.pdf = extractor,
            FileKind::Spreadsheet => self.spreadsheet = extractor,
            FileKind::WordDocument => self.word = extractor,
            FileKind::Image => self.image = extractor,
        }
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn extractor_for(&self, kind: FileKind) -> &dyn DocumentExtractor {
        match kind {
            FileKind::Pdf => self.pdf.as_ref(),
            FileKind::Spreadsheet => self.spreadsheet.as_ref(),
            FileKind::WordDocument => self.word.as_ref(),
            FileKind::Image => self.image.as_ref(),
        }
    }

    /// Extract one file.
    pub fn process(&self, path: impl AsRef<Path>) -> ExtractionResult {
        let path = path.as_ref();
        let file_type = formats::normalized_extension(path);
        let result = ExtractionResult::new(display_name(path), file_type.clone());

        if !path.exists() {
            return result.fail(&DocintakeError::FileNotFound(path.to_path_buf()));
        }

        let Some(kind) = formats::classify_extension(&file_type) else {
            let shown = if file_type.is_empty() {
                "(no extension)".to_string()
            } else {
                file_type
            };
            debug!(
                "Skipping {}: supported extensions are {}",
                path.display(),
                formats::supported_extensions().join(", ")
            );
            return result.fail(&DocintakeError::UnsupportedFileType(shown));
        };

        let extractor = self.extractor_for(kind);
        debug!("Extracting {} with {} extractor", path.display(), extractor.name());

        match self.run_extractor(extractor, path) {
            Ok(content) => self.finish(result, content),
            Err(err) => {
                if err.is_environment_failure() {
                    error!("{}: {}", path.display(), err);
                } else {
                    warn!("{}: {}", path.display(), err);
                }
                result.fail(&err)
            }
        }
    }

    fn run_extractor(&self, extractor: &dyn DocumentExtractor, path: &Path) -> Result<Content> {
        panic::catch_unwind(AssertUnwindSafe(|| extractor.extract_file(path, &self.config))).unwrap_or_else(
            |payload| {
                Err(DocintakeError::Other(format!(
                    "{} extractor panicked: {}",
                    extractor.name(),
                    panic_message(payload.as_ref())
                )))
            },
        )
    }

    fn finish(&self, mut result: ExtractionResult, content: Content) -> ExtractionResult {
        result.structured_data = match &content {
            Content::Text(text) => extract_entities(text, &self.registry),
            Content::Workbook(sheets) => {
                profile_data(sheets, &self.config.spreadsheet.profile_sheet).unwrap_or_default()
            }
        };
        result.content = Some(content);

        if result.structured_data.is_empty() {
            debug!("{}: no structured data", result.filename);
        }
        result
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("patterns", &self.registry.len())
            .field("pdf", &self.pdf.name())
            .field("spreadsheet", &self.spreadsheet.name())
            .field("word", &self.word.name())
            .field("image", &self.image.name())
            .finish()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
