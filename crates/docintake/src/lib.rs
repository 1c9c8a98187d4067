//! Docintake - client document intake and entity extraction
//!
//! Docintake reads client-supplied documents (PDF, Excel, Word and scanned images),
//! recovers their text and pulls a fixed set of identity fields out of it: full name,
//! birth date, passport series and number, INN and SNILS.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use docintake::{ExtractionConfig, extract_file};
//!
//! # fn main() -> docintake::Result<()> {
//! let config = ExtractionConfig::default();
//! let result = extract_file("passport.pdf", &config)?;
//! match &result.error {
//!     None => println!("{:?}", result.structured_data),
//!     Some(error) => eprintln!("{}: {}", result.filename, error),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Core Module** (`core`): configuration, extension-based dispatch, batch runs
//! - **Extractors** (`extractors`): one per file class, behind [`DocumentExtractor`]
//! - **PDF** (`pdf`): text layer first, then an ordered chain of OCR fallbacks
//! - **OCR** (`ocr`): the [`OcrBackend`] seam and the Tesseract command-line backend
//! - **Entities** (`entities`): the immutable pattern registry and matcher
//!
//! Extraction is fully synchronous. Batches fan out over a bounded `rayon` pool; a
//! failure, including a panic, is recorded on that file's result and never stops
//! the batch.

#![deny(unsafe_code)]

pub mod core;
pub mod entities;
pub mod error;
pub mod extraction;
pub mod extractors;
pub mod image;
pub mod ocr;
pub mod pdf;
pub mod types;

pub use error::{DocintakeError, ErrorKind, Result};
pub use types::*;

pub use core::batch::{BatchSummary, FailedFile};
pub use core::config::{
    ExtractionConfig, ImageConfig, OcrConfig, PdfConfig, PdfStrategy, SpreadsheetConfig,
};
pub use core::dispatcher::Dispatcher;
pub use core::formats::FileKind;

pub use entities::{EntityRegistry, PatternDefinition, extract_entities};
pub use extractors::DocumentExtractor;
pub use ocr::{OcrBackend, OcrError, OcrInput, OcrRequest, TesseractBackend};

use std::path::Path;

/// Extract one file with a fresh [`Dispatcher`].
///
/// Fails only when `config` is invalid; problems with the file itself are recorded
/// on the returned result.
pub fn extract_file(path: impl AsRef<Path>, config: &ExtractionConfig) -> Result<ExtractionResult> {
    let dispatcher = Dispatcher::new(config.clone())?;
    Ok(dispatcher.process(path))
}

/// Extract many files on a bounded worker pool, preserving input order.
pub fn batch_extract<P>(paths: &[P], config: &ExtractionConfig) -> Result<Vec<ExtractionResult>>
where
    P: AsRef<Path> + Sync,
{
    let dispatcher = Dispatcher::new(config.clone())?;
    Ok(dispatcher.batch_process(paths))
}
