//! Core pipeline: configuration, file classification, dispatch and batch runs.

pub mod batch;
pub mod config;
pub mod dispatcher;
pub mod formats;
pub mod process;

pub use batch::{BatchSummary, FailedFile};
pub use config::{ExtractionConfig, ImageConfig, OcrConfig, PdfConfig, PdfStrategy, SpreadsheetConfig};
pub use dispatcher::Dispatcher;
pub use formats::{FileKind, classify};
