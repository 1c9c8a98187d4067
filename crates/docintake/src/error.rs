//! Error types for docintake.
//!
//! Every failure in the pipeline is a [`DocintakeError`]. Extractors return them,
//! and the dispatcher converts them into a [`FailureReport`](crate::types::FailureReport)
//! stored on the per-file result, so no single file can abort a batch.
//!
//! # Taxonomy
//!
//! - `FileNotFound` / `UnsupportedFileType` - rejected before any extractor runs
//! - `TextLayerExtractionFailed` - a single PDF page failed; logged, never fatal
//! - `OcrEngineUnavailable` - the OCR engine is not installed or not runnable.
//!   This is an environment problem, not a document problem, and is reported
//!   distinctly from `OcrRecognitionFailed`.
//! - `OcrRecognitionFailed` - the engine ran but produced no usable text,
//!   errored, or exceeded its deadline
//! - `SpreadsheetRead` / `WordDocumentRead` - the workbook or document could not be parsed
//! - `NoTextRecovered` - a PDF had no text layer and OCR recovered nothing
//!
//! `Io` errors bubble up unchanged from `std::io`.
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `DocintakeError`.
pub type Result<T> = std::result::Result<T, DocintakeError>;

/// Main error type for all docintake operations.
#[derive(Debug, Error)]
pub enum DocintakeError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("text layer extraction failed on page {page}: {message}")]
    TextLayerExtractionFailed { page: u32, message: String },

    #[error("OCR engine unavailable: {0}")]
    OcrEngineUnavailable(String),

    #[error("OCR recognition failed: {message}")]
    OcrRecognitionFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("spreadsheet read error: {message}")]
    SpreadsheetRead {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Word document read error: {message}")]
    WordDocumentRead {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("no text recovered from PDF: {0}")]
    NoTextRecovered(String),

    #[error("PDF error: {message}")]
    Pdf {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("image processing error: {message}")]
    ImageProcessing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Serializable tag for a [`DocintakeError`], recorded on failed results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    FileNotFound,
    UnsupportedFileType,
    TextLayerExtractionFailed,
    OcrEngineUnavailable,
    OcrRecognitionFailed,
    SpreadsheetReadError,
    WordDocumentReadError,
    NoTextRecovered,
    PdfError,
    ImageProcessing,
    Validation,
    Serialization,
    Io,
    Other,
}

impl From<serde_json::Error> for DocintakeError {
    fn from(err: serde_json::Error) -> Self {
        DocintakeError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<calamine::Error> for DocintakeError {
    fn from(err: calamine::Error) -> Self {
        DocintakeError::SpreadsheetRead {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<crate::pdf::error::PdfError> for DocintakeError {
    fn from(err: crate::pdf::error::PdfError) -> Self {
        DocintakeError::Pdf {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<crate::ocr::error::OcrError> for DocintakeError {
    fn from(err: crate::ocr::error::OcrError) -> Self {
        use crate::ocr::error::OcrError;
        match err {
            OcrError::EngineUnavailable(msg) => DocintakeError::OcrEngineUnavailable(msg),
            OcrError::InvalidLanguageCode(_) => DocintakeError::Validation {
                message: err.to_string(),
                source: Some(Box::new(err)),
            },
            _ => DocintakeError::OcrRecognitionFailed {
                message: err.to_string(),
                source: Some(Box::new(err)),
            },
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl DocintakeError {
    error_constructor!(ocr_recognition, OcrRecognitionFailed);
    error_constructor!(spreadsheet, SpreadsheetRead);
    error_constructor!(word_document, WordDocumentRead);
    error_constructor!(pdf, Pdf);
    error_constructor!(image_processing, ImageProcessing);
    error_constructor!(validation, Validation);
    error_constructor!(serialization, Serialization);

    /// The serializable tag for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileNotFound(_) => ErrorKind::FileNotFound,
            Self::UnsupportedFileType(_) => ErrorKind::UnsupportedFileType,
            Self::TextLayerExtractionFailed { .. } => ErrorKind::TextLayerExtractionFailed,
            Self::OcrEngineUnavailable(_) => ErrorKind::OcrEngineUnavailable,
            Self::OcrRecognitionFailed { .. } => ErrorKind::OcrRecognitionFailed,
            Self::SpreadsheetRead { .. } => ErrorKind::SpreadsheetReadError,
            Self::WordDocumentRead { .. } => ErrorKind::WordDocumentReadError,
            Self::NoTextRecovered(_) => ErrorKind::NoTextRecovered,
            Self::Pdf { .. } => ErrorKind::PdfError,
            Self::ImageProcessing { .. } => ErrorKind::ImageProcessing,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Serialization { .. } => ErrorKind::Serialization,
            Self::Io(_) => ErrorKind::Io,
            Self::Other(_) => ErrorKind::Other,
        }
    }

    /// True when the failure points at the environment rather than the document.
    pub fn is_environment_failure(&self) -> bool {
        matches!(self, Self::OcrEngineUnavailable(_))
    }
}
