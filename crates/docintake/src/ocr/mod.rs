//! OCR engine adapter.
//!
//! The pipeline talks to OCR engines only through the [`OcrBackend`] trait. The
//! bundled [`TesseractBackend`] drives the `tesseract` executable; tests and embedders
//! can substitute any other implementation.
//!
//! Failures come in two classes that callers must keep apart:
//!
//! - [`OcrError::EngineUnavailable`]: the engine is not installed or cannot start.
//!   This is an environment problem and is reported as such.
//! - everything else: the engine ran and produced nothing usable for this input,
//!   including running past the file's [`Deadline`].
pub mod backend;
pub mod error;
pub mod tesseract;
pub mod validation;

pub use backend::{Deadline, OcrBackend, OcrInput, OcrRequest};
pub use error::OcrError;
pub use tesseract::TesseractBackend;
pub use validation::validate_language_code;

