use std::fmt;
use std::time::Duration;

/// Failures raised by an OCR backend.
///
/// `EngineUnavailable` means the engine could not be started at all, which is an
/// environment problem. Everything else means the engine ran and failed on this input.
#[derive(Debug, Clone)]
pub enum OcrError {
    EngineUnavailable(String),
    RecognitionFailed(String),
    DeadlineExceeded(Duration),
    InvalidLanguageCode(String),
    ImageProcessingFailed(String),
    IOError(String),
}

impl fmt::Display for OcrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EngineUnavailable(msg) => write!(f, "OCR engine unavailable: {}", msg),
            Self::RecognitionFailed(msg) => write!(f, "Recognition failed: {}", msg),
            Self::DeadlineExceeded(limit) => {
                write!(f, "OCR deadline of {}s exceeded", limit.as_secs())
            }
            Self::InvalidLanguageCode(msg) => write!(f, "Invalid language code: {}", msg),
            Self::ImageProcessingFailed(msg) => write!(f, "Image processing failed: {}", msg),
            Self::IOError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for OcrError {}

impl OcrError {
    pub fn is_engine_unavailable(&self) -> bool {
        matches!(self, Self::EngineUnavailable(_))
    }
}
