//! OCR backend trait.
//!
//! Backends are synchronous: the worker that calls [`OcrBackend::recognize`] blocks
//! until text comes back, the engine fails, or the request's deadline passes.

use super::error::OcrError;
use crate::core::config::OcrConfig;
use image::GrayImage;
use std::path::Path;
use std::time::{Duration, Instant};

/// What to recognize.
#[derive(Debug, Clone, Copy)]
pub enum OcrInput<'a> {
    /// A binarized page produced by the image preprocessor.
    Image(&'a GrayImage),
    /// A file handed to the engine unmodified: an image whose preprocessing
    /// failed, or a whole PDF for direct OCR.
    File(&'a Path),
}

/// A point in time after which OCR work for one file must stop.
///
/// One deadline is created per file when its OCR stage begins and is shared by
/// every engine call made for that file.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    limit: Duration,
}

impl Deadline {
    pub fn after(limit: Duration) -> Self {
        Self {
            started: Instant::now(),
            limit,
        }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Time left, or `DeadlineExceeded` when none is.
    pub fn remaining(&self) -> Result<Duration, OcrError> {
        let left = self.limit.saturating_sub(self.started.elapsed());
        if left.is_zero() {
            Err(OcrError::DeadlineExceeded(self.limit))
        } else {
            Ok(left)
        }
    }
}

/// Per-call parameters.
#[derive(Debug, Clone)]
pub struct OcrRequest {
    /// `+`-joined engine language codes, e.g. `rus+eng`.
    pub languages: String,
    /// Tesseract page segmentation mode.
    pub psm: Option<u8>,
    pub deadline: Option<Deadline>,
}

impl OcrRequest {
    pub fn new(languages: impl Into<String>) -> Self {
        Self {
            languages: languages.into(),
            psm: None,
            deadline: None,
        }
    }

    /// A request carrying the configured languages and page segmentation mode.
    pub fn from_config(config: &OcrConfig) -> Self {
        Self {
            languages: config.languages.clone(),
            psm: config.psm,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Remaining time under the deadline, `None` when unbounded.
    pub fn remaining(&self) -> Result<Option<Duration>, OcrError> {
        self.deadline.as_ref().map(Deadline::remaining).transpose()
    }
}

/// An OCR engine.
///
/// Implementations must be `Send + Sync`; one instance serves every worker in a batch.
/// A successful call returns non-blank text. Blank output is `RecognitionFailed`,
/// and an engine that cannot be started is `EngineUnavailable`.
pub trait OcrBackend: Send + Sync {
    fn name(&self) -> &str;

    fn recognize(&self, input: OcrInput<'_>, request: &OcrRequest) -> Result<String, OcrError>;
}

/// Normalize raw engine output: blank output is a recognition failure.
pub fn require_text(raw: String) -> Result<String, OcrError> {
    if raw.trim().is_empty() {
        Err(OcrError::RecognitionFailed("engine produced no text".to_string()))
    } else {
        Ok(raw)
    }
}
