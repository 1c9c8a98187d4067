//! Tesseract command-line backend.
//!
//! Each call writes its input (when it is an in-memory image) and the engine's
//! output into a scoped temporary directory that is removed on every exit path.

use super::backend::{OcrBackend, OcrInput, OcrRequest, require_text};
use super::error::OcrError;
use super::validation::validate_language_code;
use crate::core::config::OcrConfig;
use crate::core::process::{self, TESSERACT, WaitOutcome};
use once_cell::sync::OnceCell;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Stderr fragments meaning the engine is installed but its language data is not.
const MISSING_LANGUAGE_DATA: &[&str] = &["Failed loading language", "Error opening data file"];

/// OCR through the `tesseract` executable.
#[derive(Debug, Default)]
pub struct TesseractBackend {
    explicit_path: Option<PathBuf>,
    binary: OnceCell<PathBuf>,
}

impl TesseractBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use exactly `path`; environment overrides and `PATH` are not searched.
    pub fn with_binary(path: impl Into<PathBuf>) -> Self {
        Self {
            explicit_path: Some(path.into()),
            binary: OnceCell::new(),
        }
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        match &config.tesseract_path {
            Some(path) => Self::with_binary(path),
            None => Self::new(),
        }
    }

    /// Path of the executable, located on first use.
    pub fn binary(&self) -> Result<&Path, OcrError> {
        self.binary
            .get_or_try_init(|| {
                let explicit = self.explicit_path.as_deref();
                process::locate_binary(&TESSERACT, explicit)
                    .ok_or_else(|| OcrError::EngineUnavailable(process::not_found_message(&TESSERACT, explicit)))
            })
            .map(PathBuf::as_path)
    }

    pub fn is_available(&self) -> bool {
        self.binary().is_ok()
    }

    fn run(&self, input_path: &Path, workdir: &Path, request: &OcrRequest) -> Result<String, OcrError> {
        let binary = self.binary()?;
        let output_base = workdir.join("out");
        let stderr_path = workdir.join("stderr.log");
        let stderr_file = File::create(&stderr_path).map_err(|e| OcrError::IOError(e.to_string()))?;

        let mut command = Command::new(binary);
        command
            .arg(input_path)
            .arg(&output_base)
            .arg("-l")
            .arg(&request.languages)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(stderr_file));
        if let Some(psm) = request.psm {
            command.arg("--psm").arg(psm.to_string());
        }

        let timeout = request.remaining()?;
        tracing::debug!(
            "Running {} on {} (languages: {}, timeout: {:?})",
            binary.display(),
            input_path.display(),
            request.languages,
            timeout
        );

        let outcome = process::run_with_timeout(&mut command, timeout).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                OcrError::EngineUnavailable(process::unavailable_message(&TESSERACT, &e.to_string()))
            }
            _ => OcrError::IOError(format!("Failed to run tesseract: {}", e)),
        })?;

        match outcome {
            WaitOutcome::TimedOut => {
                let limit = request.deadline.map(|d| d.limit()).unwrap_or_default();
                Err(OcrError::DeadlineExceeded(limit))
            }
            WaitOutcome::Exited(status) if !status.success() => {
                let stderr = fs::read_to_string(&stderr_path).unwrap_or_default();
                let stderr = stderr.trim();
                if MISSING_LANGUAGE_DATA.iter().any(|needle| stderr.contains(needle)) {
                    Err(OcrError::EngineUnavailable(format!(
                        "tesseract is missing language data for '{}': {}",
                        request.languages, stderr
                    )))
                } else {
                    Err(OcrError::RecognitionFailed(format!(
                        "tesseract exited with code {}: {}",
                        status.code().unwrap_or(-1),
                        stderr
                    )))
                }
            }
            WaitOutcome::Exited(_) => {
                let text = fs::read_to_string(output_base.with_extension("txt"))
                    .map_err(|e| OcrError::RecognitionFailed(format!("tesseract produced no output file: {}", e)))?;
                require_text(text)
            }
        }
    }
}

impl OcrBackend for TesseractBackend {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize(&self, input: OcrInput<'_>, request: &OcrRequest) -> Result<String, OcrError> {
        validate_language_code(&request.languages)?;
        request.remaining()?;

        let workdir = tempfile::Builder::new()
            .prefix("docintake-ocr-")
            .tempdir()
            .map_err(|e| OcrError::IOError(format!("Failed to create OCR work directory: {}", e)))?;

        match input {
            OcrInput::Image(image) => {
                let input_path = workdir.path().join("input.png");
                image
                    .save(&input_path)
                    .map_err(|e| OcrError::ImageProcessingFailed(format!("Failed to write OCR input: {}", e)))?;
                self.run(&input_path, workdir.path(), request)
            }
            OcrInput::File(path) => self.run(path, workdir.path(), request),
        }
    }
}
