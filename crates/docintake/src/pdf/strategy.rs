//! The PDF fallback chain.
//!
//! Strategies from [`PdfConfig::strategies`](crate::core::config::PdfConfig) run in
//! order and the first one that yields non-blank text wins. The default order is:
//!
//! 1. `text_layer` - the native text layer; when it has text, OCR never runs
//! 2. `direct_ocr` - the whole PDF handed to the OCR engine; engine-dependent and
//!    may cover only part of a multi-page scan
//! 3. `rendered_page_ocr` - every page rendered, preprocessed and recognized
//!
//! The OCR strategies form a single OCR stage. Its deadline starts when the first of
//! them runs and is shared by every engine call made for the document.

use super::error::PdfError;
use super::rendering::PageRenderer;
use super::text::extract_text_layer;
use crate::core::config::{ExtractionConfig, PdfStrategy};
use crate::image::prepare_for_ocr;
use crate::ocr::{Deadline, OcrBackend, OcrError, OcrInput, OcrRequest};
use crate::{DocintakeError, Result};
use std::path::Path;

/// Text recovered from a PDF and the strategy that recovered it.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfText {
    pub text: String,
    pub strategy: PdfStrategy,
}

#[derive(Debug)]
enum StepError {
    Pdf(PdfError),
    Ocr(OcrError),
}

impl From<PdfError> for StepError {
    fn from(err: PdfError) -> Self {
        Self::Pdf(err)
    }
}

impl From<OcrError> for StepError {
    fn from(err: OcrError) -> Self {
        Self::Ocr(err)
    }
}

/// Run the configured strategy chain on `path`.
///
/// # Errors
///
/// - `OcrEngineUnavailable` when no strategy produced text and an OCR strategy could
///   not start the engine
/// - `OcrRecognitionFailed` when the OCR stage ran out of time
/// - `Pdf` when the document could not be opened and OCR recovered nothing
/// - `NoTextRecovered` otherwise
pub fn extract_pdf_text(path: &Path, ocr: &dyn OcrBackend, config: &ExtractionConfig) -> Result<PdfText> {
    let mut ocr_request: Option<OcrRequest> = None;
    let mut engine_unavailable: Option<String> = None;
    let mut open_error: Option<PdfError> = None;
    let mut attempts: Vec<String> = Vec::new();

    for &strategy in &config.pdf.strategies {
        let result = match strategy {
            PdfStrategy::TextLayer => text_layer(path),
            PdfStrategy::DirectOcr => {
                let request = ocr_request.get_or_insert_with(|| begin_ocr_stage(config));
                direct_ocr(path, ocr, request)
            }
            PdfStrategy::RenderedPageOcr => {
                let request = ocr_request.get_or_insert_with(|| begin_ocr_stage(config));
                rendered_page_ocr(path, ocr, request, config)
            }
        };

        match result {
            Ok(text) if !text.trim().is_empty() => {
                tracing::debug!("Recovered text from {} via {:?}", path.display(), strategy);
                return Ok(PdfText { text, strategy });
            }
            Ok(_) => {
                tracing::debug!("{:?} found no text in {}", strategy, path.display());
                attempts.push(format!("{:?}: no text", strategy));
            }
            Err(StepError::Ocr(OcrError::EngineUnavailable(msg))) => {
                tracing::error!("OCR engine unavailable while processing {}: {}", path.display(), msg);
                attempts.push(format!("{:?}: engine unavailable", strategy));
                engine_unavailable.get_or_insert(msg);
            }
            Err(StepError::Ocr(err @ OcrError::DeadlineExceeded(_))) => {
                tracing::warn!("OCR deadline exceeded for {}", path.display());
                return Err(err.into());
            }
            Err(StepError::Ocr(err)) => {
                tracing::warn!("{:?} failed for {}: {}", strategy, path.display(), err);
                attempts.push(format!("{:?}: {}", strategy, err));
            }
            Err(StepError::Pdf(err)) => {
                tracing::warn!("{:?} failed for {}: {}", strategy, path.display(), err);
                attempts.push(format!("{:?}: {}", strategy, err));
                if strategy == PdfStrategy::TextLayer {
                    open_error = Some(err);
                }
            }
        }
    }

    if let Some(msg) = engine_unavailable {
        return Err(DocintakeError::OcrEngineUnavailable(format!(
            "{} has no text layer and OCR could not run: {}",
            file_label(path),
            msg
        )));
    }

    if let Some(err) = open_error {
        return Err(err.into());
    }

    Err(DocintakeError::NoTextRecovered(format!(
        "{} ({})",
        file_label(path),
        attempts.join("; ")
    )))
}

fn begin_ocr_stage(config: &ExtractionConfig) -> OcrRequest {
    OcrRequest::from_config(&config.ocr).with_deadline(Deadline::after(config.ocr.timeout()))
}

fn text_layer(path: &Path) -> std::result::Result<String, StepError> {
    let layer = extract_text_layer(path)?;
    if !layer.failed_pages.is_empty() {
        tracing::warn!(
            "{} of {} pages of {} had no extractable text layer",
            layer.failed_pages.len(),
            layer.page_count,
            path.display()
        );
    }
    Ok(layer.text)
}

fn direct_ocr(path: &Path, ocr: &dyn OcrBackend, request: &OcrRequest) -> std::result::Result<String, StepError> {
    Ok(ocr.recognize(OcrInput::File(path), request)?)
}

fn rendered_page_ocr(
    path: &Path,
    ocr: &dyn OcrBackend,
    request: &OcrRequest,
    config: &ExtractionConfig,
) -> std::result::Result<String, StepError> {
    let renderer = PageRenderer::from_config(&config.pdf);
    let rendered = match renderer.render(path, request.remaining()?) {
        Ok(rendered) => rendered,
        Err(err) => {
            request.remaining()?;
            return Err(err.into());
        }
    };

    let mut texts = Vec::with_capacity(rendered.len());
    for (index, page) in rendered.pages().iter().enumerate() {
        let prepared = prepare_for_ocr(page, &config.image);
        match ocr.recognize(prepared.as_ocr_input(), request) {
            Ok(text) => texts.push(text.trim_end().to_string()),
            Err(OcrError::RecognitionFailed(msg)) => {
                tracing::warn!("No text recognized on page {} of {}: {}", index + 1, path.display(), msg);
            }
            Err(err) => return Err(err.into()),
        }
    }

    if texts.is_empty() {
        return Err(OcrError::RecognitionFailed(format!("none of {} rendered pages produced text", rendered.len())).into());
    }

    Ok(texts.join("\n"))
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use serial_test::serial;
    use std::sync::Mutex;

    struct ScriptedOcr {
        responses: Mutex<Vec<std::result::Result<String, OcrError>>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedOcr {
        fn new(responses: Vec<std::result::Result<String, OcrError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl OcrBackend for ScriptedOcr {
        fn name(&self) -> &str {
            "scripted"
        }

        fn recognize(&self, input: OcrInput<'_>, request: &OcrRequest) -> std::result::Result<String, OcrError> {
            assert!(request.deadline.is_some(), "OCR must run under a deadline");
            let label = match input {
                OcrInput::File(path) => format!("file:{}", path.display()),
                OcrInput::Image(_) => "image".to_string(),
            };
            self.calls.lock().unwrap().push(label);
            self.responses.lock().unwrap().remove(0)
        }
    }

    fn config_with(strategies: Vec<PdfStrategy>) -> ExtractionConfig {
        let mut config = ExtractionConfig::default();
        config.pdf.strategies = strategies;
        config
    }

    #[test]
    fn test_direct_ocr_text_wins() {
        let ocr = ScriptedOcr::new(vec![Ok("ИНН 1234567890".to_string())]);
        let config = config_with(vec![PdfStrategy::DirectOcr, PdfStrategy::RenderedPageOcr]);

        let result = extract_pdf_text(Path::new("scan.pdf"), &ocr, &config).unwrap();
        assert_eq!(result.strategy, PdfStrategy::DirectOcr);
        assert_eq!(result.text, "ИНН 1234567890");
        assert_eq!(ocr.calls(), vec!["file:scan.pdf".to_string()]);
    }

    #[test]
    fn test_engine_unavailable_is_reported_distinctly() {
        let ocr = ScriptedOcr::new(vec![Err(OcrError::EngineUnavailable("tesseract was not found".to_string()))]);
        let config = config_with(vec![PdfStrategy::DirectOcr]);

        let err = extract_pdf_text(Path::new("scan.pdf"), &ocr, &config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OcrEngineUnavailable);
        assert!(err.to_string().contains("scan.pdf"));
    }

    #[test]
    fn test_recognition_failure_becomes_no_text_recovered() {
        let ocr = ScriptedOcr::new(vec![Err(OcrError::RecognitionFailed("engine produced no text".to_string()))]);
        let config = config_with(vec![PdfStrategy::DirectOcr]);

        let err = extract_pdf_text(Path::new("scan.pdf"), &ocr, &config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoTextRecovered);
    }

    #[test]
    fn test_deadline_is_recognition_class_failure() {
        let ocr = ScriptedOcr::new(vec![Err(OcrError::DeadlineExceeded(std::time::Duration::from_secs(1)))]);
        let config = config_with(vec![PdfStrategy::DirectOcr, PdfStrategy::RenderedPageOcr]);

        let err = extract_pdf_text(Path::new("scan.pdf"), &ocr, &config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OcrRecognitionFailed);
        assert_eq!(ocr.calls().len(), 1);
    }

    #[test]
    fn test_unreadable_pdf_without_ocr_reports_pdf_error() {
        let ocr = ScriptedOcr::new(vec![]);
        let config = config_with(vec![PdfStrategy::TextLayer]);

        let err = extract_pdf_text(Path::new("/nonexistent/scan.pdf"), &ocr, &config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PdfError);
        assert!(ocr.calls().is_empty());
    }

    #[cfg(unix)]
    fn fake_pdftoppm(dir: &Path, body: &str) -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("pdftoppm");
        std::fs::write(&script, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[cfg(unix)]
    fn rendered_config(pdftoppm: std::path::PathBuf) -> ExtractionConfig {
        let mut config = config_with(vec![PdfStrategy::DirectOcr, PdfStrategy::RenderedPageOcr]);
        config.pdf.pdftoppm_path = Some(pdftoppm);
        config
    }

    #[cfg(unix)]
    fn page_names(calls: &[String]) -> Vec<String> {
        calls
            .iter()
            .filter_map(|call| Path::new(call).file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect()
    }

    // Empty page files fail to decode, so each page reaches OCR as its own file.
    // args: -r DPI -png INPUT PREFIX
    #[cfg(unix)]
    const THREE_PAGES: &str = ": > \"$5-3.png\"\n: > \"$5-1.png\"\n: > \"$5-2.png\"";

    #[cfg(unix)]
    #[test]
    #[serial]
    fn test_rendered_pages_are_joined_in_page_order() {
        let bin = tempfile::tempdir().unwrap();
        let config = rendered_config(fake_pdftoppm(bin.path(), THREE_PAGES));
        let ocr = ScriptedOcr::new(vec![
            Err(OcrError::RecognitionFailed("cannot read PDF input".to_string())),
            Ok("first\n".to_string()),
            Ok("second".to_string()),
            Ok("third".to_string()),
        ]);

        let result = extract_pdf_text(Path::new("scan.pdf"), &ocr, &config).unwrap();

        assert_eq!(result.strategy, PdfStrategy::RenderedPageOcr);
        assert_eq!(result.text, "first\nsecond\nthird");
        let calls = ocr.calls();
        assert_eq!(calls[0], "file:scan.pdf");
        assert_eq!(page_names(&calls[1..]), vec!["page-1.png", "page-2.png", "page-3.png"]);
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn test_unrecognized_page_is_skipped() {
        let bin = tempfile::tempdir().unwrap();
        let mut config = rendered_config(fake_pdftoppm(bin.path(), THREE_PAGES));
        config.pdf.strategies = vec![PdfStrategy::RenderedPageOcr];
        let ocr = ScriptedOcr::new(vec![
            Ok("first".to_string()),
            Err(OcrError::RecognitionFailed("engine produced no text".to_string())),
            Ok("third".to_string()),
        ]);

        let result = extract_pdf_text(Path::new("scan.pdf"), &ocr, &config).unwrap();

        assert_eq!(result.text, "first\nthird");
        assert_eq!(ocr.calls().len(), 3);
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn test_all_pages_unrecognized_releases_rendered_pages() {
        let bin = tempfile::tempdir().unwrap();
        let mut config = rendered_config(fake_pdftoppm(bin.path(), THREE_PAGES));
        config.pdf.strategies = vec![PdfStrategy::RenderedPageOcr];
        let failure = || Err(OcrError::RecognitionFailed("engine produced no text".to_string()));
        let ocr = ScriptedOcr::new(vec![failure(), failure(), failure()]);

        let err = extract_pdf_text(Path::new("scan.pdf"), &ocr, &config).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NoTextRecovered);
        assert!(err.to_string().contains("none of 3 rendered pages"), "{}", err);
        let calls = ocr.calls();
        assert_eq!(calls.len(), 3);
        let page = calls[0].trim_start_matches("file:");
        let page_dir = Path::new(page).parent().unwrap();
        assert!(!page_dir.exists(), "rendered pages must be removed after a failed OCR stage");
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn test_engine_unavailable_mid_document_stops_page_loop() {
        let bin = tempfile::tempdir().unwrap();
        let mut config = rendered_config(fake_pdftoppm(bin.path(), THREE_PAGES));
        config.pdf.strategies = vec![PdfStrategy::RenderedPageOcr];
        let ocr = ScriptedOcr::new(vec![Err(OcrError::EngineUnavailable("tesseract was not found".to_string()))]);

        let err = extract_pdf_text(Path::new("scan.pdf"), &ocr, &config).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::OcrEngineUnavailable);
        assert_eq!(ocr.calls().len(), 1);
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn test_render_timeout_is_deadline_failure() {
        let bin = tempfile::tempdir().unwrap();
        let mut config = rendered_config(fake_pdftoppm(bin.path(), "exec sleep 5"));
        config.pdf.strategies = vec![PdfStrategy::RenderedPageOcr];
        config.ocr.timeout_secs = 1;
        let ocr = ScriptedOcr::new(vec![]);

        let err = extract_pdf_text(Path::new("scan.pdf"), &ocr, &config).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::OcrRecognitionFailed);
        assert!(ocr.calls().is_empty());
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn test_render_failure_with_time_left_is_no_text_recovered() {
        let bin = tempfile::tempdir().unwrap();
        let mut config = rendered_config(fake_pdftoppm(bin.path(), "echo 'Syntax Error' >&2\nexit 1"));
        config.pdf.strategies = vec![PdfStrategy::RenderedPageOcr];
        let ocr = ScriptedOcr::new(vec![]);

        let err = extract_pdf_text(Path::new("scan.pdf"), &ocr, &config).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NoTextRecovered);
        assert!(err.to_string().contains("Syntax Error"), "{}", err);
    }
}
