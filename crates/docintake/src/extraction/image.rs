//! Scanned image extraction: preprocess, then OCR.

use crate::Result;
use crate::core::config::ExtractionConfig;
use crate::image::prepare_for_ocr;
use crate::ocr::{Deadline, OcrBackend, OcrRequest};
use std::path::Path;

/// Recognize the text of the image at `path`.
///
/// Preprocessing failures fall back to the original image. The OCR call runs under
/// the configured per-file deadline, which starts once preprocessing is done.
pub fn extract_image_text(path: &Path, ocr: &dyn OcrBackend, config: &ExtractionConfig) -> Result<String> {
    let prepared = prepare_for_ocr(path, &config.image);
    let request = OcrRequest::from_config(&config.ocr).with_deadline(Deadline::after(config.ocr.timeout()));

    tracing::debug!(
        "Running {} on {} ({})",
        ocr.name(),
        path.display(),
        if prepared.is_binarized() { "binarized" } else { "original" }
    );

    ocr.recognize(prepared.as_ocr_input(), &request).map_err(|e| {
        if e.is_engine_unavailable() {
            tracing::error!("OCR engine unavailable while processing {}: {}", path.display(), e);
        }
        e.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::ocr::{OcrError, OcrInput};
    use image::{Rgb, RgbImage};

    struct FixedOcr(std::result::Result<&'static str, OcrError>);

    impl OcrBackend for FixedOcr {
        fn name(&self) -> &str {
            "fixed"
        }

        fn recognize(&self, input: OcrInput<'_>, request: &OcrRequest) -> std::result::Result<String, OcrError> {
            assert!(request.deadline.is_some());
            assert!(matches!(input, OcrInput::Image(_)));
            self.0.clone().map(str::to_string)
        }
    }

    fn scan(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("scan.png");
        RgbImage::from_pixel(32, 32, Rgb([250, 250, 250])).save(&path).unwrap();
        path
    }

    #[test]
    fn test_recognized_text_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let path = scan(dir.path());

        let text = extract_image_text(&path, &FixedOcr(Ok("СНИЛС 123-456-789 01")), &ExtractionConfig::default()).unwrap();
        assert_eq!(text, "СНИЛС 123-456-789 01");
    }

    #[test]
    fn test_engine_unavailable_propagates_distinctly() {
        let dir = tempfile::tempdir().unwrap();
        let path = scan(dir.path());

        let ocr = FixedOcr(Err(OcrError::EngineUnavailable("tesseract was not found".to_string())));
        let err = extract_image_text(&path, &ocr, &ExtractionConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OcrEngineUnavailable);
    }

    #[test]
    fn test_recognition_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = scan(dir.path());

        let ocr = FixedOcr(Err(OcrError::RecognitionFailed("engine produced no text".to_string())));
        let err = extract_image_text(&path, &ocr, &ExtractionConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OcrRecognitionFailed);
    }

    struct RemainingOcr(std::sync::Mutex<Option<std::time::Duration>>);

    impl OcrBackend for RemainingOcr {
        fn name(&self) -> &str {
            "remaining"
        }

        fn recognize(&self, _input: OcrInput<'_>, request: &OcrRequest) -> std::result::Result<String, OcrError> {
            *self.0.lock().unwrap() = request.remaining()?;
            Ok("text".to_string())
        }
    }

    #[test]
    fn test_preprocessing_time_is_not_charged_to_ocr_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("large.png");
        RgbImage::from_fn(1600, 1600, |x, y| Rgb([((x ^ y) & 0xff) as u8; 3]))
            .save(&path)
            .unwrap();
        let mut config = ExtractionConfig::default();
        config.ocr.timeout_secs = 1;
        config.image.max_image_dimension = 2000;

        let ocr = RemainingOcr(std::sync::Mutex::new(None));
        extract_image_text(&path, &ocr, &config).unwrap();

        let remaining = ocr.0.lock().unwrap().unwrap();
        assert!(
            remaining > std::time::Duration::from_millis(950),
            "OCR deadline started before preprocessing: {:?} left",
            remaining
        );
    }
}
