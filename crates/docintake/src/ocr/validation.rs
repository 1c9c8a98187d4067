use super::error::OcrError;
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Tesseract traineddata codes accepted in a `languages` hint.
pub static TESSERACT_SUPPORTED_LANGUAGE_CODES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "afr", "ara", "aze", "aze_cyrl", "bel", "ben", "bos", "bul", "cat", "ces", "chi_sim", "chi_tra", "dan",
        "deu", "ell", "eng", "est", "eus", "fas", "fin", "fra", "gle", "heb", "hin", "hrv", "hun", "hye", "ind",
        "isl", "ita", "jpn", "kat", "kaz", "kir", "kor", "lav", "lit", "mkd", "mon", "nld", "nor", "osd", "pol",
        "por", "ron", "rus", "slk", "slv", "spa", "sqi", "srp", "srp_latn", "swe", "tat", "tgk", "tha", "tur",
        "ukr", "uzb", "uzb_cyrl", "vie",
    ]
    .into_iter()
    .collect()
});

/// Validate a `+`-joined language hint such as `rus+eng`.
pub fn validate_language_code(lang_code: &str) -> Result<(), OcrError> {
    if lang_code.trim().is_empty() {
        return Err(OcrError::InvalidLanguageCode("language hint is empty".to_string()));
    }

    for code in lang_code.split('+') {
        if !TESSERACT_SUPPORTED_LANGUAGE_CODES.contains(code) {
            return Err(OcrError::InvalidLanguageCode(format!(
                "Language code '{}' is not supported by Tesseract",
                code
            )));
        }
    }
    Ok(())
}
