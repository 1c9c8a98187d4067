//! Configuration loading and management.
//!
//! [`ExtractionConfig`] can be built programmatically, loaded from TOML, YAML or JSON,
//! or discovered as `docintake.toml` in the working directory or one of its parents.
//! Every field has a default, so an empty file is a valid configuration.

use crate::entities::PatternDefinition;
use crate::{DocintakeError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name looked up by [`ExtractionConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "docintake.toml";

/// Main extraction configuration.
///
/// # Example
///
/// ```rust
/// use docintake::core::config::ExtractionConfig;
///
/// let config = ExtractionConfig::default();
/// assert_eq!(config.ocr.languages, "rus+eng");
///
/// // let config = ExtractionConfig::from_toml_file("docintake.toml")?;
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    #[serde(default)]
    pub ocr: OcrConfig,

    #[serde(default)]
    pub pdf: PdfConfig,

    #[serde(default)]
    pub image: ImageConfig,

    #[serde(default)]
    pub spreadsheet: SpreadsheetConfig,

    /// Entity patterns replacing the built-in registry (None = built-ins)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<PatternDefinition>>,

    /// Worker threads for batch runs (None = number of CPUs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_workers: Option<usize>,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    /// `+`-joined Tesseract language codes: the document language, then a fallback
    #[serde(default = "default_languages")]
    pub languages: String,

    /// Deadline for the whole OCR stage of one file, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Explicit `tesseract` executable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tesseract_path: Option<PathBuf>,

    /// Page segmentation mode (0-13)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psm: Option<u8>,
}

impl OcrConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// One step of the PDF fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PdfStrategy {
    /// Native text layer, page by page.
    TextLayer,
    /// Hand the whole PDF to the OCR engine.
    DirectOcr,
    /// Render each page to an image, preprocess, then OCR it.
    RenderedPageOcr,
}

impl PdfStrategy {
    pub const ALL: [PdfStrategy; 3] = [Self::TextLayer, Self::DirectOcr, Self::RenderedPageOcr];
}

/// PDF extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfConfig {
    /// Strategies tried in order; the first to produce text wins
    #[serde(default = "default_strategies")]
    pub strategies: Vec<PdfStrategy>,

    /// Resolution pages are rendered at for OCR
    #[serde(default = "default_render_dpi")]
    pub render_dpi: u32,

    /// Explicit `pdftoppm` executable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdftoppm_path: Option<PathBuf>,
}

/// Image preprocessing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Binarize images before OCR
    #[serde(default = "default_true")]
    pub preprocess: bool,

    /// Neighbourhood size of the adaptive threshold (odd, >= 3)
    #[serde(default = "default_block_size")]
    pub threshold_block_size: u32,

    /// Constant subtracted from the local mean
    #[serde(default = "default_threshold_offset")]
    pub threshold_offset: f32,

    /// Larger images are downscaled to this width or height
    #[serde(default = "default_max_dimension")]
    pub max_image_dimension: u32,
}

/// Spreadsheet extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpreadsheetConfig {
    /// Sheet whose first row becomes the result's structured data
    #[serde(default = "default_profile_sheet")]
    pub profile_sheet: String,
}

fn default_true() -> bool {
    true
}
fn default_languages() -> String {
    "rus+eng".to_string()
}
fn default_timeout_secs() -> u64 {
    120
}
fn default_strategies() -> Vec<PdfStrategy> {
    PdfStrategy::ALL.to_vec()
}
fn default_render_dpi() -> u32 {
    300
}
fn default_block_size() -> u32 {
    11
}
fn default_threshold_offset() -> f32 {
    2.0
}
fn default_max_dimension() -> u32 {
    10_000
}
fn default_profile_sheet() -> String {
    "Анкета Клиента".to_string()
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            languages: default_languages(),
            timeout_secs: default_timeout_secs(),
            tesseract_path: None,
            psm: None,
        }
    }
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            strategies: default_strategies(),
            render_dpi: default_render_dpi(),
            pdftoppm_path: None,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            preprocess: true,
            threshold_block_size: default_block_size(),
            threshold_offset: default_threshold_offset(),
            max_image_dimension: default_max_dimension(),
        }
    }
}

impl Default for SpreadsheetConfig {
    fn default() -> Self {
        Self {
            profile_sheet: default_profile_sheet(),
        }
    }
}

impl ExtractionConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `DocintakeError::Validation` if the file cannot be read or is invalid TOML.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        toml::from_str(&content)
            .map_err(|e| DocintakeError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        serde_yaml_ng::from_str(&content)
            .map_err(|e| DocintakeError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        serde_json::from_str(&content)
            .map_err(|e| DocintakeError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration, choosing the format from the file extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "toml" => Self::from_toml_file(path),
            "yaml" | "yml" => Self::from_yaml_file(path),
            "json" => Self::from_json_file(path),
            other => Err(DocintakeError::validation(format!(
                "Unsupported config file format '{}' for {} (expected .toml, .yaml, .yml or .json)",
                other,
                path.display()
            ))),
        }
    }

    /// Discover `docintake.toml` in the current directory or its parents.
    ///
    /// # Returns
    ///
    /// - `Some(config)` if found
    /// - `None` if no config file found
    pub fn discover() -> Result<Option<Self>> {
        let mut current = std::env::current_dir().map_err(DocintakeError::Io)?;

        loop {
            let candidate = current.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                tracing::debug!("Using configuration from {}", candidate.display());
                return Ok(Some(Self::from_toml_file(candidate)?));
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        Ok(None)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        crate::ocr::validation::validate_language_code(&self.ocr.languages)?;

        if self.ocr.timeout_secs == 0 {
            return Err(DocintakeError::validation("ocr.timeout_secs must be greater than zero"));
        }

        if let Some(psm) = self.ocr.psm
            && psm > 13
        {
            return Err(DocintakeError::validation(format!(
                "ocr.psm must be between 0 and 13, got {}",
                psm
            )));
        }

        if self.pdf.strategies.is_empty() {
            return Err(DocintakeError::validation("pdf.strategies must name at least one strategy"));
        }

        if self.pdf.render_dpi == 0 {
            return Err(DocintakeError::validation("pdf.render_dpi must be greater than zero"));
        }

        let block = self.image.threshold_block_size;
        if block < 3 || block % 2 == 0 {
            return Err(DocintakeError::validation(format!(
                "image.threshold_block_size must be an odd number >= 3, got {}",
                block
            )));
        }

        if self.image.max_image_dimension == 0 {
            return Err(DocintakeError::validation("image.max_image_dimension must be greater than zero"));
        }

        if self.max_workers == Some(0) {
            return Err(DocintakeError::validation("max_workers must be greater than zero"));
        }

        if let Some(definitions) = &self.entities {
            crate::entities::EntityRegistry::from_definitions(definitions)?;
        }

        Ok(())
    }

    /// Worker count for batch runs.
    pub fn worker_count(&self) -> usize {
        self.max_workers.unwrap_or_else(num_cpus::get).max(1)
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| DocintakeError::validation(format!("Failed to read config file {}: {}", path.display(), e)))
}
