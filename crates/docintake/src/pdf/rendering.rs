//! Page rendering through poppler's `pdftoppm`.
//!
//! Rendered pages live in a temporary directory owned by [`RenderedPages`]; dropping
//! it removes every page image, whether OCR succeeded, failed or panicked.

use super::error::{PdfError, Result};
use crate::core::config::PdfConfig;
use crate::core::process::{self, PDFTOPPM, WaitOutcome};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;

/// Page images of one document, removed on drop.
#[derive(Debug)]
pub struct RenderedPages {
    dir: TempDir,
    pages: Vec<PathBuf>,
}

impl RenderedPages {
    /// Page image paths in page order.
    pub fn pages(&self) -> &[PathBuf] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

/// Renders PDF pages to PNG images.
#[derive(Debug, Clone)]
pub struct PageRenderer {
    explicit_path: Option<PathBuf>,
    dpi: u32,
}

impl PageRenderer {
    pub fn from_config(config: &PdfConfig) -> Self {
        Self {
            explicit_path: config.pdftoppm_path.clone(),
            dpi: config.render_dpi,
        }
    }

    fn binary(&self) -> Result<PathBuf> {
        let explicit = self.explicit_path.as_deref();
        process::locate_binary(&PDFTOPPM, explicit)
            .ok_or_else(|| PdfError::RendererUnavailable(process::not_found_message(&PDFTOPPM, explicit)))
    }

    /// Render every page of `pdf`, giving up after `timeout`.
    pub fn render(&self, pdf: &Path, timeout: Option<Duration>) -> Result<RenderedPages> {
        let binary = self.binary()?;
        let dir = tempfile::Builder::new()
            .prefix("docintake-pages-")
            .tempdir()
            .map_err(|e| PdfError::IOError(format!("Failed to create page directory: {}", e)))?;
        let stderr_path = dir.path().join("pdftoppm.log");
        let stderr_file = File::create(&stderr_path).map_err(|e| PdfError::IOError(e.to_string()))?;

        let mut command = Command::new(&binary);
        command
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-png")
            .arg(pdf)
            .arg(dir.path().join("page"))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(stderr_file));

        tracing::debug!("Rendering {} at {} dpi", pdf.display(), self.dpi);

        let outcome = process::run_with_timeout(&mut command, timeout).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                PdfError::RendererUnavailable(process::unavailable_message(&PDFTOPPM, &e.to_string()))
            }
            _ => PdfError::IOError(format!("Failed to run pdftoppm: {}", e)),
        })?;

        match outcome {
            WaitOutcome::TimedOut => {
                return Err(PdfError::RenderingFailed(format!(
                    "pdftoppm did not finish within {:?}",
                    timeout.unwrap_or_default()
                )));
            }
            WaitOutcome::Exited(status) if !status.success() => {
                let stderr = fs::read_to_string(&stderr_path).unwrap_or_default();
                return Err(PdfError::RenderingFailed(format!(
                    "pdftoppm exited with code {}: {}",
                    status.code().unwrap_or(-1),
                    stderr.trim()
                )));
            }
            WaitOutcome::Exited(_) => {}
        }

        let pages = collect_pages(dir.path())?;
        if pages.is_empty() {
            return Err(PdfError::RenderingFailed("pdftoppm produced no pages".to_string()));
        }

        Ok(RenderedPages { dir, pages })
    }
}

/// PNG files in `dir`, sorted by page number.
fn collect_pages(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| PdfError::IOError(e.to_string()))?;

    let mut pages: Vec<(u32, PathBuf)> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("png"))
        .filter_map(|path| page_number(&path).map(|n| (n, path)))
        .collect();
    pages.sort_by_key(|(number, _)| *number);

    Ok(pages.into_iter().map(|(_, path)| path).collect())
}

/// `page-07.png` -> 7
fn page_number(path: &Path) -> Option<u32> {
    path.file_stem()?.to_str()?.rsplit('-').next()?.parse().ok()
}
