//! Batch extraction on a bounded worker pool.
//!
//! Files are independent: each worker runs the whole synchronous pipeline for one
//! file at a time, sharing only the read-only [`Dispatcher`].

use crate::core::dispatcher::Dispatcher;
use crate::error::ErrorKind;
use crate::types::{ExtractionResult, FailureReport};
use rayon::prelude::*;
use serde::Serialize;
use std::path::Path;
use tracing::{error, info, warn};

impl Dispatcher {
    /// Extract every file in `paths`, returning one result per path in input order.
    ///
    /// Runs on a dedicated pool of [`ExtractionConfig::worker_count`] threads.
    ///
    /// [`ExtractionConfig::worker_count`]: crate::core::config::ExtractionConfig::worker_count
    pub fn batch_process<P>(&self, paths: &[P]) -> Vec<ExtractionResult>
    where
        P: AsRef<Path> + Sync,
    {
        if paths.is_empty() {
            return Vec::new();
        }

        let workers = self.config().worker_count().min(paths.len());
        let run = || paths.par_iter().map(|path| self.process(path)).collect::<Vec<_>>();

        match rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("docintake-worker-{}", index))
            .build()
        {
            Ok(pool) => {
                info!("Processing {} files on {} workers", paths.len(), workers);
                pool.install(run)
            }
            Err(e) => {
                warn!("Failed to build worker pool, using the global pool: {}", e);
                run()
            }
        }
    }
}

/// Outcome of a batch, split the way operators read it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    /// Files that produced no content.
    pub failed: Vec<FailedFile>,
    /// Files with content but no structured data. Not an error.
    pub without_entities: Vec<String>,
    /// At least one file failed because the OCR engine is missing.
    pub engine_unavailable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedFile {
    pub filename: String,
    pub error: FailureReport,
}

impl BatchSummary {
    pub fn from_results(results: &[ExtractionResult]) -> Self {
        let mut summary = BatchSummary {
            total: results.len(),
            ..Default::default()
        };

        for result in results {
            match &result.error {
                Some(report) => {
                    if report.kind == ErrorKind::OcrEngineUnavailable {
                        summary.engine_unavailable = true;
                    }
                    summary.failed.push(FailedFile {
                        filename: result.filename.clone(),
                        error: report.clone(),
                    });
                }
                None => {
                    summary.succeeded += 1;
                    if result.structured_data.is_empty() {
                        summary.without_entities.push(result.filename.clone());
                    }
                }
            }
        }

        summary
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    /// Log the summary. A missing OCR engine is logged as an error on its own line.
    pub fn log(&self) {
        if self.engine_unavailable {
            error!(
                "OCR engine unavailable: scanned documents cannot be read until it is installed \
                 (set ocr.tesseract_path or DOCINTAKE_TESSERACT_PATH)"
            );
        }

        info!(
            "Processed {} files: {} succeeded, {} failed, {} without structured data",
            self.total,
            self.succeeded,
            self.failed.len(),
            self.without_entities.len()
        );

        for failed in &self.failed {
            warn!("{}: {}", failed.filename, failed.error);
        }
    }
}
