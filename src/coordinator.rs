use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    config::Configuration,
    error::{AppError, ScanError},
    intake::{ImageCrateDecoder, PixelGridDecoder, Prefilter, SkipReason, prefilter},
    pipeline::services::{
        BoxScanService, ClassifierUsage, ImageScanner, ScanRequest, ScanService, TagLedger,
        TriageRecord, into_scan_error,
    },
};

/// What happened to a single candidate file.
#[derive(Debug)]
pub enum FileOutcome {
    Tagged(TriageRecord),
    Skipped(SkipReason),
    /// The file looked like an image but produced no result.
    Absent(String),
    Cancelled,
}

#[derive(Debug, Serialize)]
pub struct TriageSummary {
    pub job_id: Uuid,
    /// Highest average first.
    pub records: Vec<TriageRecord>,
    pub skipped: usize,
    pub absent: usize,
    pub unprocessed: usize,
    pub cancelled: bool,
}

pub struct TriageCoordinator {
    configuration: Configuration,
    decoder: Arc<dyn PixelGridDecoder>,
    scan_service: BoxScanService,
    ledger: TagLedger,
    cancel_token: CancellationToken,
}

impl TriageCoordinator {
    pub fn builder(configuration: Configuration) -> CoordinatorBuilder {
        CoordinatorBuilder::new(configuration)
    }

    pub fn job_id(&self) -> Uuid {
        self.ledger.job_id()
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn tags_posted(&self) -> u64 {
        self.ledger.posted()
    }

    pub async fn process_file(&self, path: &Path) -> FileOutcome {
        if self.cancel_token.is_cancelled() {
            return FileOutcome::Cancelled;
        }

        let signature = match prefilter(path, &self.configuration.intake).await {
            Ok(Prefilter::Accepted(signature)) => signature,
            Ok(Prefilter::Rejected(reason)) => {
                tracing::debug!("Skipping {}: {:?}", path.display(), reason);
                return FileOutcome::Skipped(reason);
            }
            Err(e) => {
                tracing::warn!("Could not inspect {}: {}", path.display(), e);
                return FileOutcome::Absent(e.to_string());
            }
        };

        let grid = match self.decoder.decode(path).await {
            Ok(grid) => grid,
            Err(e) => {
                tracing::warn!(
                    "{} decoder could not read {}: {}",
                    self.decoder.name(),
                    path.display(),
                    e
                );
                return FileOutcome::Absent(e.to_string());
            }
        };

        let request = ScanRequest::new(grid);
        let response = match self.scan_service.clone().oneshot(request).await {
            Ok(response) => response,
            Err(e) => {
                return match into_scan_error(e) {
                    ScanError::Cancelled => FileOutcome::Cancelled,
                    ScanError::WorkerFailed(reason) => {
                        tracing::error!("Scan worker failed on {}: {}", path.display(), reason);
                        FileOutcome::Absent(reason)
                    }
                    e => {
                        tracing::warn!("No scan result for {}: {}", path.display(), e);
                        FileOutcome::Absent(e.to_string())
                    }
                };
            }
        };

        tracing::debug!(
            "Scanned {} ({}) in {:?}",
            path.display(),
            signature.name(),
            response.metrics.scan_duration()
        );

        let record =
            TriageRecord::new(response.id, self.job_id(), path, signature, response.image);
        self.ledger.post(&record);
        FileOutcome::Tagged(record)
    }

    /// Processes every path, at most `max_concurrent_scans` at a time.
    pub async fn run(&self, paths: Vec<PathBuf>) -> TriageSummary {
        tracing::info!(
            "Starting triage job {} over {} files",
            self.job_id(),
            paths.len()
        );

        let outcomes: Vec<FileOutcome> = stream::iter(paths)
            .map(|path| async move { self.process_file(&path).await })
            .buffer_unordered(self.configuration.max_concurrent_scans)
            .collect()
            .await;

        let mut summary = TriageSummary {
            job_id: self.job_id(),
            records: Vec::new(),
            skipped: 0,
            absent: 0,
            unprocessed: 0,
            cancelled: self.cancel_token.is_cancelled(),
        };
        for outcome in outcomes {
            match outcome {
                FileOutcome::Tagged(record) => summary.records.push(record),
                FileOutcome::Skipped(_) => summary.skipped += 1,
                FileOutcome::Absent(_) => summary.absent += 1,
                FileOutcome::Cancelled => summary.unprocessed += 1,
            }
        }
        summary.records.sort_by(|a, b| b.image.cmp(&a.image));

        tracing::info!(
            "Triage job {} tagged {} files ({} skipped, {} absent, {} unprocessed)",
            summary.job_id,
            summary.records.len(),
            summary.skipped,
            summary.absent,
            summary.unprocessed
        );
        summary
    }

    pub fn stop(&self) {
        self.cancel_token.cancel();
    }

    /// Reports the posted tag count, unless the job was cancelled.
    pub fn finish(&self) -> Option<String> {
        if self.cancel_token.is_cancelled() {
            tracing::info!("Triage job {} was cancelled", self.job_id());
            return None;
        }

        let report = self.ledger.report();
        tracing::info!("{}", report);
        Some(report)
    }
}

pub struct CoordinatorBuilder {
    configuration: Configuration,
    decoder: Option<Arc<dyn PixelGridDecoder>>,
    cancel_token: Option<CancellationToken>,
}

impl CoordinatorBuilder {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            decoder: None,
            cancel_token: None,
        }
    }

    // Selects the classifiers, this will override the default configuration.
    pub fn classifiers(mut self, classifiers: ClassifierUsage) -> Self {
        self.configuration.scan.classifiers = classifiers;
        self
    }

    // Toggles the row-parallel scan, this will override the default configuration.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.configuration.scan.parallel = parallel;
        self
    }

    pub fn rows_per_batch(mut self, rows_per_batch: u32) -> Self {
        self.configuration.scan.rows_per_batch = rows_per_batch;
        self
    }

    pub fn max_concurrent_scans(mut self, max_concurrent_scans: usize) -> Self {
        self.configuration.max_concurrent_scans = max_concurrent_scans;
        self
    }

    pub fn scan_timeout(mut self, timeout: Duration) -> Self {
        self.configuration.scan.timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn skip_known_files(mut self, skip_known_files: bool) -> Self {
        self.configuration.intake.skip_known_files = skip_known_files;
        self
    }

    pub fn known_files(mut self, known_files: Vec<PathBuf>) -> Self {
        self.configuration.intake.known_files = known_files;
        self
    }

    pub fn decoder(mut self, decoder: Arc<dyn PixelGridDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    pub fn cancel_token(mut self, cancel_token: CancellationToken) -> Self {
        self.cancel_token = Some(cancel_token);
        self
    }

    pub fn build(self) -> Result<TriageCoordinator, AppError> {
        self.configuration.validate()?;

        let cancel_token = self.cancel_token.unwrap_or_default();
        let decoder = self
            .decoder
            .unwrap_or_else(|| Arc::new(ImageCrateDecoder));

        let mut scan_service = ScanService::builder(ImageScanner::new(&self.configuration.scan))
            .cancel_token(cancel_token.clone());
        if let Some(timeout_ms) = self.configuration.scan.timeout_ms {
            scan_service = scan_service.timeout(Duration::from_millis(timeout_ms));
        }

        Ok(TriageCoordinator {
            scan_service: scan_service.build(),
            ledger: TagLedger::new(Uuid::new_v4()),
            configuration: self.configuration,
            decoder,
            cancel_token,
        })
    }
}
