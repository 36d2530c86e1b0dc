use std::ops::Range;
use std::time::Instant;

use rayon::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::analysis::{ClassifierType, ClassifierUsage};
use crate::common::{PackedPixel, PixelGrid};
use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::pipeline::context::{CategorizedImage, HitCounts, ScanMetrics};

/// Walks a decoded pixel grid and turns per-pixel verdicts into a finalized
/// `CategorizedImage`.
#[derive(Debug, Clone)]
pub struct ImageScanner {
    usage: ClassifierUsage,
    classifiers: Vec<ClassifierType>,
    parallel: bool,
    rows_per_batch: u32,
}

impl Default for ImageScanner {
    fn default() -> Self {
        Self::new(&ScanConfig::default())
    }
}

impl ImageScanner {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            usage: config.classifiers,
            classifiers: config.classifiers.enabled(),
            parallel: config.parallel,
            rows_per_batch: config.rows_per_batch.max(1),
        }
    }

    pub fn with_usage(mut self, usage: ClassifierUsage) -> Self {
        self.usage = usage;
        self.classifiers = usage.enabled();
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_rows_per_batch(mut self, rows_per_batch: u32) -> Self {
        self.rows_per_batch = rows_per_batch.max(1);
        self
    }

    pub fn usage(&self) -> ClassifierUsage {
        self.usage
    }

    /// Scans the grid, or returns `None` if the scan could not complete.
    /// The failure is logged, never propagated.
    pub fn scan<G>(&self, grid: &G, cancel: &CancellationToken) -> Option<CategorizedImage>
    where
        G: PixelGrid + Sync + ?Sized,
    {
        match self.try_scan(grid, cancel) {
            Ok(image) => Some(image),
            Err(e) => {
                warn!("Error scanning image for skin tone analysis: {}", e);
                None
            }
        }
    }

    pub fn try_scan<G>(
        &self,
        grid: &G,
        cancel: &CancellationToken,
    ) -> Result<CategorizedImage, ScanError>
    where
        G: PixelGrid + Sync + ?Sized,
    {
        self.try_scan_with_metrics(grid, cancel)
            .map(|(image, _)| image)
    }

    pub fn try_scan_with_metrics<G>(
        &self,
        grid: &G,
        cancel: &CancellationToken,
    ) -> Result<(CategorizedImage, ScanMetrics), ScanError>
    where
        G: PixelGrid + Sync + ?Sized,
    {
        let start = Instant::now();
        let (width, height) = (grid.width(), grid.height());
        let mut image = CategorizedImage::new(width, height);

        let batches = row_batches(height, self.rows_per_batch);
        let batch_count = batches.len();

        let counts = if self.parallel {
            batches
                .into_par_iter()
                .map(|rows| self.scan_rows(grid, width, rows, cancel))
                .try_reduce(HitCounts::default, |a, b| Ok(a + b))?
        } else {
            let mut total = HitCounts::default();
            for rows in batches {
                total += self.scan_rows(grid, width, rows, cancel)?;
            }
            total
        };

        // Every partition has been merged at this point.
        image.record(counts);
        let image = image.finalize(self.usage);

        let mut metrics = ScanMetrics::new();
        metrics.record_batches(batch_count);
        metrics.record_scan_duration(start.elapsed());

        debug!(
            "Scanned {}x{} grid in {} batches: {} RGB hits, {} YCbCr hits",
            width,
            height,
            batch_count,
            image.rgb_hits(),
            image.ycbcr_hits()
        );

        Ok((image, metrics))
    }

    /// Hit contribution of a single pixel under the configured classifiers.
    pub fn classify(&self, pixel: PackedPixel) -> HitCounts {
        let mut counts = HitCounts::default();
        for classifier in &self.classifiers {
            if classifier.classify(pixel) {
                counts.count(*classifier);
            }
        }
        counts
    }

    fn scan_rows<G>(
        &self,
        grid: &G,
        width: u32,
        rows: Range<u32>,
        cancel: &CancellationToken,
    ) -> Result<HitCounts, ScanError>
    where
        G: PixelGrid + Sync + ?Sized,
    {
        if cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }

        let mut counts = HitCounts::default();
        for y in rows {
            for x in 0..width {
                let pixel = grid
                    .pixel(x, y)
                    .ok_or(ScanError::PixelUnavailable { x, y })?;
                counts += self.classify(pixel);
            }
        }
        Ok(counts)
    }
}

fn row_batches(height: u32, rows_per_batch: u32) -> Vec<Range<u32>> {
    let step = rows_per_batch.max(1);
    (0..height)
        .step_by(step as usize)
        .map(|start| start..start.saturating_add(step).min(height))
        .collect()
}
