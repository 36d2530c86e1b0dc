use std::time::Duration;

use serde::Serialize;

/// Metrics collected while scanning one image
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanMetrics {
    scan_duration: Option<Duration>,
    batches: usize,
}

impl ScanMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_scan_duration(&mut self, duration: Duration) {
        self.scan_duration = Some(duration);
    }

    pub fn record_batches(&mut self, batches: usize) {
        self.batches = batches;
    }

    pub fn scan_duration(&self) -> Option<Duration> {
        self.scan_duration
    }

    pub fn batches(&self) -> usize {
        self.batches
    }
}
