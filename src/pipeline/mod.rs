pub mod context;
pub mod services;

pub use context::{CategorizedImage, CategorizedImageSummary, HitCounts, ScanMetrics};
pub use services::{ImageScanner, ScanService, TagLedger, TriageRecord, TriageTag};
