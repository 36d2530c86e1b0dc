pub mod image;
pub mod scan_service;
pub mod tagging;

pub use self::image::{ClassifierType, ClassifierUsage, ImageScanner};
pub use scan_service::{BoxScanService, ScanRequest, ScanResponse, ScanService, into_scan_error};
pub use tagging::{TagLedger, TriageRecord, TriageTag};
