pub mod common;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod intake;
pub mod pipeline;

pub use config::Configuration;
pub use coordinator::{CoordinatorBuilder, FileOutcome, TriageCoordinator, TriageSummary};
pub use error::{AppError, IntakeError, ScanError};
pub use pipeline::{CategorizedImage, ImageScanner, TriageRecord, TriageTag};
