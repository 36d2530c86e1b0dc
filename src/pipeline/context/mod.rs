pub mod categorized_image;
pub mod metrics;
pub mod state;

pub use categorized_image::{
    CategorizedImage, CategorizedImageSummary, HitCounts, SkinTonePercentages,
};
pub use metrics::ScanMetrics;
pub use state::{Finalized, ProcessingState, Scanning};
