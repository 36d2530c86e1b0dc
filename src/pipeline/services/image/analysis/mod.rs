pub mod config;
pub mod rgb_skin_detector;
pub mod ycbcr_skin_detector;

pub use config::{ClassifierType, ClassifierUsage};
