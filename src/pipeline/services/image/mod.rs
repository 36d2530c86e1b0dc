pub mod analysis;
pub mod image_scanner;

pub use analysis::{ClassifierType, ClassifierUsage};
pub use image_scanner::ImageScanner;
