pub mod decoder;
pub mod prefilter;
pub mod signature;
pub mod walk;

pub use decoder::{ImageCrateDecoder, PixelGridDecoder};
pub use prefilter::{Prefilter, SkipReason, prefilter};
pub use signature::{HEADER_LEN, ImageSignature, sniff};
pub use walk::collect_files;
