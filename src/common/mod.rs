pub mod pixel;
pub mod precision;

pub use pixel::{PackedPixel, PackedPixelGrid, PixelGrid, SharedPixelGrid};
pub use precision::Decimal;
