use std::sync::Arc;

use image::{Rgb, RgbImage, Rgba, RgbaImage};

use crate::error::IntakeError;

/// A pixel packed as `0x??RRGGBB`. Bits above the red channel are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackedPixel(pub u32);

impl PackedPixel {
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self(((red as u32) << 16) | ((green as u32) << 8) | blue as u32)
    }

    pub const fn red(self) -> u8 {
        ((self.0 & 0x00ff_0000) >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        ((self.0 & 0x0000_ff00) >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        (self.0 & 0x0000_00ff) as u8
    }

    pub const fn channels(self) -> (u8, u8, u8) {
        (self.red(), self.green(), self.blue())
    }
}

impl From<u32> for PackedPixel {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Rgb<u8>> for PackedPixel {
    fn from(pixel: Rgb<u8>) -> Self {
        let [r, g, b] = pixel.0;
        Self::from_rgb(r, g, b)
    }
}

impl From<Rgba<u8>> for PackedPixel {
    fn from(pixel: Rgba<u8>) -> Self {
        let [r, g, b, a] = pixel.0;
        Self(((a as u32) << 24) | Self::from_rgb(r, g, b).0)
    }
}

/// A decoded image the scanner can walk. Lookups outside the grid return `None`.
pub trait PixelGrid {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn pixel(&self, x: u32, y: u32) -> Option<PackedPixel>;
}

pub type SharedPixelGrid = Arc<dyn PixelGrid + Send + Sync>;

impl PixelGrid for RgbImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn pixel(&self, x: u32, y: u32) -> Option<PackedPixel> {
        self.get_pixel_checked(x, y).map(|p| PackedPixel::from(*p))
    }
}

impl PixelGrid for RgbaImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn pixel(&self, x: u32, y: u32) -> Option<PackedPixel> {
        self.get_pixel_checked(x, y).map(|p| PackedPixel::from(*p))
    }
}

/// Row-major grid of already packed pixels.
#[derive(Debug, Clone)]
pub struct PackedPixelGrid {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl PackedPixelGrid {
    pub fn new(width: u32, height: u32, pixels: Vec<u32>) -> Result<Self, IntakeError> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(IntakeError::GridSizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn filled(width: u32, height: u32, pixel: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![pixel; width as usize * height as usize],
        }
    }
}

impl PixelGrid for PackedPixelGrid {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn pixel(&self, x: u32, y: u32) -> Option<PackedPixel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = y as usize * self.width as usize + x as usize;
        self.pixels.get(index).copied().map(PackedPixel)
    }
}
