//! Skin-tone test in the sRGB colour space.
//!
//! Thresholds follow the explicit RGB rule used by the File Hound hybrid
//! filter (Choudhury, Rogers, Gillam & Watson, "A Novel Skin Tone Detection
//! Algorithm for Contraband Image Analysis"), also surveyed by Vezhnevets,
//! Sazonov & Andreeva, "A Survey on Pixel-Based Skin Color Detection Techniques".
use crate::common::PackedPixel;

/// Returns true when the pixel falls inside the sRGB skin-tone region.
pub fn is_skin_tone(pixel: PackedPixel) -> bool {
    let (red, green, blue) = widen(pixel);
    let (max, min) = extremes(red, green, blue);

    red > 95
        && green > 40
        && blue > 20
        && (max - min) > 15
        && (red - green).abs() > 15
        && red > green
        && red > blue
}

fn widen(pixel: PackedPixel) -> (i32, i32, i32) {
    let (r, g, b) = pixel.channels();
    (i32::from(r), i32::from(g), i32::from(b))
}

// Strict comparisons: on a tie between the leading channels this falls
// through to blue, not the true max/min. Existing bucket tags depend on it.
fn extremes(red: i32, green: i32, blue: i32) -> (i32, i32) {
    let max = if red > green && red > blue {
        red
    } else if green > red && green > blue {
        green
    } else {
        blue
    };

    let min = if red < green && red < blue {
        red
    } else if green < red && green < blue {
        green
    } else {
        blue
    };

    (max, min)
}
