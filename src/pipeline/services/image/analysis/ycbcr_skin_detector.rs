//! Skin-tone test on the chrominance planes of YCbCr.
//!
//! Conversion coefficients are the JFIF 1.02 ones. Luma carries no skin
//! signal for this filter and is never computed.
use crate::common::PackedPixel;

const CB_RANGE: std::ops::RangeInclusive<i32> = 77..=127;
const CR_RANGE: std::ops::RangeInclusive<i32> = 133..=173;

/// Returns true when both chrominance values land inside the skin-tone box.
pub fn is_skin_tone(pixel: PackedPixel) -> bool {
    let (cb, cr) = chrominance(pixel);
    CB_RANGE.contains(&cb) && CR_RANGE.contains(&cr)
}

/// Cb and Cr truncated toward zero.
pub fn chrominance(pixel: PackedPixel) -> (i32, i32) {
    let (r, g, b) = pixel.channels();
    let (red, green, blue) = (f64::from(r), f64::from(g), f64::from(b));

    let cb = ((-0.1687 * red) + (-0.3313 * green) + (0.5 * blue) + 128.0) as i32;
    let cr = ((0.5 * red) + (-0.4187 * green) + (-0.0813 * blue) + 128.0) as i32;

    (cb, cr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_grey_is_not_skin() {
        assert!(!is_skin_tone(PackedPixel::from_rgb(128, 128, 128)));
    }

    #[test]
    fn white_and_black_are_not_skin() {
        assert!(!is_skin_tone(PackedPixel(0xFFFFFF)));
        assert!(!is_skin_tone(PackedPixel(0x000000)));
    }

    #[test]
    fn typical_skin_pixel_matches() {
        let pixel = PackedPixel::from_rgb(232, 160, 128);
        assert_eq!(chrominance(pixel), (99, 166));
        assert!(is_skin_tone(pixel));
    }

    #[test]
    fn chrominance_truncates_toward_zero() {
        // Cb = -0.1687*255 + 128 = 84.98..., Cr = 0.5*255 + 128 = 255.5
        assert_eq!(chrominance(PackedPixel::from_rgb(255, 0, 0)), (84, 255));
    }

    #[test]
    fn saturated_red_fails_cr_bound() {
        assert!(!is_skin_tone(PackedPixel::from_rgb(255, 0, 0)));
    }

    #[test]
    fn high_bits_are_ignored() {
        assert_eq!(
            chrominance(PackedPixel(0x7F00_0000 | 0x00E8_A080)),
            chrominance(PackedPixel(0x00E8_A080))
        );
    }
}
