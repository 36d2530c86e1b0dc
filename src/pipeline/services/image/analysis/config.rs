use serde::{Deserialize, Serialize};

use super::{rgb_skin_detector, ycbcr_skin_detector};
use crate::common::PackedPixel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassifierType {
    Rgb,
    YCbCr,
}

impl ClassifierType {
    pub fn classify(self, pixel: PackedPixel) -> bool {
        match self {
            ClassifierType::Rgb => rgb_skin_detector::is_skin_tone(pixel),
            ClassifierType::YCbCr => ycbcr_skin_detector::is_skin_tone(pixel),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ClassifierType::Rgb => "RGB",
            ClassifierType::YCbCr => "YCbCr",
        }
    }
}

/// Which classifiers contributed to a scan. Both are on unless configured otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierUsage {
    pub rgb: bool,
    pub ycbcr: bool,
}

impl Default for ClassifierUsage {
    fn default() -> Self {
        Self {
            rgb: true,
            ycbcr: true,
        }
    }
}

impl ClassifierUsage {
    pub fn rgb_only() -> Self {
        Self {
            rgb: true,
            ycbcr: false,
        }
    }

    pub fn ycbcr_only() -> Self {
        Self {
            rgb: false,
            ycbcr: true,
        }
    }

    pub fn any(&self) -> bool {
        self.rgb || self.ycbcr
    }

    pub fn enabled(&self) -> Vec<ClassifierType> {
        let mut enabled = Vec::with_capacity(2);
        if self.rgb {
            enabled.push(ClassifierType::Rgb);
        }
        if self.ycbcr {
            enabled.push(ClassifierType::YCbCr);
        }
        enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifier_type_dispatches_to_detector() {
        let skin = PackedPixel::from_rgb(232, 160, 128);
        assert!(ClassifierType::Rgb.classify(skin));
        assert!(ClassifierType::YCbCr.classify(skin));
        assert!(!ClassifierType::Rgb.classify(PackedPixel(0xFFFFFF)));
    }

    #[test]
    fn usage_lists_enabled_classifiers() {
        assert_eq!(
            ClassifierUsage::default().enabled(),
            vec![ClassifierType::Rgb, ClassifierType::YCbCr]
        );
        assert_eq!(ClassifierUsage::ycbcr_only().enabled(), vec![ClassifierType::YCbCr]);
        assert!(!ClassifierUsage {
            rgb: false,
            ycbcr: false
        }
        .any());
    }
}
