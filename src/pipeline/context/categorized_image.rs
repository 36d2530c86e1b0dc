use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign};

use serde::Serialize;

use crate::common::Decimal;
use crate::pipeline::context::state::{Finalized, ProcessingState, Scanning};
use crate::pipeline::services::image::analysis::{ClassifierType, ClassifierUsage};

/// Exclusive upper bound for either side of an image.
pub const MAX_DIMENSION: u32 = 100_000;
/// Side length substituted when the decoder reports impossible dimensions.
pub const DEGRADED_DIMENSION: u32 = 100;

/// Skin-tone hits per classifier. Partial counts from row batches are summed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HitCounts {
    pub rgb: u64,
    pub ycbcr: u64,
}

impl HitCounts {
    pub fn new(rgb: u64, ycbcr: u64) -> Self {
        Self { rgb, ycbcr }
    }

    pub fn any(&self) -> bool {
        self.rgb > 0 || self.ycbcr > 0
    }

    pub fn count(&mut self, classifier: ClassifierType) {
        match classifier {
            ClassifierType::Rgb => self.rgb = self.rgb.saturating_add(1),
            ClassifierType::YCbCr => self.ycbcr = self.ycbcr.saturating_add(1),
        }
    }
}

impl Add for HitCounts {
    type Output = HitCounts;

    fn add(self, rhs: HitCounts) -> HitCounts {
        HitCounts {
            rgb: self.rgb.saturating_add(rhs.rgb),
            ycbcr: self.ycbcr.saturating_add(rhs.ycbcr),
        }
    }
}

impl AddAssign for HitCounts {
    fn add_assign(&mut self, rhs: HitCounts) {
        *self = *self + rhs;
    }
}

/// Precise fractions (7 significant digits) and their truncated 0–100 forms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SkinTonePercentages {
    pub precise_rgb: f64,
    pub precise_ycbcr: f64,
    pub precise_average: f64,
    pub readable_rgb: u8,
    pub readable_ycbcr: u8,
    pub readable_average: u8,
}

impl SkinTonePercentages {
    /// Forces the image to the top of any ranking so it gets reviewed by hand.
    pub const MANUAL_REVIEW: SkinTonePercentages = SkinTonePercentages {
        precise_rgb: 1.0,
        precise_ycbcr: 1.0,
        precise_average: 1.0,
        readable_rgb: 100,
        readable_ycbcr: 100,
        readable_average: 100,
    };
}

/// Per-image skin-tone statistics.
///
/// `CategorizedImage<Scanning>` only accepts hits; `finalize` consumes it and
/// yields a `CategorizedImage<Finalized>`, the only form exposing percentages.
pub struct CategorizedImage<S = Finalized> {
    width: u32,
    height: u32,
    pixel_count: u64,
    hits: HitCounts,
    dimensions_valid: bool,
    state: S,
}

impl<S: ProcessingState> CategorizedImage<S> {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> u64 {
        self.pixel_count
    }

    pub fn hits(&self) -> HitCounts {
        self.hits
    }

    pub fn rgb_hits(&self) -> u64 {
        self.hits.rgb
    }

    pub fn ycbcr_hits(&self) -> u64 {
        self.hits.ycbcr
    }

    pub fn state_name(&self) -> &'static str {
        S::state_name()
    }
}

impl CategorizedImage<Scanning> {
    pub fn new(width: u32, height: u32) -> Self {
        let valid = |side: u32| side > 0 && side < MAX_DIMENSION;
        let dimensions_valid = valid(width) && valid(height);
        let (width, height) = if dimensions_valid {
            (width, height)
        } else {
            tracing::debug!(
                "Invalid image dimensions {}x{}, using {}x{} placeholder",
                width,
                height,
                DEGRADED_DIMENSION,
                DEGRADED_DIMENSION
            );
            (DEGRADED_DIMENSION, DEGRADED_DIMENSION)
        };

        Self {
            width,
            height,
            pixel_count: u64::from(width) * u64::from(height),
            hits: HitCounts::default(),
            dimensions_valid,
            state: Scanning,
        }
    }

    /// False once construction had to fall back to the placeholder size.
    pub fn is_processed_correctly(&self) -> bool {
        self.dimensions_valid
    }

    pub fn record_rgb_hit(&mut self) {
        self.hits.rgb = self.hits.rgb.saturating_add(1);
    }

    pub fn record_ycbcr_hit(&mut self) {
        self.hits.ycbcr = self.hits.ycbcr.saturating_add(1);
    }

    /// Merges the counts of a completed partition.
    pub fn record(&mut self, counts: HitCounts) {
        self.hits += counts;
    }

    pub fn finalize(self, usage: ClassifierUsage) -> CategorizedImage<Finalized> {
        let state = compute_percentages(self.pixel_count, self.hits, usage);
        CategorizedImage {
            width: self.width,
            height: self.height,
            pixel_count: self.pixel_count,
            hits: self.hits,
            dimensions_valid: self.dimensions_valid,
            state,
        }
    }
}

impl CategorizedImage<Finalized> {
    /// Recomputes every percentage from the stored counts.
    pub fn recompute(mut self) -> Self {
        self.state = compute_percentages(self.pixel_count, self.hits, self.state.usage);
        self
    }

    pub fn is_processed_correctly(&self) -> bool {
        self.dimensions_valid && self.state.within_bounds
    }

    pub fn has_skin_tone(&self) -> bool {
        self.state.has_skin_tone
    }

    pub fn usage(&self) -> ClassifierUsage {
        self.state.usage
    }

    pub fn percentages(&self) -> &SkinTonePercentages {
        &self.state.percentages
    }

    pub fn precise_rgb(&self) -> f64 {
        self.state.percentages.precise_rgb
    }

    pub fn precise_ycbcr(&self) -> f64 {
        self.state.percentages.precise_ycbcr
    }

    pub fn precise_average(&self) -> f64 {
        self.state.percentages.precise_average
    }

    pub fn readable_rgb(&self) -> u8 {
        self.state.percentages.readable_rgb
    }

    pub fn readable_ycbcr(&self) -> u8 {
        self.state.percentages.readable_ycbcr
    }

    pub fn readable_average(&self) -> u8 {
        self.state.percentages.readable_average
    }

    pub fn summary(&self) -> CategorizedImageSummary {
        CategorizedImageSummary {
            width: self.width,
            height: self.height,
            pixel_count: self.pixel_count,
            hits: self.hits,
            has_skin_tone: self.has_skin_tone(),
            processed_correctly: self.is_processed_correctly(),
            usage: self.state.usage,
            percentages: self.state.percentages,
        }
    }
}

fn compute_percentages(pixel_count: u64, hits: HitCounts, usage: ClassifierUsage) -> Finalized {
    let manual_review = Finalized {
        usage,
        has_skin_tone: false,
        within_bounds: false,
        percentages: SkinTonePercentages::MANUAL_REVIEW,
    };

    if hits.rgb > pixel_count || hits.ycbcr > pixel_count {
        tracing::warn!(
            "Hit counts {:?} exceed {} pixels, flagging image for manual review",
            hits,
            pixel_count
        );
        return manual_review;
    }

    let pixels = u128::from(pixel_count);
    let (Some(rgb), Some(ycbcr)) = (
        Decimal::divide(u128::from(hits.rgb), pixels),
        Decimal::divide(u128::from(hits.ycbcr), pixels),
    ) else {
        // Only reachable with a zero pixel count, which construction rules out.
        return manual_review;
    };

    let average = if usage.rgb && usage.ycbcr {
        Decimal::average(rgb, ycbcr)
    } else if usage.ycbcr {
        Some(ycbcr)
    } else {
        Some(rgb)
    };
    let Some(average) = average else {
        return manual_review;
    };

    Finalized {
        usage,
        has_skin_tone: hits.any(),
        within_bounds: true,
        percentages: SkinTonePercentages {
            precise_rgb: rgb.to_f64(),
            precise_ycbcr: ycbcr.to_f64(),
            precise_average: average.to_f64(),
            readable_rgb: readable(rgb),
            readable_ycbcr: readable(ycbcr),
            readable_average: readable(average),
        },
    }
}

// Floors the exact decimal. A float product would read 0.29 as 28, this reads 29;
// the ten-point tag bucket is the same either way.
fn readable(value: Decimal) -> u8 {
    value.percent_floor().min(100) as u8
}

// Ranking only looks at the average; nothing else breaks ties.
impl PartialEq for CategorizedImage<Finalized> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CategorizedImage<Finalized> {}

impl PartialOrd for CategorizedImage<Finalized> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CategorizedImage<Finalized> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.precise_average().total_cmp(&other.precise_average())
    }
}

impl fmt::Display for CategorizedImage<Finalized> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}%", self.readable_average())?;
        writeln!(f, "{}x{} = {}px", self.width, self.height, self.pixel_count)?;
        writeln!(
            f,
            "{} DetectorValue: {:?}",
            ClassifierType::Rgb.name(),
            self.precise_rgb()
        )?;
        writeln!(
            f,
            "{} DetectorValue: {:?}",
            ClassifierType::YCbCr.name(),
            self.precise_ycbcr()
        )?;
        write!(f, "Processed correctly: {}", self.is_processed_correctly())
    }
}

impl fmt::Debug for CategorizedImage<Finalized> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CategorizedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("hits", &self.hits)
            .field("processed_correctly", &self.is_processed_correctly())
            .field("percentages", &self.state.percentages)
            .finish()
    }
}

impl Clone for CategorizedImage<Finalized> {
    fn clone(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            pixel_count: self.pixel_count,
            hits: self.hits,
            dimensions_valid: self.dimensions_valid,
            state: Finalized {
                usage: self.state.usage,
                has_skin_tone: self.state.has_skin_tone,
                within_bounds: self.state.within_bounds,
                percentages: self.state.percentages,
            },
        }
    }
}

/// Serializable snapshot of a finalized image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorizedImageSummary {
    pub width: u32,
    pub height: u32,
    pub pixel_count: u64,
    pub hits: HitCounts,
    pub has_skin_tone: bool,
    pub processed_correctly: bool,
    pub usage: ClassifierUsage,
    pub percentages: SkinTonePercentages,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finalized(width: u32, height: u32, hits: HitCounts) -> CategorizedImage {
        let mut image = CategorizedImage::new(width, height);
        image.record(hits);
        image.finalize(ClassifierUsage::default())
    }

    #[test]
    fn valid_dimensions_are_kept() {
        let image = CategorizedImage::new(640, 480);
        assert_eq!((image.width(), image.height()), (640, 480));
        assert_eq!(image.pixel_count(), 307_200);
        assert!(image.is_processed_correctly());
        assert_eq!(image.state_name(), "Scanning");

        let widest = CategorizedImage::new(MAX_DIMENSION - 1, 1);
        assert!(widest.is_processed_correctly());
    }

    #[test]
    fn invalid_dimensions_degrade_to_placeholder() {
        for (width, height) in [(0, 10), (10, 0), (MAX_DIMENSION, 10), (10, MAX_DIMENSION)] {
            let image = CategorizedImage::new(width, height);
            assert_eq!((image.width(), image.height()), (100, 100));
            assert_eq!(image.pixel_count(), 10_000);
            assert!(!image.is_processed_correctly());

            let image = image.finalize(ClassifierUsage::default());
            assert!(!image.is_processed_correctly());
            assert_eq!(image.readable_average(), 0);
        }
    }

    #[test]
    fn hits_accumulate_from_increments_and_partitions() {
        let mut image = CategorizedImage::new(10, 10);
        image.record_rgb_hit();
        image.record_ycbcr_hit();
        image.record_ycbcr_hit();
        image.record(HitCounts::new(3, 4));
        assert_eq!(image.hits(), HitCounts::new(4, 6));
    }

    #[test]
    fn finalize_computes_fractions_and_readable_values() {
        let image = finalized(10, 10, HitCounts::new(29, 10));
        assert!(image.has_skin_tone());
        assert!(image.is_processed_correctly());
        assert_eq!(image.precise_rgb(), 0.29);
        assert_eq!(image.precise_ycbcr(), 0.1);
        assert_eq!(image.precise_average(), 0.195);
        assert_eq!(image.readable_rgb(), 29);
        assert_eq!(image.readable_ycbcr(), 10);
        assert_eq!(image.readable_average(), 19);
        assert_eq!(image.state_name(), "Finalized");
    }

    #[test]
    fn readable_values_truncate_rather_than_round() {
        let image = finalized(3, 1, HitCounts::new(2, 2));
        assert_eq!(image.precise_rgb(), 0.6666667);
        assert_eq!(image.readable_rgb(), 66);
        assert_eq!(image.readable_average(), 66);
    }

    #[test]
    fn average_follows_classifier_usage() {
        let mut image = CategorizedImage::new(10, 10);
        image.record(HitCounts::new(20, 60));
        let image = image.finalize(ClassifierUsage::ycbcr_only());
        assert_eq!(image.precise_average(), 0.6);

        let mut image = CategorizedImage::new(10, 10);
        image.record(HitCounts::new(20, 60));
        let image = image.finalize(ClassifierUsage::rgb_only());
        assert_eq!(image.precise_average(), 0.2);
        assert_eq!(image.readable_average(), 20);
    }

    #[test]
    fn over_count_forces_manual_review() {
        let image = finalized(2, 2, HitCounts::new(5, 1));
        assert!(!image.is_processed_correctly());
        assert_eq!(image.percentages(), &SkinTonePercentages::MANUAL_REVIEW);
        assert_eq!(image.readable_rgb(), 100);
        assert_eq!(image.readable_ycbcr(), 100);
        assert_eq!(image.readable_average(), 100);
        assert_eq!(image.precise_average(), 1.0);
    }

    #[test]
    fn no_hits_means_no_skin_tone() {
        let image = finalized(2, 2, HitCounts::default());
        assert!(!image.has_skin_tone());
        assert!(image.is_processed_correctly());
        assert_eq!(image.readable_average(), 0);
        assert_eq!(image.precise_average(), 0.0);
    }

    #[test]
    fn recompute_is_idempotent() {
        let image = finalized(7, 3, HitCounts::new(5, 11));
        let first = image.summary();
        let image = image.recompute();
        assert_eq!(image.summary(), first);
        let image = image.recompute();
        assert_eq!(image.summary(), first);
    }

    #[test]
    fn ordering_uses_average_only() {
        let low = finalized(10, 10, HitCounts::new(10, 10));
        let high = finalized(10, 10, HitCounts::new(40, 40));
        assert_eq!(low.precise_average(), 0.1);
        assert_eq!(high.precise_average(), 0.4);
        assert!(low < high);
        assert_eq!(low.cmp(&high), Ordering::Less);

        let same_average = finalized(20, 5, HitCounts::new(20, 0));
        assert_eq!(same_average.precise_average(), 0.1);
        assert_eq!(low.cmp(&same_average), Ordering::Equal);
        assert_eq!(low, same_average);

        let mut images = vec![high.clone(), low.clone()];
        images.sort();
        assert_eq!(images[0].precise_average(), 0.1);
        assert_eq!(images[1].precise_average(), 0.4);
    }

    #[test]
    fn report_renders_all_fields() {
        let image = finalized(2, 2, HitCounts::new(1, 0));
        assert_eq!(
            image.to_string(),
            "12%\n2x2 = 4px\nRGB DetectorValue: 0.25\nYCbCr DetectorValue: 0.0\nProcessed correctly: true"
        );
    }
}
