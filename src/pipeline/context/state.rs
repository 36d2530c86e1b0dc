use crate::pipeline::context::categorized_image::SkinTonePercentages;
use crate::pipeline::services::image::analysis::ClassifierUsage;

// Markers to track whether an image is still collecting hits or has been finalized
pub struct Scanning;

pub struct Finalized {
    pub(super) usage: ClassifierUsage,
    pub(super) has_skin_tone: bool,
    pub(super) within_bounds: bool,
    pub(super) percentages: SkinTonePercentages,
}

pub trait ProcessingState: 'static {
    fn state_name() -> &'static str;
}

impl ProcessingState for Scanning {
    fn state_name() -> &'static str {
        "Scanning"
    }
}

impl ProcessingState for Finalized {
    fn state_name() -> &'static str {
        "Finalized"
    }
}
