use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::intake::ImageSignature;
use crate::pipeline::context::{CategorizedImage, CategorizedImageSummary};

pub const TAG_PREFIX: &str = "SkinTone";

/// Groups images into ten-point buckets of their readable average,
/// rendered as `SkinTone|040s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TriageTag {
    bucket: u8,
}

impl TriageTag {
    pub fn from_readable(readable_average: u8) -> Self {
        Self {
            bucket: readable_average.min(100) / 10 * 10,
        }
    }

    pub fn for_image(image: &CategorizedImage) -> Self {
        Self::from_readable(image.readable_average())
    }

    pub fn bucket(&self) -> u8 {
        self.bucket
    }
}

impl fmt::Display for TriageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{:03}s", TAG_PREFIX, self.bucket)
    }
}

impl Serialize for TriageTag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One tagged file: what was found, where, and the human-readable report.
#[derive(Debug, Clone, Serialize)]
pub struct TriageRecord {
    pub id: Uuid,
    pub job_id: Uuid,
    pub path: PathBuf,
    pub signature: ImageSignature,
    pub tag: TriageTag,
    pub comment: String,
    pub summary: CategorizedImageSummary,
    pub scanned_at: DateTime<Utc>,
    #[serde(skip)]
    pub image: CategorizedImage,
}

impl TriageRecord {
    pub fn new(
        id: Uuid,
        job_id: Uuid,
        path: &Path,
        signature: ImageSignature,
        image: CategorizedImage,
    ) -> Self {
        Self {
            id,
            job_id,
            path: path.to_path_buf(),
            signature,
            tag: TriageTag::for_image(&image),
            comment: image.to_string(),
            summary: image.summary(),
            scanned_at: Utc::now(),
            image,
        }
    }
}

/// Counts the tags posted during one job.
#[derive(Debug)]
pub struct TagLedger {
    job_id: Uuid,
    posted: AtomicU64,
}

impl TagLedger {
    pub fn new(job_id: Uuid) -> Self {
        Self {
            job_id,
            posted: AtomicU64::new(0),
        }
    }

    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    pub fn post(&self, record: &TriageRecord) {
        self.posted.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("Tagged {} as {}", record.path.display(), record.tag);
    }

    pub fn posted(&self) -> u64 {
        self.posted.load(Ordering::Relaxed)
    }

    pub fn report(&self) -> String {
        format!("Posted {} triage tags", self.posted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::context::HitCounts;
    use crate::pipeline::services::image::ClassifierUsage;

    fn image_with(hits: HitCounts) -> CategorizedImage {
        let mut image = CategorizedImage::new(10, 10);
        image.record(hits);
        image.finalize(ClassifierUsage::default())
    }

    #[test]
    fn tags_bucket_by_ten() {
        assert_eq!(TriageTag::from_readable(0).to_string(), "SkinTone|000s");
        assert_eq!(TriageTag::from_readable(9).to_string(), "SkinTone|000s");
        assert_eq!(TriageTag::from_readable(47).to_string(), "SkinTone|040s");
        assert_eq!(TriageTag::from_readable(99).to_string(), "SkinTone|090s");
        assert_eq!(TriageTag::from_readable(100).to_string(), "SkinTone|100s");
        assert_eq!(TriageTag::from_readable(250).bucket(), 100);
    }

    #[test]
    fn record_carries_report_and_tag() {
        let image = image_with(HitCounts::new(50, 30));
        let record = TriageRecord::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Path::new("/evidence/a.jpg"),
            ImageSignature::Jpeg,
            image,
        );

        assert_eq!(record.tag.to_string(), "SkinTone|040s");
        assert!(record.comment.starts_with("40%\n10x10 = 100px\n"));
        assert_eq!(record.summary.hits, HitCounts::new(50, 30));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["tag"], "SkinTone|040s");
        assert_eq!(json["signature"], "Jpeg");
        assert!(json.get("image").is_none());
    }

    #[test]
    fn ledger_counts_posts() {
        let job_id = Uuid::new_v4();
        let ledger = TagLedger::new(job_id);
        let record = TriageRecord::new(
            Uuid::new_v4(),
            job_id,
            Path::new("b.png"),
            ImageSignature::Png,
            image_with(HitCounts::default()),
        );

        ledger.post(&record);
        ledger.post(&record);
        assert_eq!(ledger.posted(), 2);
        assert_eq!(ledger.job_id(), job_id);
        assert_eq!(ledger.report(), "Posted 2 triage tags");
    }
}
