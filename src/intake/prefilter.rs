use std::path::Path;

use serde::Serialize;

use super::signature::{self, ImageSignature};
use crate::config::IntakeConfig;
use crate::error::IntakeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    Known,
    NotAFile,
    TooSmall(u64),
    UnsupportedFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefilter {
    Accepted(ImageSignature),
    Rejected(SkipReason),
}

/// Decides whether a file is worth decoding, using only its metadata and
/// its first few bytes.
pub async fn prefilter(path: &Path, config: &IntakeConfig) -> Result<Prefilter, IntakeError> {
    if config.skip_known_files && config.is_known_file(path) {
        return Ok(Prefilter::Rejected(SkipReason::Known));
    }

    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| IntakeError::ReadError(e, path.to_path_buf()))?;
    if !metadata.is_file() {
        return Ok(Prefilter::Rejected(SkipReason::NotAFile));
    }
    if metadata.len() < config.min_file_size {
        return Ok(Prefilter::Rejected(SkipReason::TooSmall(metadata.len())));
    }

    let verdict = match signature::read_header(path).await? {
        Some(header) => match signature::sniff(&header) {
            Some(signature) => Prefilter::Accepted(signature),
            None => Prefilter::Rejected(SkipReason::UnsupportedFormat),
        },
        None => Prefilter::Rejected(SkipReason::UnsupportedFormat),
    };
    Ok(verdict)
}
