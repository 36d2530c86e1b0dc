use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::common::SharedPixelGrid;
use crate::error::IntakeError;

/// Turns an image file into a pixel grid the scanner can walk.
#[async_trait]
pub trait PixelGridDecoder: Send + Sync {
    async fn decode(&self, path: &Path) -> Result<SharedPixelGrid, IntakeError>;

    fn name(&self) -> &'static str;
}

/// Decodes with the `image` crate and normalises to 8-bit RGB.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateDecoder;

#[async_trait]
impl PixelGridDecoder for ImageCrateDecoder {
    async fn decode(&self, path: &Path) -> Result<SharedPixelGrid, IntakeError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| IntakeError::ReadError(e, path.to_path_buf()))?;

        let rgb = tokio::task::spawn_blocking(move || {
            image::load_from_memory(&bytes).map(|decoded| decoded.to_rgb8())
        })
        .await
        .map_err(|e| IntakeError::DecoderFailed(e.to_string()))??;

        tracing::debug!(
            "Decoded {} into a {}x{} grid",
            path.display(),
            rgb.width(),
            rgb.height()
        );

        Ok(Arc::new(rgb))
    }

    fn name(&self) -> &'static str {
        "image"
    }
}
