use std::path::PathBuf;

use thiserror::Error;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),
    #[error("Configuration Load Error: {0}")]
    ConfigLoad(#[from] config::ConfigError),
    #[error("Intake Error: {0}")]
    Intake(#[from] IntakeError),
    #[error("Scan Error: {0}")]
    Scan(#[from] ScanError),
    #[error("Serialization Error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Errors raised while reading, sniffing or decoding candidate files
#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Failed to read {1}: {0}")]
    ReadError(std::io::Error, PathBuf),
    #[error("Failed to decode image: {0}")]
    DecodeError(#[from] image::ImageError),
    #[error("Pixel grid holds {actual} pixels, expected {expected}")]
    GridSizeMismatch { expected: usize, actual: usize },
    #[error("Decoder worker failed: {0}")]
    DecoderFailed(String),
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("The scan was cancelled.")]
    Cancelled,
    #[error("Pixel ({x}, {y}) could not be read from the grid")]
    PixelUnavailable { x: u32, y: u32 },
    #[error("Scan worker failed: {0}")]
    WorkerFailed(String),
    #[error("The scan timed out.")]
    Timeout,
}
