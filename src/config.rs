use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::AppError;
use crate::pipeline::services::image::analysis::ClassifierUsage;

const ENV_PREFIX: &str = "SKINTONE";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub scan: ScanConfig,
    pub intake: IntakeConfig,
    pub max_concurrent_scans: usize,
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub classifiers: ClassifierUsage,
    /// Spread row batches over the rayon pool instead of walking them in order.
    pub parallel: bool,
    /// Rows per batch; cancellation is checked between batches.
    pub rows_per_batch: u32,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    pub min_file_size: u64,
    pub skip_known_files: bool,
    /// Files the case already marks as known (e.g. hash-set matches).
    pub known_files: Vec<PathBuf>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
            intake: IntakeConfig::default(),
            max_concurrent_scans: 4,
            log_level: "info".to_string(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            classifiers: ClassifierUsage::default(),
            parallel: true,
            rows_per_batch: 64,
            timeout_ms: None,
        }
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            min_file_size: 100,
            skip_known_files: true,
            known_files: Vec::new(),
        }
    }
}

impl IntakeConfig {
    pub fn is_known_file(&self, path: &Path) -> bool {
        self.known_files.iter().any(|known| known == path)
    }
}

impl Configuration {
    /// Loads the configuration from an optional file, then applies
    /// `SKINTONE__SECTION__KEY` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let configuration: Configuration = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        configuration.validate()?;
        Ok(configuration)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !self.scan.classifiers.any() {
            return Err(AppError::Config(
                "At least one classifier must be enabled".to_string(),
            ));
        }

        if self.scan.rows_per_batch == 0 {
            return Err(AppError::Config(
                "Rows per batch must be greater than 0".to_string(),
            ));
        }

        if self.max_concurrent_scans == 0 {
            return Err(AppError::Config(
                "Max concurrent scans must be greater than 0".to_string(),
            ));
        }

        if self.scan.timeout_ms == Some(0) {
            return Err(AppError::Config(
                "Scan timeout must be greater than 0 when set".to_string(),
            ));
        }

        Ok(())
    }
}
