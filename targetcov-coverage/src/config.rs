use std::fs::read_to_string;
use std::num::NonZeroUsize;
use std::path::Path;
use std::thread::available_parallelism;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MAX_CHUNK: usize = 10_000;
pub const DEFAULT_STRIDE: i64 = 4;
pub const DEFAULT_HISTOGRAM_CAPACITY: usize = 15_000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid coverage config: {0}")]
    Invalid(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

///
/// Settings for a [`CoverageEngine`](crate::CoverageEngine) run.
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// threads = 8
/// stride = 4
/// timeout_secs = 600
/// ```
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CoverageConfig {
    /// Worker threads; `None` uses the available hardware parallelism.
    pub threads: Option<usize>,
    /// Most intervals handed to a single task.
    pub max_chunk: usize,
    /// Sampling stride: spans longer than this are sampled every `stride` positions.
    pub stride: i64,
    /// Number of depth bins; deeper positions land in the last bin.
    pub histogram_capacity: usize,
    /// How long `scan_overall` waits for its tasks, in seconds.
    pub timeout_secs: Option<f64>,
    /// Draw a progress bar over finished tasks.
    pub progress: bool,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        CoverageConfig {
            threads: None,
            max_chunk: DEFAULT_MAX_CHUNK,
            stride: DEFAULT_STRIDE,
            histogram_capacity: DEFAULT_HISTOGRAM_CAPACITY,
            timeout_secs: None,
            progress: false,
        }
    }
}

impl CoverageConfig {
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_max_chunk(mut self, max_chunk: usize) -> Self {
        self.max_chunk = max_chunk;
        self
    }

    pub fn with_stride(mut self, stride: i64) -> Self {
        self.stride = stride;
        self
    }

    pub fn with_histogram_capacity(mut self, capacity: usize) -> Self {
        self.histogram_capacity = capacity;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = Some(timeout.as_secs_f64());
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Resolved worker count.
    pub fn thread_count(&self) -> usize {
        self.threads.unwrap_or_else(|| {
            available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1)
        })
    }

    /// Resolved deadline, if any. Invalid values resolve to `None`; see [`Self::validate`].
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads == Some(0) {
            return Err(ConfigError::Invalid("threads must be at least 1".to_string()));
        }
        if self.max_chunk == 0 {
            return Err(ConfigError::Invalid(
                "max_chunk must be at least 1".to_string(),
            ));
        }
        if self.stride < 1 {
            return Err(ConfigError::Invalid(format!(
                "stride must be at least 1, got {}",
                self.stride
            )));
        }
        if self.histogram_capacity == 0 {
            return Err(ConfigError::Invalid(
                "histogram_capacity must be at least 1".to_string(),
            ));
        }
        if let Some(secs) = self.timeout_secs {
            if !(secs.is_finite() && secs > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "timeout_secs must be a positive number, got {secs}"
                )));
            }
        }
        Ok(())
    }
}

impl TryFrom<&Path> for CoverageConfig {
    type Error = ConfigError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let toml_str = read_to_string(path)?;
        let config: CoverageConfig = toml::from_str(&toml_str)?;
        config.validate()?;
        Ok(config)
    }
}
