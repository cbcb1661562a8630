//! Pipeline configuration.

use std::path::PathBuf;

use vscore_media::{DEFAULT_SCENE_THRESHOLD, FALLBACK_INTERVAL_SECONDS};

/// Default number of runs allowed to wait behind the active one.
pub const DEFAULT_QUEUE_DEPTH: usize = 8;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory receiving run artifacts (wav, muxed video, prompt, summary).
    pub output_dir: PathBuf,
    /// Scene-change threshold for the primary sampling pass.
    pub scene_threshold: f64,
    /// Interval in seconds for the fallback sampling pass.
    pub fallback_interval: f64,
    /// Runs admitted to the wait queue while one is active.
    pub queue_depth: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            scene_threshold: DEFAULT_SCENE_THRESHOLD,
            fallback_interval: FALLBACK_INTERVAL_SECONDS,
            queue_depth: DEFAULT_QUEUE_DEPTH,
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            output_dir: std::env::var("VSCORE_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_output_dir()),
            scene_threshold: std::env::var("VSCORE_SCENE_THRESHOLD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_SCENE_THRESHOLD),
            fallback_interval: std::env::var("VSCORE_FALLBACK_INTERVAL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(FALLBACK_INTERVAL_SECONDS),
            queue_depth: std::env::var("VSCORE_QUEUE_DEPTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_QUEUE_DEPTH),
        }
    }
}

/// Per-user data directory when available, `./outputs` otherwise.
fn default_output_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("vscore").join("outputs"))
        .unwrap_or_else(|| PathBuf::from("outputs"))
}
