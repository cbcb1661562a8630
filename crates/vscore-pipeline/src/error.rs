//! Pipeline error types.

use std::path::PathBuf;

use thiserror::Error;

use vscore_media::MediaError;
use vscore_ml_client::MlError;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Video not found: {0}")]
    VideoNotFound(PathBuf),

    #[error("Pipeline busy: one run active and {queue_depth} queued")]
    Busy { queue_depth: usize },

    #[error("Model returned no audio")]
    EmptyGeneration,

    #[error("Invalid request: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("ML service error: {0}")]
    Ml(#[from] MlError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    /// True when the run was rejected at admission rather than failing.
    pub fn is_busy(&self) -> bool {
        matches!(self, PipelineError::Busy { .. })
    }

    /// True when ffmpeg or ffprobe is missing from PATH.
    pub fn is_missing_tool(&self) -> bool {
        matches!(self, PipelineError::Media(err) if err.is_missing_tool())
    }

    /// True when the failure sits in the model sidecar rather than local code.
    pub fn is_service_failure(&self) -> bool {
        matches!(self, PipelineError::Ml(_))
    }
}
