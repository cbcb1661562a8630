//! End-to-end video scoring pipeline.
//!
//! Wires the media layer and the model sidecar client into one flow:
//! admission control, model warm-up, frame sampling, captioning, prompt
//! synthesis, music generation, duration fitting, and muxing.

pub mod config;
pub mod error;
pub mod gate;
pub mod run;
pub mod services;

pub use config::{PipelineConfig, DEFAULT_QUEUE_DEPTH};
pub use error::{PipelineError, PipelineResult};
pub use gate::{GatePermit, PipelineGate};
pub use run::{
    Pipeline, PromptPreview, RunArtifacts, RunRequest, RunSummary, BGM_WAV, DEFAULT_BGM_GAIN_DB,
    OUTPUT_VIDEO, PROMPT_FILE, SUMMARY_FILE,
};
pub use services::ModelServices;
