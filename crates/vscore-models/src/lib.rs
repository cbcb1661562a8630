//! Shared data models for the vscore pipeline.

pub mod audio;
pub mod frame;
pub mod generate;
pub mod preset;
pub mod prompt;

pub use audio::{AudioBuffer, GENERATION_SAMPLE_RATE};
pub use frame::Frame;
pub use generate::{clamp_target_seconds, GenerateConfig, MAX_TARGET_SECONDS, MIN_TARGET_SECONDS};
pub use preset::{QualityPreset, DEFAULT_QUALITY_LEVEL, MAX_QUALITY_LEVEL, MIN_QUALITY_LEVEL};
pub use prompt::{synthesize_prompt, DEFAULT_PROMPT};
