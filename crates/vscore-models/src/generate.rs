//! Generation call parameters.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::preset::QualityPreset;

/// Default target duration in seconds.
pub const DEFAULT_SECONDS: u32 = 10;
/// Default classifier-free guidance scale.
pub const DEFAULT_GUIDANCE_SCALE: f32 = 3.0;
/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 1.0;
/// Default top-k sampling cutoff.
pub const DEFAULT_TOP_K: u32 = 250;
/// Default decoder token budget per second of audio.
pub const DEFAULT_TOKENS_PER_SEC: u32 = 50;
/// Default random seed.
pub const DEFAULT_SEED: u64 = 42;

/// Shortest target duration the pipeline will request.
pub const MIN_TARGET_SECONDS: u32 = 4;
/// Longest target duration the pipeline will request.
pub const MAX_TARGET_SECONDS: u32 = 120;

/// Scalar parameters for one audio-generation call.
///
/// Built fresh per run from a [`QualityPreset`] and never mutated after
/// construction. Crosses the wire to the generation sidecar as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Validate)]
pub struct GenerateConfig {
    /// Target duration in seconds.
    #[validate(range(min = 1))]
    #[serde(default = "default_seconds")]
    pub seconds: u32,

    /// Classifier-free guidance scale. Must be positive.
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_guidance_scale")]
    pub guidance_scale: f32,

    /// Sampling temperature, typically 0.6-1.6.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Top-k sampling cutoff.
    #[validate(range(min = 1))]
    #[serde(default = "default_top_k")]
    pub top_k: u32,

    /// Decoder token budget per second of generated audio.
    #[validate(range(min = 1))]
    #[serde(default = "default_tokens_per_sec")]
    pub tokens_per_sec: u32,

    /// Random seed; omitted from the wire when unset so the service
    /// runs unseeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_seconds() -> u32 {
    DEFAULT_SECONDS
}
fn default_guidance_scale() -> f32 {
    DEFAULT_GUIDANCE_SCALE
}
fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}
fn default_top_k() -> u32 {
    DEFAULT_TOP_K
}
fn default_tokens_per_sec() -> u32 {
    DEFAULT_TOKENS_PER_SEC
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            seconds: DEFAULT_SECONDS,
            guidance_scale: DEFAULT_GUIDANCE_SCALE,
            temperature: DEFAULT_TEMPERATURE,
            top_k: DEFAULT_TOP_K,
            tokens_per_sec: DEFAULT_TOKENS_PER_SEC,
            seed: Some(DEFAULT_SEED),
        }
    }
}

impl GenerateConfig {
    /// Build the config for one run from a quality preset.
    pub fn from_preset(preset: QualityPreset, seconds: u32, temperature: f32, seed: u64) -> Self {
        Self {
            seconds,
            guidance_scale: preset.guidance_scale,
            temperature,
            top_k: preset.top_k,
            tokens_per_sec: preset.tokens_per_sec,
            seed: Some(seed),
        }
    }
}

/// Clamp a probed video duration to the target-seconds range the pipeline
/// supports, rounding to the nearest whole second first.
pub fn clamp_target_seconds(duration_seconds: f64) -> u32 {
    let rounded = duration_seconds.round() as i64;
    rounded.clamp(MIN_TARGET_SECONDS as i64, MAX_TARGET_SECONDS as i64) as u32
}
