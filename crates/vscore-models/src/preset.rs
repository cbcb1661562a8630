//! Quality/speed presets.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Lowest selectable quality level.
pub const MIN_QUALITY_LEVEL: u8 = 1;
/// Highest selectable quality level.
pub const MAX_QUALITY_LEVEL: u8 = 5;
/// Default quality level.
pub const DEFAULT_QUALITY_LEVEL: u8 = 2;

/// Knobs derived from a quality level.
///
/// Higher levels look at more frames and spend more decoding effort per
/// second of audio; lower levels favor turnaround time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QualityPreset {
    /// Maximum number of frames handed to the caption service.
    pub max_frames: usize,
    /// Decoder token budget per second of generated audio.
    pub tokens_per_sec: u32,
    /// Classifier-free guidance scale.
    pub guidance_scale: f32,
    /// Top-k sampling cutoff.
    pub top_k: u32,
}

const PRESETS: [QualityPreset; 5] = [
    QualityPreset {
        max_frames: 6,
        tokens_per_sec: 32,
        guidance_scale: 1.8,
        top_k: 120,
    },
    QualityPreset {
        max_frames: 8,
        tokens_per_sec: 36,
        guidance_scale: 2.0,
        top_k: 160,
    },
    QualityPreset {
        max_frames: 10,
        tokens_per_sec: 40,
        guidance_scale: 2.2,
        top_k: 200,
    },
    QualityPreset {
        max_frames: 12,
        tokens_per_sec: 46,
        guidance_scale: 2.6,
        top_k: 240,
    },
    QualityPreset {
        max_frames: 16,
        tokens_per_sec: 50,
        guidance_scale: 3.0,
        top_k: 280,
    },
];

impl QualityPreset {
    /// Look up the preset for a quality level, clamping out-of-range levels
    /// into [`MIN_QUALITY_LEVEL`, `MAX_QUALITY_LEVEL`].
    pub fn for_level(level: u8) -> Self {
        let idx = level.clamp(MIN_QUALITY_LEVEL, MAX_QUALITY_LEVEL) - MIN_QUALITY_LEVEL;
        PRESETS[idx as usize]
    }
}

impl Default for QualityPreset {
    fn default() -> Self {
        Self::for_level(DEFAULT_QUALITY_LEVEL)
    }
}
