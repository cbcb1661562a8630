#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper for the vscore pipeline.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with one or two inputs
//! - Video probing (duration, frame rate, audio presence)
//! - Representative-frame sampling with scene-change/interval fallback
//! - Exact-duration audio fitting and peak normalization
//! - WAV serialization of generated audio
//! - Muxing the generated track into the source video

pub mod audio;
pub mod command;
pub mod error;
pub mod filters;
pub mod frames;
pub mod mux;
pub mod probe;
pub mod wav;

pub use audio::{fit_exact_seconds, normalize_peak};
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand};
pub use error::{MediaError, MediaResult};
pub use frames::{
    sample_frames, sample_interval_frames, FrameSampling, DEFAULT_SCENE_THRESHOLD,
    FALLBACK_INTERVAL_SECONDS,
};
pub use mux::mux_bgm_into_video;
pub use probe::{probe_video, VideoInfo};
pub use wav::write_wav_mono16;
