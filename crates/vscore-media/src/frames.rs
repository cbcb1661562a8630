//! Representative-frame extraction.
//!
//! Two strategies share one entry point: scene-change detection first, with
//! a mandatory fall back to fixed-interval sampling when detection fails or
//! finds nothing. Callers always get a non-empty frame sequence or a typed
//! error.

use std::path::{Path, PathBuf};
use tracing::warn;

use vscore_models::Frame;

use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};
use crate::probe::probe_video;

/// Default scene-change threshold (0..1 visual difference).
pub const DEFAULT_SCENE_THRESHOLD: f64 = 0.35;
/// Sampling interval used when scene detection yields nothing.
pub const FALLBACK_INTERVAL_SECONDS: f64 = 0.6;
/// Width selected frames are downscaled to; height follows, kept even.
const SCENE_SCALE_WIDTH: u32 = 640;
/// Filename pattern for extracted frames; sorts in extraction order.
const FRAME_PATTERN: &str = "f_%04d.jpg";

/// Parameters for representative-frame sampling.
#[derive(Debug, Clone)]
pub struct FrameSampling {
    /// Scene-change threshold for the primary pass.
    pub scene_threshold: f64,
    /// Interval in seconds for the fallback pass.
    pub fallback_interval: f64,
    /// Upper bound on returned frames.
    pub max_frames: usize,
}

impl Default for FrameSampling {
    fn default() -> Self {
        Self {
            scene_threshold: DEFAULT_SCENE_THRESHOLD,
            fallback_interval: FALLBACK_INTERVAL_SECONDS,
            max_frames: 8,
        }
    }
}

/// Sample representative frames from a video.
///
/// Runs scene-change detection first; when that pass fails to decode or
/// selects zero frames (static footage), falls back to fixed-interval
/// sampling at `fallback_interval`. A missing ffmpeg binary is reported
/// as-is rather than triggering the fallback.
pub async fn sample_frames(
    video: impl AsRef<Path>,
    sampling: &FrameSampling,
) -> MediaResult<Vec<Frame>> {
    let video = video.as_ref();

    if !video.exists() {
        return Err(MediaError::FileNotFound(video.to_path_buf()));
    }

    match scene_change_pass(video, sampling.scene_threshold, sampling.max_frames).await {
        Ok(frames) if !frames.is_empty() => Ok(frames),
        Ok(_) => {
            warn!(
                video = %video.display(),
                "No scene changes detected, falling back to interval sampling"
            );
            sample_interval_frames(video, sampling.fallback_interval, sampling.max_frames).await
        }
        Err(err @ MediaError::FfmpegNotFound) => Err(err),
        Err(err) => {
            warn!(
                video = %video.display(),
                error = %err,
                "Scene detection failed, falling back to interval sampling"
            );
            sample_interval_frames(video, sampling.fallback_interval, sampling.max_frames).await
        }
    }
}

/// Sample frames at a fixed interval in temporal order.
///
/// The stride is `max(1, round(every_seconds * fps))` decoded frames; at
/// most `max_frames` frames are returned. Fails when the video cannot be
/// probed or decodes to zero frames.
pub async fn sample_interval_frames(
    video: impl AsRef<Path>,
    every_seconds: f64,
    max_frames: usize,
) -> MediaResult<Vec<Frame>> {
    let video = video.as_ref();
    let info = probe_video(video).await?;
    let stride = interval_stride(every_seconds, info.fps);

    let scratch = tempfile::Builder::new()
        .prefix("vscore-frames-")
        .tempdir()?;
    let pattern = scratch.path().join(FRAME_PATTERN);

    FfmpegCommand::new(video, &pattern)
        .video_filter(format!("select=not(mod(n\\,{stride}))"))
        .vfr()
        .max_video_frames(max_frames)
        .run()
        .await?;

    let frames = collect_frames(scratch.path(), max_frames).await?;
    if frames.is_empty() {
        return Err(MediaError::invalid_video(format!(
            "no decodable frames in {}",
            video.display()
        )));
    }
    Ok(frames)
}

/// Scene-change extraction into a scratch directory.
async fn scene_change_pass(
    video: &Path,
    threshold: f64,
    max_frames: usize,
) -> MediaResult<Vec<Frame>> {
    let scratch = tempfile::Builder::new()
        .prefix("vscore-scenes-")
        .tempdir()?;
    let pattern = scratch.path().join(FRAME_PATTERN);

    // The comma inside gt() must be escaped or the graph parser splits on it.
    let filter = format!("select=gt(scene\\,{threshold}),scale={SCENE_SCALE_WIDTH}:-2");

    FfmpegCommand::new(video, &pattern)
        .input_args(["-analyzeduration", "5M", "-probesize", "10M"])
        .video_filter(filter)
        .vfr()
        .max_video_frames(max_frames)
        .run()
        .await?;

    collect_frames(scratch.path(), max_frames).await
}

/// Decoded-frame stride for interval sampling.
fn interval_stride(every_seconds: f64, fps: f64) -> u64 {
    (every_seconds * fps).round().max(1.0) as u64
}

/// Load extracted JPEGs in filename order, up to `max_frames`.
async fn collect_frames(dir: &Path, max_frames: usize) -> MediaResult<Vec<Frame>> {
    let mut paths: Vec<PathBuf> = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("jpg") {
            paths.push(path);
        }
    }
    paths.sort();
    paths.truncate(max_frames);

    let mut frames = Vec::with_capacity(paths.len());
    for (index, path) in paths.iter().enumerate() {
        let (width, height) = image::image_dimensions(path)
            .map_err(|e| MediaError::FrameDecode(format!("{}: {e}", path.display())))?;
        let data = tokio::fs::read(path).await?;
        frames.push(Frame::new(index, width, height, data));
    }
    Ok(frames)
}
