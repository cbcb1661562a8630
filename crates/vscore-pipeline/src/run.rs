//! End-to-end scoring runs.
//!
//! One run walks the fixed pipeline: probe the video, sample representative
//! frames, caption them, synthesize a generation prompt, generate music, fit
//! it to the video's exact duration, and mux the result back into the video.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use vscore_media::{
    fit_exact_seconds, mux_bgm_into_video, normalize_peak, probe_video, sample_frames,
    sample_interval_frames, write_wav_mono16, FrameSampling,
};
use vscore_models::generate::DEFAULT_TEMPERATURE;
use vscore_models::{
    clamp_target_seconds, synthesize_prompt, GenerateConfig, QualityPreset, DEFAULT_QUALITY_LEVEL,
};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::gate::PipelineGate;
use crate::services::ModelServices;

/// Generated track, overwritten on every run.
pub const BGM_WAV: &str = "bgm.wav";
/// Muxed output video, overwritten on every run.
pub const OUTPUT_VIDEO: &str = "video_with_bgm.mp4";
/// Final prompt handed to the generator.
pub const PROMPT_FILE: &str = "prompt.txt";
/// Machine-readable run summary.
pub const SUMMARY_FILE: &str = "run.json";

/// Default gain applied to the generated track at mux time, in dB.
pub const DEFAULT_BGM_GAIN_DB: f32 = -4.0;

/// A single scoring request.
#[derive(Debug, Clone, Validate)]
pub struct RunRequest {
    /// Source video path.
    pub video: PathBuf,
    /// Quality/speed level selecting the generation preset.
    #[validate(range(min = 1, max = 5))]
    pub level: u8,
    /// Sampling temperature for the generator.
    #[validate(range(min = 0.6, max = 1.6))]
    pub temperature: f32,
    /// Gain for the generated track at mux time, in dB.
    #[validate(range(min = -24.0, max = 6.0))]
    pub gain_db: f32,
    /// Replaces the synthesized prompt and skips captioning when set.
    pub prompt_override: Option<String>,
    /// Generation seed; a fresh 31-bit value is drawn when unset.
    pub seed: Option<u64>,
    /// Overrides the configured output directory when set.
    pub output_dir: Option<PathBuf>,
}

impl RunRequest {
    /// Request for `video` with default knobs.
    pub fn new(video: impl Into<PathBuf>) -> Self {
        Self {
            video: video.into(),
            level: DEFAULT_QUALITY_LEVEL,
            temperature: DEFAULT_TEMPERATURE,
            gain_db: DEFAULT_BGM_GAIN_DB,
            prompt_override: None,
            seed: None,
            output_dir: None,
        }
    }
}

/// Everything a completed run produced, serialized to [`SUMMARY_FILE`].
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub video: PathBuf,
    pub video_duration_seconds: f64,
    pub source_has_audio: bool,
    pub level: u8,
    pub target_seconds: u32,
    pub seed: u64,
    pub gain_db: f32,
    /// Empty when the prompt was caller-provided.
    pub captions: Vec<String>,
    pub prompt: String,
    pub sample_rate: u32,
    pub fitted_samples: usize,
    pub bgm_wav: PathBuf,
    pub output_video: PathBuf,
}

/// Artifact paths plus the summary for a completed run.
#[derive(Debug, Clone)]
pub struct RunArtifacts {
    pub bgm_wav: PathBuf,
    pub output_video: PathBuf,
    pub summary: RunSummary,
}

/// Captions and prompt from a dry run of the text half of the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct PromptPreview {
    pub frames: usize,
    pub captions: Vec<String>,
    pub prompt: String,
}

/// The scoring pipeline.
///
/// Holds the model seams and the admission gate; one instance serves the
/// whole process.
pub struct Pipeline {
    config: PipelineConfig,
    services: Arc<ModelServices>,
    gate: PipelineGate,
}

impl Pipeline {
    /// Create a pipeline over the given model services.
    pub fn new(config: PipelineConfig, services: Arc<ModelServices>) -> Self {
        let gate = PipelineGate::new(config.queue_depth);
        Self {
            config,
            services,
            gate,
        }
    }

    /// The shared model services, for background warm-up.
    pub fn services(&self) -> &Arc<ModelServices> {
        &self.services
    }

    /// Score the request's video and mux the generated track into it.
    ///
    /// Rejected immediately with [`PipelineError::Busy`] when one run is
    /// active and the wait queue is full. Missing or unreadable input is
    /// rejected before any model call.
    pub async fn run(&self, request: RunRequest) -> PipelineResult<RunArtifacts> {
        request.validate()?;
        let _permit = self.gate.admit().await?;

        if !request.video.exists() {
            return Err(PipelineError::VideoNotFound(request.video.clone()));
        }

        let run_id = Uuid::new_v4();
        let started = Instant::now();
        info!(
            run_id = %run_id,
            video = %request.video.display(),
            level = request.level,
            "Starting scoring run"
        );

        self.services.ensure_ready().await?;

        let info = probe_video(&request.video).await?;
        let target_seconds = clamp_target_seconds(info.duration);
        let preset = QualityPreset::for_level(request.level);

        let (captions, prompt) = match trimmed_override(request.prompt_override.as_deref()) {
            Some(prompt) => {
                info!(run_id = %run_id, "Prompt provided by caller, skipping captioning");
                (Vec::new(), prompt)
            }
            None => {
                let sampling = FrameSampling {
                    scene_threshold: self.config.scene_threshold,
                    fallback_interval: self.config.fallback_interval,
                    max_frames: preset.max_frames,
                };
                let frames = sample_frames(&request.video, &sampling).await?;
                info!(run_id = %run_id, frames = frames.len(), "Sampled representative frames");

                let captions = self.services.caption().caption(&frames).await?;
                let prompt = synthesize_prompt(&captions);
                (captions, prompt)
            }
        };

        let seed = request.seed.unwrap_or_else(random_seed);
        let generate =
            GenerateConfig::from_preset(preset, target_seconds, request.temperature, seed);

        info!(run_id = %run_id, target_seconds, seed, "Generating music");
        let audio = self.services.music().generate(&prompt, &generate).await?;
        if audio.is_empty() || audio.sample_rate == 0 {
            return Err(PipelineError::EmptyGeneration);
        }
        info!(
            run_id = %run_id,
            raw_seconds = audio.duration_seconds(),
            "Generated raw audio"
        );

        let sample_rate = audio.sample_rate;
        let mut samples = audio.samples;
        normalize_peak(&mut samples);
        let fitted = fit_exact_seconds(&samples, sample_rate, f64::from(target_seconds));

        let output_dir = request
            .output_dir
            .as_deref()
            .unwrap_or(self.config.output_dir.as_path());
        tokio::fs::create_dir_all(output_dir).await?;

        let bgm_wav = output_dir.join(BGM_WAV);
        write_wav_mono16(&bgm_wav, sample_rate, &fitted)?;

        let output_video = output_dir.join(OUTPUT_VIDEO);
        mux_bgm_into_video(&request.video, &bgm_wav, &output_video, request.gain_db).await?;

        let summary = RunSummary {
            run_id,
            created_at: Utc::now(),
            video: request.video.clone(),
            video_duration_seconds: info.duration,
            source_has_audio: info.has_audio,
            level: request.level,
            target_seconds,
            seed,
            gain_db: request.gain_db,
            captions,
            prompt: prompt.clone(),
            sample_rate,
            fitted_samples: fitted.len(),
            bgm_wav: bgm_wav.clone(),
            output_video: output_video.clone(),
        };
        tokio::fs::write(output_dir.join(PROMPT_FILE), format!("{prompt}\n")).await?;
        tokio::fs::write(
            output_dir.join(SUMMARY_FILE),
            serde_json::to_vec_pretty(&summary)?,
        )
        .await?;

        info!(
            run_id = %run_id,
            elapsed_secs = started.elapsed().as_secs_f64(),
            output = %output_video.display(),
            "Run complete"
        );

        Ok(RunArtifacts {
            bgm_wav,
            output_video,
            summary,
        })
    }

    /// Caption a video and synthesize the prompt without generating audio.
    ///
    /// Samples at a fixed interval rather than by scene change so the
    /// preview covers the clip evenly.
    pub async fn preview_prompt(
        &self,
        video: impl AsRef<Path>,
        every_seconds: f64,
        max_frames: usize,
    ) -> PipelineResult<PromptPreview> {
        let video = video.as_ref();
        if !video.exists() {
            return Err(PipelineError::VideoNotFound(video.to_path_buf()));
        }

        self.services.ensure_ready().await?;

        let frames = sample_interval_frames(video, every_seconds, max_frames).await?;
        let captions = self.services.caption().caption(&frames).await?;
        let prompt = synthesize_prompt(&captions);

        Ok(PromptPreview {
            frames: frames.len(),
            captions,
            prompt,
        })
    }
}

/// Caller-provided prompt, if it survives trimming.
fn trimmed_override(prompt: Option<&str>) -> Option<String> {
    prompt
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_owned)
}

/// 31-bit seed matching the generator's accepted range.
fn random_seed() -> u64 {
    u64::from(rand::random::<u32>() & 0x7FFF_FFFF)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use vscore_ml_client::{CaptionService, MlResult, MusicService};
    use vscore_models::{AudioBuffer, Frame};

    #[derive(Default)]
    struct StubCaption {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CaptionService for StubCaption {
        async fn caption(&self, frames: &[Frame]) -> MlResult<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![String::from("a test scene"); frames.len()])
        }
    }

    struct StubMusic;

    #[async_trait]
    impl MusicService for StubMusic {
        async fn generate(&self, _prompt: &str, config: &GenerateConfig) -> MlResult<AudioBuffer> {
            let samples = vec![0.5; (config.seconds * 32_000) as usize];
            Ok(AudioBuffer::new(32_000, samples))
        }
    }

    fn test_pipeline(caption: Arc<StubCaption>) -> Pipeline {
        let services = ModelServices::new(caption, Arc::new(StubMusic));
        Pipeline::new(PipelineConfig::default(), Arc::new(services))
    }

    #[test]
    fn test_default_request_is_valid() {
        let request = RunRequest::new("clip.mp4");
        assert_eq!(request.level, 2);
        assert_eq!(request.temperature, 1.0);
        assert_eq!(request.gain_db, -4.0);
        assert!(request.seed.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_knobs_are_rejected() {
        let mut request = RunRequest::new("clip.mp4");
        request.level = 0;
        assert!(request.validate().is_err());

        let mut request = RunRequest::new("clip.mp4");
        request.level = 6;
        assert!(request.validate().is_err());

        let mut request = RunRequest::new("clip.mp4");
        request.temperature = 0.5;
        assert!(request.validate().is_err());

        let mut request = RunRequest::new("clip.mp4");
        request.gain_db = 7.0;
        assert!(request.validate().is_err());

        let mut request = RunRequest::new("clip.mp4");
        request.gain_db = -24.0;
        request.temperature = 1.6;
        request.level = 5;
        assert!(request.validate().is_ok());
    }

    #[tokio::test]
    async fn test_missing_video_rejected_before_model_calls() {
        let caption = Arc::new(StubCaption::default());
        let pipeline = test_pipeline(Arc::clone(&caption));

        let err = pipeline
            .run(RunRequest::new("/nonexistent/clip.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::VideoNotFound(_)));
        assert_eq!(caption.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_request_rejected_before_admission() {
        let caption = Arc::new(StubCaption::default());
        let pipeline = test_pipeline(Arc::clone(&caption));

        let mut request = RunRequest::new("/nonexistent/clip.mp4");
        request.temperature = 9.0;
        let err = pipeline.run(request).await.unwrap_err();
        assert!(matches!(err, PipelineError::Invalid(_)));
    }

    #[test]
    fn test_trimmed_override() {
        assert_eq!(trimmed_override(None), None);
        assert_eq!(trimmed_override(Some("   ")), None);
        assert_eq!(
            trimmed_override(Some("  calm piano  ")),
            Some(String::from("calm piano"))
        );
    }

    #[test]
    fn test_random_seed_fits_31_bits() {
        for _ in 0..100 {
            assert!(random_seed() < 1 << 31);
        }
    }

    #[test]
    fn test_summary_serializes_with_artifact_paths() {
        let summary = RunSummary {
            run_id: Uuid::new_v4(),
            created_at: Utc::now(),
            video: PathBuf::from("clip.mp4"),
            video_duration_seconds: 9.7,
            source_has_audio: true,
            level: 2,
            target_seconds: 10,
            seed: 42,
            gain_db: -4.0,
            captions: vec![String::from("a street at night")],
            prompt: String::from("mid-tempo, dark modern track"),
            sample_rate: 32_000,
            fitted_samples: 320_000,
            bgm_wav: PathBuf::from("outputs/bgm.wav"),
            output_video: PathBuf::from("outputs/video_with_bgm.mp4"),
        };

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["target_seconds"], 10);
        assert_eq!(value["fitted_samples"], 320_000);
        assert_eq!(value["bgm_wav"], "outputs/bgm.wav");
        assert!(value["run_id"].is_string());
    }
}
