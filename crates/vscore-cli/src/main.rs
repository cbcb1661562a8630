//! vscore command-line interface.
//!
//! Three commands: `generate` runs the full scoring pipeline on a video,
//! `prompt` dry-runs the caption/prompt half without generating audio, and
//! `check` verifies local tools and sidecar health.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vscore_media::{check_ffmpeg, check_ffprobe};
use vscore_ml_client::{MlClient, MlError};
use vscore_pipeline::{
    ModelServices, Pipeline, PipelineConfig, PipelineError, RunRequest, DEFAULT_BGM_GAIN_DB,
};

/// Generate background music for a video and mux it back in.
#[derive(Parser, Debug)]
#[command(name = "vscore", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score a video: sample frames, caption, generate music, mux
    Generate {
        /// Source video file
        video: PathBuf,
        /// Quality/speed level, 1 (light) to 5 (heavy)
        #[arg(short, long, default_value_t = 2)]
        level: u8,
        /// Generator sampling temperature, 0.6 to 1.6
        #[arg(short, long, default_value_t = 1.0)]
        temperature: f32,
        /// Gain for the generated track in dB, -24 to 6
        #[arg(
            short,
            long,
            default_value_t = DEFAULT_BGM_GAIN_DB,
            allow_negative_numbers = true
        )]
        gain: f32,
        /// Use this prompt instead of captioning the video
        #[arg(short, long)]
        prompt: Option<String>,
        /// Generation seed; random when omitted
        #[arg(short, long)]
        seed: Option<u64>,
        /// Output directory; per-user data dir when omitted
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
    /// Caption a video and print the synthesized prompt, without generating audio
    Prompt {
        /// Source video file
        video: PathBuf,
        /// Sampling interval in seconds
        #[arg(long, default_value_t = 0.5)]
        every: f64,
        /// Maximum frames to caption
        #[arg(long, default_value_t = 12)]
        max_frames: usize,
        /// Also write the prompt to this file
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Verify that ffmpeg, ffprobe and the model sidecar are reachable
    Check,
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    if let Err(err) = execute(cli.command).await {
        report(&err);
        std::process::exit(1);
    }
}

/// Colored output for dev, JSON when LOG_FORMAT=json.
fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper_util=warn,reqwest=warn"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

async fn execute(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Generate {
            video,
            level,
            temperature,
            gain,
            prompt,
            seed,
            output_dir,
        } => generate(video, level, temperature, gain, prompt, seed, output_dir).await,
        Commands::Prompt {
            video,
            every,
            max_frames,
            out,
        } => preview(video, every, max_frames, out).await,
        Commands::Check => check().await,
    }
}

/// Pipeline over a sidecar client from the environment, warming in the
/// background.
fn build_pipeline() -> anyhow::Result<Pipeline> {
    let client = Arc::new(MlClient::from_env()?);
    let services = Arc::new(ModelServices::from_client(client));
    let _ = services.spawn_warmup();
    Ok(Pipeline::new(PipelineConfig::from_env(), services))
}

async fn generate(
    video: PathBuf,
    level: u8,
    temperature: f32,
    gain: f32,
    prompt: Option<String>,
    seed: Option<u64>,
    output_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let pipeline = build_pipeline()?;

    let mut request = RunRequest::new(video);
    request.level = level;
    request.temperature = temperature;
    request.gain_db = gain;
    request.prompt_override = prompt;
    request.seed = seed;
    request.output_dir = output_dir;

    let artifacts = pipeline.run(request).await?;

    println!("prompt: {}", artifacts.summary.prompt);
    println!("bgm:    {}", artifacts.bgm_wav.display());
    println!("video:  {}", artifacts.output_video.display());
    Ok(())
}

async fn preview(
    video: PathBuf,
    every: f64,
    max_frames: usize,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let pipeline = build_pipeline()?;
    let preview = pipeline.preview_prompt(&video, every, max_frames).await?;

    info!(frames = preview.frames, "Captioned video");
    for caption in &preview.captions {
        info!(caption = %caption, "Frame caption");
    }
    println!("{}", preview.prompt);

    if let Some(out) = out {
        tokio::fs::write(&out, format!("{}\n", preview.prompt)).await?;
        info!(path = %out.display(), "Prompt written");
    }
    Ok(())
}

async fn check() -> anyhow::Result<()> {
    let mut failures = 0_usize;

    match check_ffmpeg() {
        Ok(path) => println!("ffmpeg    {}", path.display()),
        Err(err) => {
            println!("ffmpeg    missing ({err})");
            failures += 1;
        }
    }
    match check_ffprobe() {
        Ok(path) => println!("ffprobe   {}", path.display()),
        Err(err) => {
            println!("ffprobe   missing ({err})");
            failures += 1;
        }
    }

    let client = MlClient::from_env()?;
    if client.health_check().await? {
        println!("sidecar   ok");
    } else {
        println!("sidecar   unreachable");
        failures += 1;
    }

    if failures > 0 {
        anyhow::bail!("{failures} dependency check(s) failed");
    }
    Ok(())
}

/// Log the failure with an actionable hint where one exists.
fn report(err: &anyhow::Error) {
    if let Some(err) = err.downcast_ref::<PipelineError>() {
        if err.is_missing_tool() {
            error!("{err}");
            eprintln!("ffmpeg and ffprobe are required; install them and make sure both are on PATH");
            return;
        }
        if err.is_service_failure() {
            error!("{err}");
            eprintln!("the model sidecar is unreachable or failing; start it and point ML_SERVICE_URL at it");
            return;
        }
    }
    if err.downcast_ref::<MlError>().is_some() {
        error!("{err}");
        eprintln!("the model sidecar is unreachable or failing; start it and point ML_SERVICE_URL at it");
        return;
    }
    error!("{err:#}");
}
