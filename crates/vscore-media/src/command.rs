//! FFmpeg command builder and runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// How much captured stderr to keep in an error.
const STDERR_TAIL_BYTES: usize = 4096;

/// Builder for FFmpeg commands.
///
/// Supports one or two inputs (mux runs take the source video plus the
/// generated WAV). Arguments are assembled in ffmpeg order: global flags,
/// per-input flags, `-i` inputs, output flags, output path.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Primary input file path
    input: PathBuf,
    /// Optional second input (generated audio track)
    second_input: Option<PathBuf>,
    /// Output file path
    output: PathBuf,
    /// Input arguments (before the first -i)
    input_args: Vec<String>,
    /// Output arguments (after inputs)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            second_input: None,
            output: output.as_ref().to_path_buf(),
            input_args: Vec::new(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Add a second input file.
    pub fn second_input(mut self, input: impl AsRef<Path>) -> Self {
        self.second_input = Some(input.as_ref().to_path_buf());
        self
    }

    /// Add an input argument (before the first -i).
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add multiple input arguments.
    pub fn input_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add an output argument (after inputs).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set video filter.
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    /// Set filter complex.
    pub fn filter_complex(self, filter: impl Into<String>) -> Self {
        self.output_arg("-filter_complex").output_arg(filter)
    }

    /// Map a stream or filter label into the output.
    pub fn map(self, spec: impl Into<String>) -> Self {
        self.output_arg("-map").output_arg(spec)
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Set audio bitrate.
    pub fn audio_bitrate(self, bitrate: impl Into<String>) -> Self {
        self.output_arg("-b:a").output_arg(bitrate)
    }

    /// Set output audio sample rate.
    pub fn audio_sample_rate(self, rate: u32) -> Self {
        self.output_arg("-ar").output_arg(rate.to_string())
    }

    /// Limit the number of output video frames.
    pub fn max_video_frames(self, count: usize) -> Self {
        self.output_arg("-frames:v").output_arg(count.to_string())
    }

    /// Emit frames with variable frame rate timing (drop-free select output).
    pub fn vfr(self) -> Self {
        self.output_arg("-vsync").output_arg("vfr")
    }

    /// Place the moov atom up front for streaming playback.
    pub fn faststart(self) -> Self {
        self.output_arg("-movflags").output_arg("+faststart")
    }

    /// Truncate output to the shortest input stream.
    pub fn shortest(self) -> Self {
        self.output_arg("-shortest")
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        // Overwrite flag
        if self.overwrite {
            args.push("-y".to_string());
        }

        // Log level
        args.push("-v".to_string());
        args.push(self.log_level.clone());

        // Input args
        args.extend(self.input_args.clone());

        // Input files
        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());
        if let Some(ref second) = self.second_input {
            args.push("-i".to_string());
            args.push(second.to_string_lossy().to_string());
        }

        // Output args
        args.extend(self.output_args.clone());

        // Output file
        args.push(self.output.to_string_lossy().to_string());

        args
    }

    /// Run the command to completion, capturing stderr for diagnostics.
    pub async fn run(&self) -> MediaResult<()> {
        check_ffmpeg()?;

        let args = self.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let output = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(MediaError::ffmpeg_failed(
                "FFmpeg exited with non-zero status",
                Some(tail(&stderr)),
                output.status.code(),
            ))
        }
    }
}

/// Keep the last part of a stderr dump; the useful message is at the end.
fn tail(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.len() <= STDERR_TAIL_BYTES {
        return trimmed.to_string();
    }
    let cut = trimmed.len() - STDERR_TAIL_BYTES;
    let cut = trimmed
        .char_indices()
        .map(|(i, _)| i)
        .find(|&i| i >= cut)
        .unwrap_or(cut);
    trimmed[cut..].to_string()
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Check if FFprobe is available.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder() {
        let cmd = FfmpegCommand::new("input.mp4", "output.mp4")
            .video_filter("select=gt(scene\\,0.35),scale=640:-2")
            .vfr()
            .max_video_frames(8);

        let args = cmd.build_args();
        assert_eq!(args[0], "-y");
        assert!(args.contains(&"-vf".to_string()));
        assert!(args.contains(&"select=gt(scene\\,0.35),scale=640:-2".to_string()));
        assert!(args.contains(&"-vsync".to_string()));
        assert!(args.contains(&"-frames:v".to_string()));
        assert_eq!(args.last().unwrap(), "output.mp4");
    }

    #[test]
    fn test_two_input_ordering() {
        let cmd = FfmpegCommand::new("video.mp4", "out.mp4")
            .second_input("bgm.wav")
            .map("0:v:0")
            .map("1:a:0")
            .video_codec("copy");

        let args = cmd.build_args();
        let first_i = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[first_i + 1], "video.mp4");
        assert_eq!(args[first_i + 2], "-i");
        assert_eq!(args[first_i + 3], "bgm.wav");

        // Output options come after both inputs
        let map_pos = args.iter().position(|a| a == "-map").unwrap();
        assert!(map_pos > first_i + 3);
    }

    #[test]
    fn test_input_args_precede_first_input() {
        let cmd = FfmpegCommand::new("input.mp4", "out.mp4")
            .input_args(["-analyzeduration", "5M", "-probesize", "10M"]);

        let args = cmd.build_args();
        let analyze = args.iter().position(|a| a == "-analyzeduration").unwrap();
        let first_i = args.iter().position(|a| a == "-i").unwrap();
        assert!(analyze < first_i);
    }

    #[test]
    fn test_stderr_tail_keeps_end() {
        let long = format!("{}THE END", "x".repeat(STDERR_TAIL_BYTES * 2));
        let kept = tail(&long);
        assert!(kept.len() <= STDERR_TAIL_BYTES);
        assert!(kept.ends_with("THE END"));
    }
}
