//! Mux generated audio into the source video.

use std::path::Path;
use tracing::info;

use crate::command::{check_ffmpeg, FfmpegCommand};
use crate::error::MediaResult;
use crate::filters::{
    build_gain_filter, build_mix_filter, MIX_AUDIO_BITRATE, MIX_OUTPUT_LABEL, MIX_SAMPLE_RATE,
};
use crate::probe::probe_video;

/// Combine the source video with the generated WAV track.
///
/// When the source carries audio, both streams are mixed (gain applied to
/// the generated track only); otherwise the generated track becomes the
/// sole audio stream. The video stream is copied unmodified; audio is
/// encoded to AAC at a fixed bitrate and sample rate, with faststart
/// enabled and output truncated to the shorter stream.
pub async fn mux_bgm_into_video(
    video: impl AsRef<Path>,
    wav: impl AsRef<Path>,
    output: impl AsRef<Path>,
    bgm_gain_db: f32,
) -> MediaResult<()> {
    let video = video.as_ref();
    let wav = wav.as_ref();
    let output = output.as_ref();

    check_ffmpeg()?;
    let info = probe_video(video).await?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    info!(
        video = %video.display(),
        output = %output.display(),
        source_has_audio = info.has_audio,
        "Muxing generated track into video"
    );

    build_mux_command(video, wav, output, bgm_gain_db, info.has_audio)
        .run()
        .await
}

/// Assemble the mux invocation for a source with or without audio.
fn build_mux_command(
    video: &Path,
    wav: &Path,
    output: &Path,
    bgm_gain_db: f32,
    source_has_audio: bool,
) -> FfmpegCommand {
    let cmd = FfmpegCommand::new(video, output).second_input(wav);

    let cmd = if source_has_audio {
        cmd.filter_complex(build_mix_filter(bgm_gain_db))
            .map("0:v:0")
            .map(MIX_OUTPUT_LABEL)
    } else {
        cmd.map("0:v:0")
            .map("1:a:0")
            .output_arg("-filter:a:0")
            .output_arg(build_gain_filter(bgm_gain_db))
    };

    cmd.video_codec("copy")
        .audio_codec("aac")
        .audio_bitrate(MIX_AUDIO_BITRATE)
        .audio_sample_rate(MIX_SAMPLE_RATE)
        .faststart()
        .shortest()
}
