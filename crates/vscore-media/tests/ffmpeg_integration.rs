//! Integration tests that exercise real ffmpeg/ffprobe binaries.
//!
//! Inputs are synthesized with lavfi sources so no media fixtures are
//! checked in. All tests are ignored by default and expect ffmpeg and
//! ffprobe on PATH.

use std::path::Path;
use std::process::Stdio;

use vscore_media::frames::{sample_frames, sample_interval_frames, FrameSampling};
use vscore_media::mux::mux_bgm_into_video;
use vscore_media::probe::probe_video;
use vscore_media::wav::write_wav_mono16;

/// Synthesize a short test video, optionally with a sine audio track.
async fn make_test_video(path: &Path, with_audio: bool) {
    let mut cmd = tokio::process::Command::new("ffmpeg");
    cmd.args(["-y", "-v", "error"])
        .args(["-f", "lavfi", "-i", "testsrc=duration=2:rate=30"]);
    if with_audio {
        cmd.args(["-f", "lavfi", "-i", "sine=frequency=440:duration=2"])
            .args(["-c:a", "aac", "-shortest"]);
    }
    cmd.args(["-c:v", "mpeg4", "-pix_fmt", "yuv420p"]).arg(path);

    let status = cmd
        .stdin(Stdio::null())
        .status()
        .await
        .expect("failed to spawn ffmpeg");
    assert!(status.success(), "test video synthesis failed");
}

/// Synthesize a short static (single color) video with no audio.
async fn make_static_video(path: &Path) {
    let status = tokio::process::Command::new("ffmpeg")
        .args(["-y", "-v", "error"])
        .args(["-f", "lavfi", "-i", "color=c=black:size=320x240:duration=2:rate=30"])
        .args(["-c:v", "mpeg4", "-pix_fmt", "yuv420p"])
        .arg(path)
        .stdin(Stdio::null())
        .status()
        .await
        .expect("failed to spawn ffmpeg");
    assert!(status.success(), "static video synthesis failed");
}

/// Count audio streams the way ffprobe reports them.
async fn count_audio_streams(path: &Path) -> usize {
    let output = tokio::process::Command::new("ffprobe")
        .args(["-v", "error", "-select_streams", "a", "-show_entries", "stream=index", "-of", "csv=p=0"])
        .arg(path)
        .output()
        .await
        .expect("failed to spawn ffprobe");
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .count()
}

#[tokio::test]
#[ignore = "requires ffmpeg"]
async fn test_interval_sampling_bounds_and_order() {
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("in.mp4");
    make_test_video(&video, false).await;

    let frames = sample_interval_frames(&video, 0.5, 3).await.unwrap();
    assert!(!frames.is_empty());
    assert!(frames.len() <= 3);
    for (i, frame) in frames.iter().enumerate() {
        assert_eq!(frame.index, i);
        assert!(frame.width > 0 && frame.height > 0);
        assert!(!frame.data.is_empty());
    }
}

#[tokio::test]
#[ignore = "requires ffmpeg"]
async fn test_short_video_still_yields_a_frame() {
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("short.mp4");
    // 2 seconds sampled every 10 seconds: only frame 0 qualifies.
    make_test_video(&video, false).await;

    let frames = sample_interval_frames(&video, 10.0, 8).await.unwrap();
    assert_eq!(frames.len(), 1);
}

#[tokio::test]
#[ignore = "requires ffmpeg"]
async fn test_static_video_falls_back_to_interval_sampling() {
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("static.mp4");
    make_static_video(&video).await;

    let sampling = FrameSampling {
        max_frames: 8,
        ..Default::default()
    };
    let via_fallback = sample_frames(&video, &sampling).await.unwrap();
    let direct = sample_interval_frames(&video, sampling.fallback_interval, sampling.max_frames)
        .await
        .unwrap();

    assert!(!via_fallback.is_empty());
    assert_eq!(via_fallback, direct);
}

#[tokio::test]
#[ignore = "requires ffmpeg"]
async fn test_mux_adds_track_to_silent_source() {
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("silent.mp4");
    make_test_video(&video, false).await;

    let wav = dir.path().join("bgm.wav");
    write_wav_mono16(&wav, 32_000, &vec![0.2f32; 64_000]).unwrap();

    let output = dir.path().join("out.mp4");
    mux_bgm_into_video(&video, &wav, &output, -4.0).await.unwrap();

    assert!(output.exists());
    assert_eq!(count_audio_streams(&output).await, 1);

    let info = probe_video(&output).await.unwrap();
    assert!(info.has_audio);
    assert!(info.duration > 1.0);
}

#[tokio::test]
#[ignore = "requires ffmpeg"]
async fn test_mux_mixes_with_existing_audio() {
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("with_audio.mp4");
    make_test_video(&video, true).await;

    let wav = dir.path().join("bgm.wav");
    write_wav_mono16(&wav, 32_000, &vec![0.2f32; 64_000]).unwrap();

    let output = dir.path().join("out.mp4");
    mux_bgm_into_video(&video, &wav, &output, 0.0).await.unwrap();

    assert!(output.exists());
    assert_eq!(count_audio_streams(&output).await, 1);
}
