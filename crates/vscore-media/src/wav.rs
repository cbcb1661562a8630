//! WAV serialization for generated audio.

use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::Path;

use crate::error::MediaResult;

/// Write mono 16-bit signed PCM.
///
/// Samples are clipped to [-1, 1] and scaled by 32767 before integer
/// conversion. Parent directories are created as needed.
pub fn write_wav_mono16(
    path: impl AsRef<Path>,
    sample_rate: u32,
    samples: &[f32],
) -> MediaResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        let clipped = sample.clamp(-1.0, 1.0);
        writer.write_sample((clipped * 32767.0) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}
