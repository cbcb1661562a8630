//! Exact-duration audio fitting.

/// Fraction of the target duration spent on each edge fade.
pub const EDGE_FADE_FRACTION: f64 = 0.03;

/// Scale factor floor applied during peak normalization.
const NORMALIZE_EPSILON: f32 = 1e-8;

/// Fit a sample buffer to exactly `round(target_seconds * sample_rate)`
/// samples.
///
/// Short buffers are tiled (ceiling-division coverage) then truncated;
/// long buffers are prefix-truncated. The cut is deliberately not
/// beat-aware. Linear edge fades span [`EDGE_FADE_FRACTION`] of the target
/// duration and are skipped entirely when the two ramps would overlap.
/// Degenerate targets (zero or negative length) and empty inputs yield an
/// empty buffer.
pub fn fit_exact_seconds(samples: &[f32], sample_rate: u32, target_seconds: f64) -> Vec<f32> {
    let target_len = (target_seconds * sample_rate as f64).round() as i64;
    if target_len <= 0 || samples.is_empty() {
        return Vec::new();
    }
    let target_len = target_len as usize;

    let mut fitted: Vec<f32> = if samples.len() >= target_len {
        samples[..target_len].to_vec()
    } else {
        let reps = target_len.div_ceil(samples.len());
        let mut tiled = Vec::with_capacity(reps * samples.len());
        for _ in 0..reps {
            tiled.extend_from_slice(samples);
        }
        tiled.truncate(target_len);
        tiled
    };

    apply_edge_fades(&mut fitted);
    fitted
}

/// Scale samples so the absolute peak sits at 1.0.
///
/// Matches the generation service's post-processing contract: divide by
/// (peak + epsilon). Silent buffers stay silent.
pub fn normalize_peak(samples: &mut [f32]) {
    let peak = samples.iter().fold(0.0f32, |max, s| max.max(s.abs()));
    let scale = 1.0 / (peak + NORMALIZE_EPSILON);
    for sample in samples.iter_mut() {
        *sample *= scale;
    }
}

/// Linear fade-in over the first edge window and fade-out over the last.
/// No-op when the windows would overlap or round to zero samples.
fn apply_edge_fades(samples: &mut [f32]) {
    let fade_len = (samples.len() as f64 * EDGE_FADE_FRACTION).round() as usize;
    if fade_len == 0 || samples.len() <= 2 * fade_len {
        return;
    }
    for i in 0..fade_len {
        let gain = i as f32 / fade_len as f32;
        samples[i] *= gain;
        let mirror = samples.len() - 1 - i;
        samples[mirror] *= gain;
    }
}
