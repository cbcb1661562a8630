//! Generated audio buffers.

use std::fmt;

/// Sample rate of audio produced by the music-generation service, in Hz.
pub const GENERATION_SAMPLE_RATE: u32 = 32_000;

/// A 1-D buffer of mono f32 samples at a known sample rate.
///
/// Samples are expected to lie in [-1, 1] after peak normalization. Produced
/// by the generation service, transformed by the fitter, serialized as WAV.
#[derive(Clone, PartialEq)]
pub struct AudioBuffer {
    pub sample_rate: u32,
    pub samples: Vec<f32>,
}

impl AudioBuffer {
    pub fn new(sample_rate: u32, samples: Vec<f32>) -> Self {
        Self {
            sample_rate,
            samples,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration of the buffer in seconds.
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

// Manual Debug: hundreds of thousands of samples do not belong in logs.
impl fmt::Debug for AudioBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioBuffer")
            .field("sample_rate", &self.sample_rate)
            .field("samples", &self.samples.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_seconds() {
        let buf = AudioBuffer::new(GENERATION_SAMPLE_RATE, vec![0.0; 320_000]);
        assert!((buf.duration_seconds() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_rate_is_safe() {
        let buf = AudioBuffer::new(0, vec![0.0; 100]);
        assert_eq!(buf.duration_seconds(), 0.0);
    }

    #[test]
    fn test_empty() {
        let buf = AudioBuffer::new(GENERATION_SAMPLE_RATE, Vec::new());
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
    }
}
