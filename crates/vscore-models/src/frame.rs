//! Sampled video frames.

use std::fmt;

/// A single still frame extracted from a video.
///
/// Holds the encoded JPEG bytes as produced by the extraction step, plus
/// the frame's ordinal position in the sampled sequence and its pixel
/// dimensions. Frames are created by the sampler, handed to the caption
/// service, and discarded; they are never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    /// Ordinal position in the sampled sequence (0-based).
    pub index: usize,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Encoded JPEG bytes.
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(index: usize, width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            index,
            width,
            height,
            data,
        }
    }
}

// Manual Debug: the raw JPEG payload is useless in logs.
impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("index", &self.index)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}
