//! Service traits for the opaque model collaborators.
//!
//! The pipeline depends on these seams, not on the HTTP client, so tests
//! can inject doubles returning canned captions and audio.

use async_trait::async_trait;

use vscore_models::{AudioBuffer, Frame, GenerateConfig};

use crate::error::MlResult;

/// Vision-language captioning.
#[async_trait]
pub trait CaptionService: Send + Sync {
    /// Load model weights ahead of first use. Must be idempotent.
    async fn warm_up(&self) -> MlResult<()> {
        Ok(())
    }

    /// Describe each frame. Returns one caption per frame, order-correlated
    /// with the input.
    async fn caption(&self, frames: &[Frame]) -> MlResult<Vec<String>>;
}

/// Text-to-music generation.
#[async_trait]
pub trait MusicService: Send + Sync {
    /// Load model weights ahead of first use. Must be idempotent.
    async fn warm_up(&self) -> MlResult<()> {
        Ok(())
    }

    /// Generate audio for a prompt at the service's fixed sample rate.
    async fn generate(&self, prompt: &str, config: &GenerateConfig) -> MlResult<AudioBuffer>;
}
