//! Sidecar request/response types.

use serde::{Deserialize, Serialize};
use vscore_models::GenerateConfig;

/// Request for frame captioning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionRequest {
    /// Base64-encoded JPEG frames, in sampling order.
    pub images: Vec<String>,
}

/// Captioning response, order-correlated with the request frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionResponse {
    pub captions: Vec<String>,
}

/// Request for music generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Generation prompt.
    pub prompt: String,
    /// Scalar generation parameters, flattened onto the wire.
    #[serde(flatten)]
    pub config: GenerateConfig,
}

/// Generation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Sample rate of the returned audio.
    pub sample_rate: u32,
    /// Base64-encoded little-endian f32 PCM.
    pub audio_b64: String,
}

/// Health endpoint response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_flattens_config() {
        let request = GenerateRequest {
            prompt: "bright track".to_string(),
            config: GenerateConfig {
                seconds: 12,
                seed: Some(99),
                ..Default::default()
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["prompt"], "bright track");
        assert_eq!(json["seconds"], 12);
        assert_eq!(json["seed"], 99);
        assert!(json.get("config").is_none());
    }
}
