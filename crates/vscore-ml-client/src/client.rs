//! Sidecar HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};

use vscore_models::{AudioBuffer, Frame, GenerateConfig};

use crate::error::{MlError, MlResult};
use crate::service::{CaptionService, MusicService};
use crate::types::{
    CaptionRequest, CaptionResponse, GenerateRequest, GenerateResponse, HealthResponse,
};

/// Configuration for the sidecar client.
#[derive(Debug, Clone)]
pub struct MlClientConfig {
    /// Base URL of the sidecar
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Max retries
    pub max_retries: u32,
}

impl Default for MlClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8801".to_string(),
            timeout: Duration::from_secs(300), // generation runs to completion
            max_retries: 2,
        }
    }
}

impl MlClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("ML_SERVICE_URL").unwrap_or(defaults.base_url),
            timeout: Duration::from_secs(
                std::env::var("ML_SERVICE_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.timeout.as_secs()),
            ),
            max_retries: std::env::var("ML_SERVICE_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_retries),
        }
    }
}

/// Client for the captioning and music-generation sidecar.
pub struct MlClient {
    http: Client,
    config: MlClientConfig,
}

impl MlClient {
    /// Create a new client.
    pub fn new(config: MlClientConfig) -> MlResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(MlError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> MlResult<Self> {
        Self::new(MlClientConfig::from_env())
    }

    /// Check if the sidecar is healthy.
    pub async fn health_check(&self) -> MlResult<bool> {
        let url = format!("{}/health", self.config.base_url);

        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                let health: HealthResponse = response.json().await?;
                Ok(health.status == "healthy" || health.status == "ok")
            }
            Ok(response) => {
                warn!("Sidecar health check failed: {}", response.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Sidecar health check error: {}", e);
                Ok(false)
            }
        }
    }

    /// Ask the sidecar to load model weights. Idempotent on the service
    /// side; safe to call more than once.
    pub async fn warm_up_models(&self) -> MlResult<()> {
        let url = format!("{}/warmup", self.config.base_url);
        debug!("Warming up sidecar models at {}", url);

        let response = self.post_json(&url, &serde_json::json!({})).await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MlError::RequestFailed(format!(
                "warmup returned {}: {}",
                status, body
            )));
        }
        Ok(())
    }

    /// Caption a batch of frames.
    pub async fn caption_frames(&self, frames: &[Frame]) -> MlResult<Vec<String>> {
        let url = format!("{}/caption", self.config.base_url);
        debug!("Sending {} frames for captioning to {}", frames.len(), url);

        let request = CaptionRequest {
            images: frames.iter().map(|f| BASE64.encode(&f.data)).collect(),
        };

        let response = self.post_json(&url, &request).await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MlError::RequestFailed(format!(
                "caption returned {}: {}",
                status, body
            )));
        }

        let parsed: CaptionResponse = response.json().await?;
        if parsed.captions.len() != frames.len() {
            return Err(MlError::InvalidResponse(format!(
                "expected {} captions, got {}",
                frames.len(),
                parsed.captions.len()
            )));
        }
        Ok(parsed.captions)
    }

    /// Generate audio for a prompt.
    pub async fn generate_audio(
        &self,
        prompt: &str,
        config: &GenerateConfig,
    ) -> MlResult<AudioBuffer> {
        let url = format!("{}/generate", self.config.base_url);
        debug!(
            seconds = config.seconds,
            "Sending generation request to {}", url
        );

        let request = GenerateRequest {
            prompt: prompt.to_string(),
            config: config.clone(),
        };

        let response = self.post_json(&url, &request).await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MlError::RequestFailed(format!(
                "generate returned {}: {}",
                status, body
            )));
        }

        let parsed: GenerateResponse = response.json().await?;
        if parsed.sample_rate == 0 {
            return Err(MlError::InvalidResponse(
                "generation returned a zero sample rate".to_string(),
            ));
        }

        let bytes = BASE64
            .decode(parsed.audio_b64.as_bytes())
            .map_err(|e| MlError::InvalidResponse(format!("audio payload is not base64: {e}")))?;
        let samples = decode_pcm_f32le(&bytes)?;
        if samples.is_empty() {
            return Err(MlError::InvalidResponse(
                "generation returned no audio samples".to_string(),
            ));
        }

        Ok(AudioBuffer::new(parsed.sample_rate, samples))
    }

    /// POST with retry; gateway-style statuses count as retryable outages.
    async fn post_json<B: Serialize>(&self, url: &str, body: &B) -> MlResult<reqwest::Response> {
        self.with_retry(|| async {
            let response = self
                .http
                .post(url)
                .json(body)
                .send()
                .await
                .map_err(MlError::Network)?;

            let status = response.status();
            if matches!(
                status,
                StatusCode::SERVICE_UNAVAILABLE
                    | StatusCode::BAD_GATEWAY
                    | StatusCode::GATEWAY_TIMEOUT
            ) {
                return Err(MlError::ServiceUnavailable(format!(
                    "{url} returned {status}"
                )));
            }
            Ok(response)
        })
        .await
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> MlResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = MlResult<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                    warn!(
                        "Sidecar request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| MlError::RequestFailed("Unknown error".to_string())))
    }
}

#[async_trait]
impl CaptionService for MlClient {
    async fn warm_up(&self) -> MlResult<()> {
        self.warm_up_models().await
    }

    async fn caption(&self, frames: &[Frame]) -> MlResult<Vec<String>> {
        self.caption_frames(frames).await
    }
}

#[async_trait]
impl MusicService for MlClient {
    async fn warm_up(&self) -> MlResult<()> {
        self.warm_up_models().await
    }

    async fn generate(&self, prompt: &str, config: &GenerateConfig) -> MlResult<AudioBuffer> {
        self.generate_audio(prompt, config).await
    }
}

/// Decode little-endian f32 PCM bytes.
fn decode_pcm_f32le(bytes: &[u8]) -> MlResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(MlError::InvalidResponse(format!(
            "PCM byte length {} is not a multiple of 4",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = MlClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8801");
        assert_eq!(config.timeout, Duration::from_secs(300));
        assert_eq!(config.max_retries, 2);
    }

    #[test]
    fn test_decode_pcm_round_trip() {
        let samples = [0.0f32, 0.5, -0.25, 1.0];
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        let decoded = decode_pcm_f32le(&bytes).unwrap();
        assert_eq!(decoded, samples);
    }

    #[test]
    fn test_decode_pcm_rejects_truncated_payload() {
        let err = decode_pcm_f32le(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, MlError::InvalidResponse(_)));
    }
}
