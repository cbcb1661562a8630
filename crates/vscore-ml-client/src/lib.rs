//! Client for the model sidecar (frame captioning + music generation).
//!
//! The sidecar hosts both pretrained models behind a small HTTP surface.
//! This crate provides the typed client plus the [`CaptionService`] and
//! [`MusicService`] seams the pipeline is written against.

pub mod client;
pub mod error;
pub mod service;
pub mod types;

pub use client::{MlClient, MlClientConfig};
pub use error::{MlError, MlResult};
pub use service::{CaptionService, MusicService};
pub use types::{CaptionRequest, CaptionResponse, GenerateRequest, GenerateResponse};
