//! Model collaborators and shared warm-up state.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use vscore_ml_client::{CaptionService, MlClient, MlError, MusicService};

use crate::error::PipelineResult;

/// The two model seams plus process-wide warm-up state.
///
/// Warm-up succeeds at most once; a failed attempt leaves the cell empty
/// so the next run retries instead of staying cold forever.
pub struct ModelServices {
    caption: Arc<dyn CaptionService>,
    music: Arc<dyn MusicService>,
    ready: OnceCell<()>,
}

impl ModelServices {
    /// Create services from explicit caption and music implementations.
    pub fn new(caption: Arc<dyn CaptionService>, music: Arc<dyn MusicService>) -> Self {
        Self {
            caption,
            music,
            ready: OnceCell::new(),
        }
    }

    /// Back both seams with one HTTP client to the model sidecar.
    pub fn from_client(client: Arc<MlClient>) -> Self {
        Self::new(Arc::clone(&client) as _, client)
    }

    /// The captioning seam.
    pub fn caption(&self) -> &dyn CaptionService {
        self.caption.as_ref()
    }

    /// The music generation seam.
    pub fn music(&self) -> &dyn MusicService {
        self.music.as_ref()
    }

    /// Warm both models, once per process.
    ///
    /// Concurrent callers share a single warm-up attempt.
    pub async fn ensure_ready(&self) -> PipelineResult<()> {
        self.ready
            .get_or_try_init(|| async {
                info!("Warming model services");
                self.caption.warm_up().await?;
                self.music.warm_up().await?;
                Ok::<_, MlError>(())
            })
            .await?;
        Ok(())
    }

    /// Start warm-up in the background without blocking the caller.
    pub fn spawn_warmup(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let services = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = services.ensure_ready().await {
                warn!(error = %err, "Background warm-up failed, first run will retry");
            }
        })
    }
}
