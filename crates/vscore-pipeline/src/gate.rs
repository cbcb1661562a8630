//! Run admission control.
//!
//! Scoring is heavy: one run owns the GPU-backed sidecar at a time. The
//! gate lets a bounded number of runs wait for their turn and rejects the
//! rest immediately so callers see backpressure instead of unbounded
//! latency.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::{PipelineError, PipelineResult};

/// Admission gate: one active run plus a bounded wait queue.
pub struct PipelineGate {
    /// One permit per admitted run (active or waiting).
    slots: Arc<Semaphore>,
    /// Single permit held by the active run.
    running: Arc<Semaphore>,
    queue_depth: usize,
}

/// Held for the duration of a run; dropping it releases both the run slot
/// and the queue slot.
#[derive(Debug)]
pub struct GatePermit {
    _running: OwnedSemaphorePermit,
    _slot: OwnedSemaphorePermit,
}

impl PipelineGate {
    /// Create a gate admitting one active run and `queue_depth` waiters.
    pub fn new(queue_depth: usize) -> Self {
        Self {
            slots: Arc::new(Semaphore::new(queue_depth + 1)),
            running: Arc::new(Semaphore::new(1)),
            queue_depth,
        }
    }

    /// Admit a run, waiting for the active one to finish when queued.
    ///
    /// Fails with [`PipelineError::Busy`] when one run is active and the
    /// wait queue is already full.
    pub async fn admit(&self) -> PipelineResult<GatePermit> {
        let slot = Arc::clone(&self.slots)
            .try_acquire_owned()
            .map_err(|_| PipelineError::Busy {
                queue_depth: self.queue_depth,
            })?;

        // Neither semaphore is ever closed, so this only waits.
        let running = Arc::clone(&self.running)
            .acquire_owned()
            .await
            .map_err(|_| PipelineError::Busy {
                queue_depth: self.queue_depth,
            })?;

        Ok(GatePermit {
            _running: running,
            _slot: slot,
        })
    }

    /// Configured wait-queue capacity.
    pub fn queue_depth(&self) -> usize {
        self.queue_depth
    }

    /// Runs currently admitted, active plus waiting.
    pub fn admitted(&self) -> usize {
        self.queue_depth + 1 - self.slots.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_zero_depth_rejects_second_run() {
        let gate = PipelineGate::new(0);

        let first = gate.admit().await.unwrap();
        let err = gate.admit().await.unwrap_err();
        assert!(err.is_busy());

        drop(first);
        gate.admit().await.unwrap();
    }

    #[tokio::test]
    async fn test_queued_run_starts_when_active_finishes() {
        let gate = Arc::new(PipelineGate::new(1));

        let first = gate.admit().await.unwrap();

        let queued = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move { gate.admit().await.map(|_| ()) })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!queued.is_finished());
        assert_eq!(gate.admitted(), 2);

        // Queue full: active run plus one waiter.
        assert!(gate.admit().await.unwrap_err().is_busy());

        drop(first);
        queued.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_admitted_count_tracks_permits() {
        let gate = PipelineGate::new(2);
        assert_eq!(gate.admitted(), 0);

        let permit = gate.admit().await.unwrap();
        assert_eq!(gate.admitted(), 1);

        drop(permit);
        assert_eq!(gate.admitted(), 0);
    }
}
