//! Request coalescing in front of an orchestrator
//!
//! Callers may fire requests faster than loads complete. Only the most
//! recent request matters: while a load is in flight, newer requests replace
//! each other in a single pending slot and the running caller picks the
//! survivor up once its own cycle is done.

use super::orchestrator::{AvatarOrchestrator, AvatarRequest, LoadReport};
use super::AvatarResult;
use crate::assets::AssetLoader;
use crate::scene::AvatarScene;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

pub struct AvatarSlot<S: AvatarScene, L: AssetLoader> {
    orchestrator: Mutex<AvatarOrchestrator<S, L>>,
    pending: Mutex<Option<AvatarRequest>>,
    superseded: AtomicU64,
}

impl<S: AvatarScene, L: AssetLoader> AvatarSlot<S, L> {
    pub fn new(orchestrator: AvatarOrchestrator<S, L>) -> Self {
        Self {
            orchestrator: Mutex::new(orchestrator),
            pending: Mutex::new(None),
            superseded: AtomicU64::new(0),
        }
    }

    /// Queue `request` and drive loads until nothing is pending.
    ///
    /// Returns the report of the last cycle this caller ran, or `None` when
    /// another caller was already loading and will pick the request up.
    pub async fn submit(&self, request: AvatarRequest) -> AvatarResult<Option<LoadReport>> {
        {
            let mut pending = self.pending.lock().await;
            if pending.replace(request).is_some() {
                self.superseded.fetch_add(1, Ordering::Relaxed);
                debug!("⏭️ Pending avatar request superseded");
            }
        }
        self.drain().await
    }

    /// Run whatever request is pending.
    ///
    /// A failed cycle does not stop the loop: a request queued behind it still
    /// runs, and the error only surfaces when it belongs to the last cycle.
    pub async fn drain(&self) -> AvatarResult<Option<LoadReport>> {
        let mut last = None;
        let mut failure = None;
        loop {
            let Ok(mut orchestrator) = self.orchestrator.try_lock() else {
                debug!("Load in flight, request left pending");
                break;
            };

            loop {
                let next = self.pending.lock().await.take();
                let Some(request) = next else {
                    break;
                };
                match orchestrator.load_avatar(request).await {
                    Ok(report) => {
                        last = Some(report);
                        failure = None;
                    }
                    Err(e) => {
                        warn!("❌ Avatar cycle failed: {}", e);
                        last = None;
                        failure = Some(e);
                    }
                }
            }
            drop(orchestrator);

            // A request may have landed between the last take and the unlock
            if self.pending.lock().await.is_none() {
                break;
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(last),
        }
    }

    /// Requests replaced before they ever ran
    pub fn superseded(&self) -> u64 {
        self.superseded.load(Ordering::Relaxed)
    }

    pub async fn has_pending(&self) -> bool {
        self.pending.lock().await.is_some()
    }

    /// Exclusive access to the orchestrator, waiting for any running load
    pub async fn lock(&self) -> MutexGuard<'_, AvatarOrchestrator<S, L>> {
        self.orchestrator.lock().await
    }
}
