//! Background workers: the import queue consumer and the cache sweeper.
//!
//! Search never waits on either. Results found only in the external source
//! are queued here and persisted to the catalog out of band.

use crate::cache::SearchCache;
use crate::catalog::{Catalog, CatalogRecord};
use crate::error::ImportError;
use crate::types::{GameCandidate, QualitySignals};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

/// Import urgency, derived from quality signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ImportPriority {
    Low,
    Normal,
    High,
}

impl ImportPriority {
    pub fn from_quality(quality: &QualitySignals) -> Self {
        if quality.is_strong() {
            Self::High
        } else if quality.rating_count > 0 || quality.follows > 100 {
            Self::Normal
        } else {
            Self::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportRequest {
    pub game: GameCandidate,
    pub priority: ImportPriority,
}

impl ImportRequest {
    pub fn new(game: GameCandidate) -> Self {
        let priority = ImportPriority::from_quality(&game.quality);
        Self { game, priority }
    }
}

/// Sending half of the import channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ImportQueue {
    sender: mpsc::Sender<ImportRequest>,
}

impl ImportQueue {
    /// Creates a queue and the receiver its worker drains.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ImportRequest>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Queues a request without waiting.
    pub fn enqueue(&self, request: ImportRequest) -> Result<(), ImportError> {
        self.sender.try_send(request).map_err(|e| match e {
            TrySendError::Full(_) => ImportError::QueueFull,
            TrySendError::Closed(_) => ImportError::QueueClosed,
        })
    }
}

/// Persists queued external games into the catalog.
pub struct ImportWorker {
    catalog: Arc<dyn Catalog>,
    receiver: mpsc::Receiver<ImportRequest>,
    batch_size: usize,
}

impl ImportWorker {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        receiver: mpsc::Receiver<ImportRequest>,
        batch_size: usize,
    ) -> Self {
        Self {
            catalog,
            receiver,
            batch_size: batch_size.max(1),
        }
    }

    /// Drains batches until the channel closes or the token is cancelled.
    pub async fn run(mut self, token: CancellationToken) {
        tracing::info!("Import worker started");
        let mut batch = Vec::with_capacity(self.batch_size);

        loop {
            let received = tokio::select! {
                () = token.cancelled() => break,
                n = self.receiver.recv_many(&mut batch, self.batch_size) => n,
            };
            if received == 0 {
                break;
            }

            self.process_batch(&mut batch).await;
            batch.clear();
            tokio::task::yield_now().await;
        }

        tracing::info!("Import worker stopped");
    }

    /// Imports one batch, highest priority first. Returns how many were inserted.
    pub async fn process_batch(&self, batch: &mut [ImportRequest]) -> usize {
        batch.sort_by(|a, b| b.priority.cmp(&a.priority));

        let mut inserted = 0;
        for request in batch.iter() {
            let game = &request.game;
            if game.is_stored() {
                continue;
            }

            if let Some(id) = game.external_id {
                match self.catalog.get_by_external_id(id).await {
                    Ok(Some(_)) => {
                        tracing::trace!("Skipping import of '{}': already stored", game.name);
                        continue;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!("Import lookup failed for '{}': {}", game.name, e);
                        continue;
                    }
                }
            }

            match self.catalog.insert(CatalogRecord::from(game)).await {
                Ok(local_id) => {
                    inserted += 1;
                    tracing::debug!(
                        "Imported '{}' as #{} ({:?} priority)",
                        game.name,
                        local_id,
                        request.priority
                    );
                }
                Err(e) => tracing::warn!("Import of '{}' failed: {}", game.name, e),
            }
        }
        inserted
    }
}

/// Spawns the import worker as a tokio task.
pub fn spawn_import_worker(
    catalog: Arc<dyn Catalog>,
    receiver: mpsc::Receiver<ImportRequest>,
    batch_size: usize,
    token: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(ImportWorker::new(catalog, receiver, batch_size).run(token))
}

/// Spawns a task that sweeps expired cache entries every `every` until cancelled.
pub fn spawn_cache_sweeper(
    cache: Arc<SearchCache>,
    every: Duration,
    token: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                () = token.cancelled() => break,
                _ = ticker.tick() => {
                    let removed = cache.sweep();
                    if removed > 0 {
                        tracing::debug!("Swept {} expired cache entries", removed);
                    }
                }
            }
        }
    })
}
