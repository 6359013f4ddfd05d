//! Queue state store
//!
//! Phase-segregated containers for the item lifecycle: input queue, the
//! single active slot, completed items (oldest first), and failed items.
//! Promotion and terminal transitions go through `promote_next` /
//! `finish_active`, so a generation in flight can never overlap another.
//! Every mutation wakes waiters so the pipeline and playback loops can
//! re-evaluate their trigger conditions.

use crate::queue::item::{
    ActiveItem, CompletedItem, FailedItem, GenerationOutcome, QueueCounts, QueueItem, QueuedItem,
};
use chrono::Utc;
use jukegen_common::events::QueueEvent;
use jukegen_common::TrackSettings;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{broadcast, Notify, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Default)]
struct Phases {
    queued: VecDeque<QueuedItem>,
    active: Option<ActiveItem>,
    completed: VecDeque<CompletedItem>,
    failed: Vec<FailedItem>,
}

/// Queue store shared by the engine's background tasks
#[derive(Clone)]
pub struct QueueStore {
    phases: Arc<RwLock<Phases>>,
    changed: Arc<Notify>,
    event_tx: broadcast::Sender<QueueEvent>,
}

impl QueueStore {
    pub fn new(event_tx: broadcast::Sender<QueueEvent>) -> Self {
        Self {
            phases: Arc::new(RwLock::new(Phases::default())),
            changed: Arc::new(Notify::new()),
            event_tx,
        }
    }

    /// Wait for the next state mutation
    pub async fn changed(&self) {
        self.changed.notified().await;
    }

    fn publish(&self, event: QueueEvent) {
        // Ignore send errors (no receivers is OK)
        let _ = self.event_tx.send(event);
        self.changed.notify_waiters();
    }

    /// Create an item from a settings snapshot and append it to the input
    /// queue. Returns the created item.
    pub async fn add_item(&self, settings: &TrackSettings) -> QueuedItem {
        let item = QueuedItem {
            id: Uuid::new_v4(),
            settings: settings.clone(),
        };

        {
            let mut phases = self.phases.write().await;
            phases.queued.push_back(item.clone());
        }

        debug!("Enqueued item {} ({})", item.id, item.settings.caption);
        self.publish(QueueEvent::ItemQueued {
            item_id: item.id,
            caption: item.settings.caption.clone(),
            timestamp: Utc::now(),
        });

        item
    }

    /// Remove the item with this id from whichever phase holds it,
    /// including the active slot. No-op (returns false) when absent.
    pub async fn remove_item(&self, id: Uuid) -> bool {
        let removed = {
            let mut phases = self.phases.write().await;

            if let Some(pos) = phases.queued.iter().position(|i| i.id == id) {
                let _ = phases.queued.remove(pos);
                true
            } else if phases.active.as_ref().is_some_and(|i| i.id == id) {
                phases.active = None;
                true
            } else if let Some(pos) = phases.completed.iter().position(|i| i.id == id) {
                let _ = phases.completed.remove(pos);
                true
            } else if let Some(pos) = phases.failed.iter().position(|i| i.id == id) {
                let _ = phases.failed.remove(pos);
                true
            } else {
                false
            }
        };

        if removed {
            debug!("Removed item {}", id);
            self.publish(QueueEvent::ItemRemoved {
                item_id: id,
                timestamp: Utc::now(),
            });
        }

        removed
    }

    /// Drop the oldest completed item
    pub async fn skip(&self) -> Option<Uuid> {
        let skipped = {
            let mut phases = self.phases.write().await;
            phases.completed.pop_front()
        };

        let id = skipped.map(|item| item.id)?;
        info!("Skipped item {}", id);
        self.publish(QueueEvent::ItemRemoved {
            item_id: id,
            timestamp: Utc::now(),
        });
        Some(id)
    }

    /// Drop all completed items, returning how many were dropped
    pub async fn clear_completed(&self) -> usize {
        let cleared = {
            let mut phases = self.phases.write().await;
            let n = phases.completed.len();
            phases.completed.clear();
            n
        };

        if cleared > 0 {
            info!("Cleared {} completed items", cleared);
            self.publish(QueueEvent::QueueCleared {
                timestamp: Utc::now(),
            });
        }

        cleared
    }

    /// Drop everything, including the active slot. A generation in flight
    /// finishes against an empty slot and its result is discarded.
    pub async fn clear_all(&self) {
        {
            let mut phases = self.phases.write().await;
            phases.queued.clear();
            phases.active = None;
            phases.completed.clear();
            phases.failed.clear();
        }

        info!("Cleared queue");
        self.publish(QueueEvent::QueueCleared {
            timestamp: Utc::now(),
        });
    }

    /// Move the head of the input queue into the active slot.
    ///
    /// Returns `None` when the slot is occupied or nothing is queued; this
    /// is the single-active-item gate.
    pub async fn promote_next(&self) -> Option<ActiveItem> {
        let active = {
            let mut phases = self.phases.write().await;
            if phases.active.is_some() {
                return None;
            }
            let next = phases.queued.pop_front()?;
            let active = ActiveItem {
                id: next.id,
                settings: next.settings,
                progress: None,
            };
            phases.active = Some(active.clone());
            active
        };

        info!("Promoted item {} into the active slot", active.id);
        self.publish(QueueEvent::GenerationStarted {
            item_id: active.id,
            timestamp: Utc::now(),
        });

        Some(active)
    }

    /// Update the active item's progress text
    pub async fn set_progress(&self, id: Uuid, progress: String) {
        {
            let mut phases = self.phases.write().await;
            match phases.active.as_mut() {
                Some(active) if active.id == id => {
                    active.progress = Some(progress.clone());
                }
                _ => return, // item was removed mid-generation
            }
        }

        self.publish(QueueEvent::GenerationProgress {
            item_id: id,
            progress,
            timestamp: Utc::now(),
        });
    }

    /// Park the active item as completed or failed and release the slot.
    ///
    /// If the item was removed while generating, the outcome is discarded;
    /// the slot is free either way.
    pub async fn finish_active(&self, id: Uuid, outcome: GenerationOutcome) {
        let event = {
            let mut phases = self.phases.write().await;
            let active = match phases.active.take() {
                Some(item) if item.id == id => item,
                other => {
                    phases.active = other;
                    debug!("Item {} no longer active; discarding its result", id);
                    return;
                }
            };

            match outcome {
                GenerationOutcome::Completed(audio) => {
                    phases.completed.push_back(CompletedItem {
                        id: active.id,
                        caption: active.settings.caption,
                        duration: active.settings.duration,
                        bpm: active.settings.bpm,
                        key: active.settings.key,
                        genre: active.settings.genre,
                        audio,
                    });
                    info!("Item {} completed", id);
                    QueueEvent::ItemCompleted {
                        item_id: id,
                        timestamp: Utc::now(),
                    }
                }
                GenerationOutcome::Failed(reason) => {
                    phases.failed.push(FailedItem {
                        id: active.id,
                        caption: active.settings.caption,
                        error: reason.clone(),
                    });
                    warn!("Item {} failed: {}", id, reason);
                    QueueEvent::ItemFailed {
                        item_id: id,
                        reason,
                        timestamp: Utc::now(),
                    }
                }
            }
        };

        self.publish(event);
    }

    /// Per-phase counts
    pub async fn counts(&self) -> QueueCounts {
        let phases = self.phases.read().await;
        QueueCounts {
            queued: phases.queued.len(),
            generating: usize::from(phases.active.is_some()),
            completed: phases.completed.len(),
            failed: phases.failed.len(),
        }
    }

    /// Total items across all phases
    pub async fn len(&self) -> usize {
        self.counts().await.total()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Whether the queue has reached the target size. Failed items keep
    /// occupying capacity until removed.
    pub async fn is_full(&self, target: usize) -> bool {
        self.len().await >= target
    }

    /// Oldest completed item, if any
    pub async fn now_playing(&self) -> Option<CompletedItem> {
        self.phases.read().await.completed.front().cloned()
    }

    /// Ordered snapshot: completed, then active, then queued, then failed
    pub async fn snapshot(&self) -> Vec<QueueItem> {
        let phases = self.phases.read().await;
        let mut items = Vec::with_capacity(
            phases.completed.len()
                + usize::from(phases.active.is_some())
                + phases.queued.len()
                + phases.failed.len(),
        );
        items.extend(phases.completed.iter().cloned().map(QueueItem::Completed));
        items.extend(phases.active.iter().cloned().map(QueueItem::Generating));
        items.extend(phases.queued.iter().cloned().map(QueueItem::Queued));
        items.extend(phases.failed.iter().cloned().map(QueueItem::Failed));
        items
    }
}
