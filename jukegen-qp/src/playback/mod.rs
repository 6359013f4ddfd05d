//! Playback of completed queue items
//!
//! Watches the oldest completed item and plays it through an [`AudioSink`].
//! One session at a time; the item is removed when playback ends, whether
//! it ended naturally or with an error — playback failures drop the item
//! silently instead of marking it failed.

pub mod output;

pub use output::RodioSink;

use crate::error::Result;
use crate::queue::QueueStore;
use crate::remote::AudioPayload;
use crate::state::SharedState;
use async_trait::async_trait;
use chrono::Utc;
use jukegen_common::events::QueueEvent;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Where decoded audio goes. Implementations block until playback ends.
#[async_trait]
pub trait AudioSink: Send + Sync {
    /// Play one payload to completion
    async fn play(&self, audio: AudioPayload) -> Result<()>;
}

/// Plays completed items oldest-first, removing each when done
pub struct PlaybackController {
    store: QueueStore,
    state: Arc<SharedState>,
    sink: Arc<dyn AudioSink>,
    idle_recheck: Duration,
}

impl PlaybackController {
    pub fn new(
        store: QueueStore,
        state: Arc<SharedState>,
        sink: Arc<dyn AudioSink>,
        idle_recheck: Duration,
    ) -> Self {
        Self {
            store,
            state,
            sink,
            idle_recheck,
        }
    }

    /// Spawn the playback loop as a background task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    async fn run(self) {
        info!("Playback controller started");
        let mut tick = tokio::time::interval(self.idle_recheck);

        loop {
            if let Some(item) = self.store.now_playing().await {
                self.state.broadcast_event(QueueEvent::PlaybackStarted {
                    item_id: item.id,
                    caption: item.caption.clone(),
                    timestamp: Utc::now(),
                });
                info!("Playing item {} ({})", item.id, item.caption);

                match self.sink.play(item.audio.clone()).await {
                    Ok(()) => info!("Playback finished for item {}", item.id),
                    // Playback errors drop the item without a failed record
                    Err(e) => warn!("Playback error for item {}: {}", item.id, e),
                }

                self.store.remove_item(item.id).await;
                self.state.broadcast_event(QueueEvent::PlaybackFinished {
                    item_id: item.id,
                    timestamp: Utc::now(),
                });

                // Check immediately for the next completed item
                continue;
            }

            tokio::select! {
                _ = self.store.changed() => {}
                _ = tick.tick() => {}
            }
        }
    }
}
