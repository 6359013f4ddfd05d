//! Shared service state
//!
//! Thread-safe shared state for the engine's background tasks: the settings
//! template new items are stamped from, the queue target size, and the
//! event broadcast channel.

use jukegen_common::events::QueueEvent;
use jukegen_common::TrackSettings;
use tokio::sync::{broadcast, RwLock};

/// Default number of items the auto-adder fills the queue up to
pub const DEFAULT_TARGET_SIZE: usize = 3;

/// Shared state accessible by all components
///
/// Uses RwLock for concurrent read access with rare writes. Settings edits
/// apply only to items created afterwards; items already in the queue keep
/// the snapshot they were created with.
pub struct SharedState {
    /// Template for new queue items
    settings: RwLock<TrackSettings>,

    /// Queue size the auto-adder tops up to
    target_size: RwLock<usize>,

    /// Event broadcaster for lifecycle events
    event_tx: broadcast::Sender<QueueEvent>,
}

impl SharedState {
    /// Create shared state with the given settings template and target size
    pub fn new(settings: TrackSettings, target_size: usize) -> Self {
        let (event_tx, _) = broadcast::channel(100); // Buffer up to 100 events
        Self {
            settings: RwLock::new(settings),
            target_size: RwLock::new(target_size),
            event_tx,
        }
    }

    /// Broadcast an event to all listeners
    pub fn broadcast_event(&self, event: QueueEvent) {
        // Ignore send errors (no receivers is OK)
        let _ = self.event_tx.send(event);
    }

    /// Subscribe to the lifecycle event stream
    pub fn subscribe_events(&self) -> broadcast::Receiver<QueueEvent> {
        self.event_tx.subscribe()
    }

    /// Clone the event sender for components that broadcast directly
    pub fn event_sender(&self) -> broadcast::Sender<QueueEvent> {
        self.event_tx.clone()
    }

    /// Snapshot of the current settings template
    pub async fn settings(&self) -> TrackSettings {
        self.settings.read().await.clone()
    }

    /// Replace the settings template
    pub async fn set_settings(&self, settings: TrackSettings) {
        *self.settings.write().await = settings;
    }

    /// Get the queue target size
    pub async fn target_size(&self) -> usize {
        *self.target_size.read().await
    }

    /// Set the queue target size
    pub async fn set_target_size(&self, target_size: usize) {
        *self.target_size.write().await = target_size;
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new(TrackSettings::default(), DEFAULT_TARGET_SIZE)
    }
}
