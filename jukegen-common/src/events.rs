//! Event types for the jukegen event system

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// jukegen event types
///
/// Broadcast by the queue store and playback controller so observers
/// (the status logger, future control surfaces) can follow item lifecycle
/// transitions without polling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QueueEvent {
    /// An item was added to the input queue
    ItemQueued {
        item_id: Uuid,
        caption: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// An item was promoted into the active slot and submitted
    GenerationStarted {
        item_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Progress text reported by the backend for the active item
    GenerationProgress {
        item_id: Uuid,
        progress: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The active item finished with audio attached
    ItemCompleted {
        item_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The active item finished with a terminal failure
    ItemFailed {
        item_id: Uuid,
        reason: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// An item was removed (explicitly, or after playback)
    ItemRemoved {
        item_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Completed items (or the whole queue) were cleared
    QueueCleared {
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback of a completed item began
    PlaybackStarted {
        item_id: Uuid,
        caption: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback ended (naturally or on error); the item is gone
    PlaybackFinished {
        item_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl QueueEvent {
    /// Event type name as it appears in the serialized `type` tag
    pub fn event_type(&self) -> &'static str {
        match self {
            QueueEvent::ItemQueued { .. } => "ItemQueued",
            QueueEvent::GenerationStarted { .. } => "GenerationStarted",
            QueueEvent::GenerationProgress { .. } => "GenerationProgress",
            QueueEvent::ItemCompleted { .. } => "ItemCompleted",
            QueueEvent::ItemFailed { .. } => "ItemFailed",
            QueueEvent::ItemRemoved { .. } => "ItemRemoved",
            QueueEvent::QueueCleared { .. } => "QueueCleared",
            QueueEvent::PlaybackStarted { .. } => "PlaybackStarted",
            QueueEvent::PlaybackFinished { .. } => "PlaybackFinished",
        }
    }
}
