//! Queue item lifecycle types
//!
//! One struct per lifecycle phase, each carrying only the fields valid in
//! that phase, unified by the [`QueueItem`] tagged enum for snapshots.

use crate::remote::AudioPayload;
use jukegen_common::TrackSettings;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An item waiting in the input queue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueuedItem {
    pub id: Uuid,
    /// Settings snapshot taken at creation time
    #[serde(flatten)]
    pub settings: TrackSettings,
}

/// The item currently occupying the active slot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActiveItem {
    pub id: Uuid,
    #[serde(flatten)]
    pub settings: TrackSettings,
    /// Latest progress text reported by the backend
    pub progress: Option<String>,
}

/// A finished item carrying its generated audio
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletedItem {
    pub id: Uuid,
    pub caption: String,
    pub duration: u32,
    pub bpm: Option<u32>,
    pub key: Option<String>,
    pub genre: Option<String>,
    pub audio: AudioPayload,
}

/// A terminally failed item, kept visible until removed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FailedItem {
    pub id: Uuid,
    pub caption: String,
    pub error: String,
}

/// One queue item, tagged by lifecycle phase
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum QueueItem {
    Queued(QueuedItem),
    Generating(ActiveItem),
    Completed(CompletedItem),
    Failed(FailedItem),
}

impl QueueItem {
    pub fn id(&self) -> Uuid {
        match self {
            QueueItem::Queued(item) => item.id,
            QueueItem::Generating(item) => item.id,
            QueueItem::Completed(item) => item.id,
            QueueItem::Failed(item) => item.id,
        }
    }
}

/// Terminal result of one generation attempt
#[derive(Debug, Clone)]
pub enum GenerationOutcome {
    /// Audio fetched and ready for playback
    Completed(AudioPayload),
    /// Terminal failure with a user-visible reason
    Failed(String),
}

/// Per-phase item counts, recomputed from the containers on every read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueCounts {
    pub queued: usize,
    pub generating: usize,
    pub completed: usize,
    pub failed: usize,
}

impl QueueCounts {
    /// Total items across all phases
    pub fn total(&self) -> usize {
        self.queued + self.generating + self.completed + self.failed
    }
}
