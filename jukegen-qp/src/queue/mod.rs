//! Queue state: lifecycle types and the phase-segregated store

pub mod item;
pub mod store;

pub use item::{
    ActiveItem, CompletedItem, FailedItem, GenerationOutcome, QueueCounts, QueueItem, QueuedItem,
};
pub use store::QueueStore;
