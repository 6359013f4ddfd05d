//! # jukegen Queue Player (jukegen-qp)
//!
//! Client-side orchestration for a remote music-generation backend: an
//! in-memory queue of track requests, an auto-adder that keeps it topped up
//! from the current settings, a generation pipeline that submits and polls
//! one item at a time, and playback of completed audio.
//!
//! **Architecture:** phase-segregated queue store shared by three
//! independent background tasks; the active slot is the only lock-like
//! resource and is released on every generation exit path.

pub mod engine;
pub mod error;
pub mod generation;
pub mod playback;
pub mod queue;
pub mod remote;
pub mod state;

pub use engine::{Engine, EngineConfig};
pub use error::{Error, Result};
pub use state::SharedState;
