//! Single-stream narration playback
//!
//! [`PlaybackManager`] drives a [`MediaEngine`] and republishes its state,
//! position and duration on `watch` channels. It is built once by the
//! composition root and shared through an `Arc`.

mod engine;
mod events;
mod manager;
mod simulated;

pub use engine::{EngineEvent, EngineStatus, MediaEngine};
pub use manager::{AUDIO_NOT_AVAILABLE, PlaybackManager};
pub use simulated::SimulatedEngine;
