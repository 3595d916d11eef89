//! Media engine seam

/// Lifecycle of the loaded media as reported by the engine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineStatus {
    Idle,
    Buffering,
    Ready,
    Ended,
}

/// Notifications pushed by the engine onto its event channel
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    StatusChanged(EngineStatus),
    IsPlayingChanged(bool),
    Error(String),
}

/// A single-stream media player
///
/// Commands return immediately; their effects are reported through
/// [`EngineEvent`]s.
pub trait MediaEngine: Send + Sync {
    fn set_media(&self, url: &str);
    fn prepare(&self);
    fn play(&self);
    fn pause(&self);
    fn stop(&self);
    fn clear_media(&self);
    fn seek_to(&self, position_ms: u64);
    fn position_ms(&self) -> u64;
    fn duration_ms(&self) -> u64;
    fn is_playing(&self) -> bool;
    fn status(&self) -> EngineStatus;
}
