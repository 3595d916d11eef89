//! Narration playback manager

use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::engine::{EngineEvent, EngineStatus, MediaEngine};
use super::events::relay_events;
use crate::model::{PlaybackInfo, PlaybackState};

pub const AUDIO_NOT_AVAILABLE: &str = "Audio not available";

/// State shared between the manager, its event relay and its position poller
pub(super) struct Shared {
    pub(super) engine: Arc<dyn MediaEngine>,
    pub(super) state: watch::Sender<PlaybackState>,
    pub(super) position: watch::Sender<u64>,
    pub(super) duration: watch::Sender<u64>,
    poll_interval: Duration,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl Shared {
    /// Sample the engine position every poll interval until stopped
    pub(super) fn start_polling(self: &Arc<Self>) {
        let mut poller = self.poller.lock().unwrap_or_else(PoisonError::into_inner);
        if poller.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let shared: Weak<Self> = Arc::downgrade(self);
        let interval = self.poll_interval;
        *poller = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let Some(shared) = shared.upgrade() else {
                    break;
                };
                let position = shared.engine.position_ms();
                // sampling can be what notices the end of the track
                if shared.engine.is_playing() {
                    shared.position.send_replace(position);
                }
            }
        }));
        tracing::trace!(interval_ms = interval.as_millis() as u64, "Position polling started");
    }

    pub(super) fn stop_polling(&self) {
        let handle = self
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
            tracing::trace!("Position polling stopped");
        }
    }
}

/// Plays one narration at a time; loading a new URL stops the previous one
pub struct PlaybackManager {
    shared: Arc<Shared>,
    current_url: Mutex<Option<String>>,
    relay: Mutex<Option<JoinHandle<()>>>,
}

impl PlaybackManager {
    /// Must be called inside a tokio runtime: the event relay is spawned here.
    pub fn new(
        engine: Arc<dyn MediaEngine>,
        events: mpsc::UnboundedReceiver<EngineEvent>,
        poll_interval: Duration,
    ) -> Self {
        let (state, _) = watch::channel(PlaybackState::Idle);
        let (position, _) = watch::channel(0);
        let (duration, _) = watch::channel(0);

        let shared = Arc::new(Shared {
            engine,
            state,
            position,
            duration,
            poll_interval,
            poller: Mutex::new(None),
        });
        let relay = tokio::spawn(relay_events(shared.clone(), events));

        Self {
            shared,
            current_url: Mutex::new(None),
            relay: Mutex::new(Some(relay)),
        }
    }

    /// Play `url`, or toggle play/pause when it is already loaded
    pub fn load_and_play(&self, url: &str) {
        if url.trim().is_empty() {
            tracing::warn!("No audio URL to play");
            self.shared
                .state
                .send_replace(PlaybackState::Error(AUDIO_NOT_AVAILABLE.to_string()));
            return;
        }

        if self.current_url().as_deref() == Some(url) && self.shared.engine.status() != EngineStatus::Idle {
            self.toggle_play_pause();
            return;
        }

        self.stop();
        tracing::info!(url, "Loading narration");
        self.set_current_url(Some(url.to_string()));
        self.shared.state.send_replace(PlaybackState::Loading);

        let engine = &self.shared.engine;
        engine.set_media(url);
        engine.prepare();
        engine.play();
    }

    pub fn toggle_play_pause(&self) {
        let engine = &self.shared.engine;
        if engine.status() == EngineStatus::Ended {
            tracing::debug!("Replaying from the start");
            engine.seek_to(0);
            self.shared.position.send_replace(0);
            engine.play();
        } else if engine.is_playing() {
            engine.pause();
        } else {
            engine.play();
        }
    }

    pub fn pause(&self) {
        self.shared.engine.pause();
    }

    /// Tear down the current media; leaves Idle with position and duration 0
    pub fn stop(&self) {
        let engine = &self.shared.engine;
        engine.stop();
        engine.clear_media();
        self.shared.stop_polling();
        self.set_current_url(None);
        self.shared.state.send_replace(PlaybackState::Idle);
        self.shared.position.send_replace(0);
        self.shared.duration.send_replace(0);
    }

    /// Seek within the loaded media, clamped to its duration
    pub fn seek_to(&self, position_ms: u64) {
        let target = position_ms.min(self.shared.engine.duration_ms());
        self.shared.engine.seek_to(target);
        self.shared.position.send_replace(target);
    }

    pub fn current_url(&self) -> Option<String> {
        self.current_url
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn state(&self) -> PlaybackState {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<PlaybackState> {
        self.shared.state.subscribe()
    }

    pub fn subscribe_position(&self) -> watch::Receiver<u64> {
        self.shared.position.subscribe()
    }

    pub fn subscribe_duration(&self) -> watch::Receiver<u64> {
        self.shared.duration.subscribe()
    }

    pub fn snapshot(&self) -> PlaybackInfo {
        PlaybackInfo {
            state: self.state(),
            url: self.current_url(),
            position_ms: *self.shared.position.borrow(),
            duration_ms: *self.shared.duration.borrow(),
        }
    }

    /// Stop the relay and the poller. Observers keep the last published values.
    pub fn shutdown(&self) {
        self.shared.stop_polling();
        let relay = self.relay.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(relay) = relay {
            relay.abort();
            tracing::debug!("Playback relay shut down");
        }
    }

    fn set_current_url(&self, url: Option<String>) {
        *self.current_url.lock().unwrap_or_else(PoisonError::into_inner) = url;
    }
}

impl Drop for PlaybackManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::SimulatedEngine;

    const A: &str = "audio/komodo_dragon_description.mp3";
    const B: &str = "audio/bali_starling_description.mp3";

    fn manager(track_ms: u64) -> (Arc<SimulatedEngine>, PlaybackManager) {
        let (engine, events) = SimulatedEngine::new(track_ms);
        let manager = PlaybackManager::new(engine.clone(), events, Duration::from_millis(100));
        (engine, manager)
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_url_toggles() {
        let (engine, player) = manager(30_000);
        player.load_and_play(A);
        settle().await;
        assert_eq!(player.state(), PlaybackState::Playing);
        assert_eq!(*player.subscribe_duration().borrow(), 30_000);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(*player.subscribe_position().borrow() >= 400);

        player.load_and_play(A);
        settle().await;
        assert_eq!(player.state(), PlaybackState::Paused);

        player.load_and_play(A);
        settle().await;
        assert_eq!(player.state(), PlaybackState::Playing);

        let loads = engine
            .command_log()
            .iter()
            .filter(|c| c.starts_with("set_media"))
            .count();
        assert_eq!(loads, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_url_stops_previous_first() {
        let (engine, player) = manager(30_000);
        player.load_and_play(A);
        settle().await;
        player.load_and_play(B);
        settle().await;

        let log = engine.command_log();
        let index_of = |cmd: String| log.iter().position(|c| *c == cmd).unwrap();
        let load_a = index_of(format!("set_media:{}", A));
        let load_b = index_of(format!("set_media:{}", B));
        let stop = log.iter().skip(load_a).position(|c| c == "stop").unwrap() + load_a;
        assert!(load_a < stop && stop < load_b);

        assert_eq!(player.current_url().as_deref(), Some(B));
        assert_eq!(player.state(), PlaybackState::Playing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_resets_everything() {
        let (_engine, player) = manager(30_000);
        player.load_and_play(A);
        settle().await;
        tokio::time::sleep(Duration::from_millis(300)).await;

        player.stop();
        settle().await;
        let snapshot = player.snapshot();
        assert_eq!(snapshot.state, PlaybackState::Idle);
        assert_eq!(snapshot.position_ms, 0);
        assert_eq!(snapshot.duration_ms, 0);
        assert_eq!(snapshot.url, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_url_is_an_error() {
        let (engine, player) = manager(30_000);
        player.load_and_play("");
        assert_eq!(
            player.state(),
            PlaybackState::Error(AUDIO_NOT_AVAILABLE.to_string())
        );
        assert!(engine.command_log().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_track_end_then_replay() {
        let (_engine, player) = manager(1_000);
        player.load_and_play(A);
        settle().await;

        tokio::time::sleep(Duration::from_millis(1_300)).await;
        assert_eq!(player.state(), PlaybackState::Idle);
        assert_eq!(*player.subscribe_position().borrow(), 0);

        player.load_and_play(A);
        settle().await;
        assert_eq!(player.state(), PlaybackState::Playing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_seek_is_clamped() {
        let (_engine, player) = manager(30_000);
        player.load_and_play(A);
        settle().await;
        player.pause();
        settle().await;

        player.seek_to(999_999);
        assert_eq!(*player.subscribe_position().borrow(), 30_000);
        player.seek_to(1_234);
        assert_eq!(*player.subscribe_position().borrow(), 1_234);
    }

    #[tokio::test(start_paused = true)]
    async fn test_engine_error_is_published() {
        let (engine, player) = manager(30_000);
        engine.mark_unplayable(B);
        player.load_and_play(B);
        settle().await;
        assert!(matches!(player.state(), PlaybackState::Error(_)));
    }
}
