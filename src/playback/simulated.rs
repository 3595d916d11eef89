//! Clock-driven engine used by the demo binary and the tests

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tokio::time::Instant;

use super::engine::{EngineEvent, EngineStatus, MediaEngine};

struct Inner {
    url: Option<String>,
    status: EngineStatus,
    playing: bool,
    position_at_start: u64,
    started_at: Option<Instant>,
    duration: u64,
    log: Vec<String>,
}

impl Inner {
    fn position(&self) -> u64 {
        match self.started_at {
            Some(started) if self.playing => {
                let elapsed = started.elapsed().as_millis() as u64;
                (self.position_at_start + elapsed).min(self.duration)
            }
            _ => self.position_at_start,
        }
    }
}

/// Plays every URL for a fixed length of simulated time
///
/// Reaching the end of the track is noticed the next time the position is
/// sampled.
pub struct SimulatedEngine {
    inner: Mutex<Inner>,
    events: mpsc::UnboundedSender<EngineEvent>,
    track_ms: u64,
    durations: Mutex<HashMap<String, u64>>,
    unplayable: Mutex<HashSet<String>>,
}

impl SimulatedEngine {
    pub fn new(track_ms: u64) -> (Arc<Self>, mpsc::UnboundedReceiver<EngineEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let engine = Self {
            inner: Mutex::new(Inner {
                url: None,
                status: EngineStatus::Idle,
                playing: false,
                position_at_start: 0,
                started_at: None,
                duration: 0,
                log: Vec::new(),
            }),
            events,
            track_ms,
            durations: Mutex::new(HashMap::new()),
            unplayable: Mutex::new(HashSet::new()),
        };
        (Arc::new(engine), receiver)
    }

    /// Give `url` its own length instead of the default
    pub fn set_duration(&self, url: &str, duration_ms: u64) {
        self.durations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string(), duration_ms);
    }

    /// Preparing `url` will fail with a source error
    pub fn mark_unplayable(&self, url: &str) {
        self.unplayable
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string());
    }

    /// Commands received so far, oldest first
    pub fn command_log(&self) -> Vec<String> {
        self.lock().log.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: EngineEvent) {
        // a closed channel means the manager is gone
        let _ = self.events.send(event);
    }

    fn set_status(&self, inner: &mut Inner, status: EngineStatus) {
        if inner.status != status {
            inner.status = status;
            self.emit(EngineEvent::StatusChanged(status));
        }
    }

    fn set_playing(&self, inner: &mut Inner, playing: bool) {
        if inner.playing == playing {
            return;
        }
        if playing {
            inner.started_at = Some(Instant::now());
        } else {
            inner.position_at_start = inner.position();
            inner.started_at = None;
        }
        inner.playing = playing;
        self.emit(EngineEvent::IsPlayingChanged(playing));
    }

    fn check_ended(&self, inner: &mut Inner) {
        if inner.playing && inner.duration > 0 && inner.position() >= inner.duration {
            tracing::debug!(url = ?inner.url, "Simulated track ended");
            inner.position_at_start = inner.duration;
            self.set_status(inner, EngineStatus::Ended);
            self.set_playing(inner, false);
        }
    }
}

impl MediaEngine for SimulatedEngine {
    fn set_media(&self, url: &str) {
        let mut inner = self.lock();
        inner.log.push(format!("set_media:{}", url));
        inner.url = Some(url.to_string());
        inner.position_at_start = 0;
        inner.duration = 0;
    }

    fn prepare(&self) {
        let mut inner = self.lock();
        inner.log.push("prepare".to_string());
        let Some(url) = inner.url.clone() else {
            return;
        };

        let unplayable = self
            .unplayable
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&url);
        if unplayable {
            self.set_status(&mut inner, EngineStatus::Idle);
            self.emit(EngineEvent::Error(format!("Source error: cannot open {}", url)));
            return;
        }

        self.set_status(&mut inner, EngineStatus::Buffering);
        inner.duration = self
            .durations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&url)
            .copied()
            .unwrap_or(self.track_ms);
        self.set_status(&mut inner, EngineStatus::Ready);
    }

    fn play(&self) {
        let mut inner = self.lock();
        inner.log.push("play".to_string());
        if inner.status == EngineStatus::Ready {
            self.set_playing(&mut inner, true);
        }
    }

    fn pause(&self) {
        let mut inner = self.lock();
        inner.log.push("pause".to_string());
        self.check_ended(&mut inner);
        self.set_playing(&mut inner, false);
    }

    fn stop(&self) {
        let mut inner = self.lock();
        inner.log.push("stop".to_string());
        self.set_playing(&mut inner, false);
        self.set_status(&mut inner, EngineStatus::Idle);
    }

    fn clear_media(&self) {
        let mut inner = self.lock();
        inner.log.push("clear_media".to_string());
        inner.url = None;
        inner.position_at_start = 0;
        inner.duration = 0;
    }

    fn seek_to(&self, position_ms: u64) {
        let mut inner = self.lock();
        inner.log.push(format!("seek:{}", position_ms));
        inner.position_at_start = position_ms.min(inner.duration);
        if inner.playing {
            inner.started_at = Some(Instant::now());
        }
        if inner.status == EngineStatus::Ended {
            self.set_status(&mut inner, EngineStatus::Ready);
        }
    }

    fn position_ms(&self) -> u64 {
        let mut inner = self.lock();
        self.check_ended(&mut inner);
        inner.position()
    }

    fn duration_ms(&self) -> u64 {
        self.lock().duration
    }

    fn is_playing(&self) -> bool {
        self.lock().playing
    }

    fn status(&self) -> EngineStatus {
        self.lock().status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn drain(events: &mut mpsc::UnboundedReceiver<EngineEvent>) -> Vec<EngineEvent> {
        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        seen
    }

    #[tokio::test(start_paused = true)]
    async fn test_plays_to_the_end() {
        let (engine, mut events) = SimulatedEngine::new(1_000);
        engine.set_media("audio/a.mp3");
        engine.prepare();
        engine.play();
        assert_eq!(
            drain(&mut events),
            vec![
                EngineEvent::StatusChanged(EngineStatus::Buffering),
                EngineEvent::StatusChanged(EngineStatus::Ready),
                EngineEvent::IsPlayingChanged(true),
            ]
        );

        tokio::time::advance(Duration::from_millis(400)).await;
        assert_eq!(engine.position_ms(), 400);

        tokio::time::advance(Duration::from_millis(700)).await;
        assert_eq!(engine.position_ms(), 1_000);
        assert_eq!(engine.status(), EngineStatus::Ended);
        assert_eq!(
            drain(&mut events),
            vec![
                EngineEvent::StatusChanged(EngineStatus::Ended),
                EngineEvent::IsPlayingChanged(false),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_holds_position() {
        let (engine, _events) = SimulatedEngine::new(10_000);
        engine.set_media("audio/a.mp3");
        engine.prepare();
        engine.play();
        tokio::time::advance(Duration::from_millis(250)).await;
        engine.pause();
        tokio::time::advance(Duration::from_millis(500)).await;
        assert_eq!(engine.position_ms(), 250);
        assert!(!engine.is_playing());
    }

    #[tokio::test]
    async fn test_unplayable_url_reports_error() {
        let (engine, mut events) = SimulatedEngine::new(1_000);
        engine.mark_unplayable("audio/missing.mp3");
        engine.set_media("audio/missing.mp3");
        engine.prepare();
        engine.play();

        let seen = drain(&mut events);
        assert!(matches!(seen.last(), Some(EngineEvent::Error(_))));
        assert!(!engine.is_playing());
        assert_eq!(
            engine.command_log(),
            vec!["set_media:audio/missing.mp3", "prepare", "play"]
        );
    }
}
