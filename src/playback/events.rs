//! Engine event relay

use std::sync::Arc;

use tokio::sync::mpsc;

use super::engine::{EngineEvent, EngineStatus};
use super::manager::Shared;
use crate::model::PlaybackState;

/// Forward engine notifications into the manager's observable state until
/// the engine's channel closes.
pub(super) async fn relay_events(shared: Arc<Shared>, mut events: mpsc::UnboundedReceiver<EngineEvent>) {
    tracing::info!("Starting playback event relay");
    while let Some(event) = events.recv().await {
        shared.handle_event(event);
    }
    tracing::debug!("Playback event relay finished");
}

impl Shared {
    pub(super) fn handle_event(self: &Arc<Self>, event: EngineEvent) {
        match event {
            EngineEvent::StatusChanged(EngineStatus::Idle) => {
                tracing::trace!("EngineEvent::Idle");
                self.stop_polling();
                self.state.send_replace(PlaybackState::Idle);
            }
            EngineEvent::StatusChanged(EngineStatus::Buffering) => {
                tracing::trace!("EngineEvent::Buffering");
                self.state.send_replace(PlaybackState::Loading);
            }
            EngineEvent::StatusChanged(EngineStatus::Ready) => {
                let duration_ms = self.engine.duration_ms();
                let playing = self.engine.is_playing();
                tracing::debug!(duration_ms, playing, "EngineEvent::Ready");
                self.duration.send_replace(duration_ms);
                self.state.send_replace(if playing {
                    PlaybackState::Playing
                } else {
                    PlaybackState::Paused
                });
            }
            EngineEvent::StatusChanged(EngineStatus::Ended) => {
                tracing::debug!("EngineEvent::Ended");
                self.stop_polling();
                self.state.send_replace(PlaybackState::Idle);
                self.position.send_replace(0);
            }
            EngineEvent::IsPlayingChanged(true) => {
                tracing::trace!("EngineEvent::IsPlayingChanged(true)");
                self.state.send_replace(PlaybackState::Playing);
                self.start_polling();
            }
            EngineEvent::IsPlayingChanged(false) => {
                tracing::trace!("EngineEvent::IsPlayingChanged(false)");
                if self.engine.status() == EngineStatus::Ready {
                    self.stop_polling();
                    self.state.send_replace(PlaybackState::Paused);
                    self.position.send_replace(self.engine.position_ms());
                }
            }
            EngineEvent::Error(message) => {
                tracing::error!(%message, "Playback error");
                self.stop_polling();
                self.state.send_replace(PlaybackState::Error(message));
            }
        }
    }
}
