//! Animal detail screen and its narration controls

use std::sync::Arc;

use tokio::sync::watch;

use super::state::{LoadTicket, ScreenState, ScreenTasks};
use crate::model::{Animal, DetailTab, DisplayState, EducationLevel, PlaybackInfo};
use crate::operations::Operations;
use crate::playback::PlaybackManager;

#[derive(Clone, Debug, PartialEq)]
pub struct AnimalDetail {
    pub animal: Animal,
    pub education_level: EducationLevel,
}

impl AnimalDetail {
    pub fn tabs(&self) -> Vec<DetailTab> {
        DetailTab::available_for(self.education_level)
    }

    pub fn description(&self) -> &str {
        self.animal.description_for(self.education_level)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Narration {
    Description,
    FunFact,
}

struct Inner {
    animal_id: String,
    state: ScreenState<AnimalDetail>,
    ops: Operations,
}

impl Inner {
    async fn load(&self, ticket: LoadTicket) {
        tracing::debug!(animal_id = %self.animal_id, "Loading animal detail");
        let (animal, user) = tokio::join!(
            self.ops.animal_detail(&self.animal_id),
            self.ops.current_user()
        );

        let education_level = user
            .map(|user| user.effective_level())
            .unwrap_or(EducationLevel::FALLBACK);

        let state = match animal {
            Ok(animal) => {
                tracing::debug!(animal_id = %self.animal_id, level = %education_level, "Animal detail loaded");
                DisplayState::Success(AnimalDetail {
                    animal,
                    education_level,
                })
            }
            Err(e) => {
                tracing::error!(animal_id = %self.animal_id, error = %e, "Failed to load animal");
                DisplayState::Error(e.user_message("Failed to load animal details"))
            }
        };
        self.state.finish(ticket, state);
    }
}

pub struct DetailController {
    inner: Arc<Inner>,
    playback: Arc<PlaybackManager>,
    tasks: ScreenTasks,
}

impl DetailController {
    pub fn new(ops: Operations, playback: Arc<PlaybackManager>, animal_id: impl Into<String>) -> Self {
        let controller = Self {
            inner: Arc::new(Inner {
                animal_id: animal_id.into(),
                state: ScreenState::new(),
                ops,
            }),
            playback,
            tasks: ScreenTasks::new(),
        };
        controller.retry();
        controller
    }

    pub fn animal_id(&self) -> &str {
        &self.inner.animal_id
    }

    pub fn state(&self) -> DisplayState<AnimalDetail> {
        self.inner.state.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<DisplayState<AnimalDetail>> {
        self.inner.state.subscribe()
    }

    pub fn retry(&self) {
        let ticket = self.inner.state.begin_load();
        let inner = self.inner.clone();
        self.tasks.spawn(async move { inner.load(ticket).await });
    }

    pub async fn refresh(&self) {
        let ticket = self.inner.state.begin_load();
        self.inner.load(ticket).await;
    }

    /// Education level used to pick the description and tabs
    pub fn education_level(&self) -> EducationLevel {
        self.state()
            .success()
            .map(|detail| detail.education_level)
            .unwrap_or(EducationLevel::FALLBACK)
    }

    /// Play (or toggle) one of the animal's narrations. A missing URL shows
    /// up as a playback error.
    pub fn play(&self, narration: Narration) {
        let DisplayState::Success(detail) = self.state() else {
            return;
        };
        let url = match narration {
            Narration::Description => detail.animal.audio_description_url,
            Narration::FunFact => detail.animal.audio_fun_fact_url,
        };
        self.playback.load_and_play(url.as_deref().unwrap_or_default());
    }

    pub fn stop_audio(&self) {
        self.playback.stop();
    }

    pub fn playback(&self) -> PlaybackInfo {
        self.playback.snapshot()
    }
}
