//! Profile screen

use std::sync::Arc;

use tokio::sync::watch;

use super::state::{LoadTicket, ScreenState, ScreenTasks};
use crate::error::Error;
use crate::model::{DisplayState, EducationLevel, UserProfile};
use crate::operations::Operations;

struct Inner {
    state: ScreenState<UserProfile>,
    ops: Operations,
}

impl Inner {
    async fn load(&self, ticket: LoadTicket) {
        let Some(session) = self.ops.current_session() else {
            tracing::warn!("No signed-in user for profile");
            self.state
                .finish(ticket, DisplayState::Error(Error::NotSignedIn.to_string()));
            return;
        };

        let state = match self.ops.user_profile(&session.uid).await {
            Ok(profile) => {
                tracing::debug!(
                    uid = %profile.uid,
                    username = %profile.username,
                    xp = profile.total_xp,
                    "Profile fetched"
                );
                DisplayState::Success(profile)
            }
            Err(e) => {
                tracing::error!(uid = %session.uid, error = %e, "Failed to fetch profile");
                DisplayState::Error(e.user_message("Failed to load profile"))
            }
        };
        self.state.finish(ticket, state);
    }

    async fn update_education_level(&self, level: EducationLevel) {
        let DisplayState::Success(profile) = self.state.current() else {
            return;
        };

        let ticket = self.state.begin_load();
        let state = match self.ops.update_education_level(&profile.uid, level).await {
            Ok(updated) => DisplayState::Success(updated),
            Err(e) => {
                tracing::error!(uid = %profile.uid, error = %e, "Failed to update education level");
                DisplayState::Error(format!("Failed to update: {}", e))
            }
        };
        self.state.finish(ticket, state);
    }
}

pub struct ProfileController {
    inner: Arc<Inner>,
    tasks: ScreenTasks,
}

impl ProfileController {
    pub fn new(ops: Operations) -> Self {
        let controller = Self {
            inner: Arc::new(Inner {
                state: ScreenState::new(),
                ops,
            }),
            tasks: ScreenTasks::new(),
        };
        controller.retry();
        controller
    }

    pub fn state(&self) -> DisplayState<UserProfile> {
        self.inner.state.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<DisplayState<UserProfile>> {
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

    /// Save a new level. Ignored unless a profile is shown.
    pub fn update_education_level(&self, level: EducationLevel) {
        let inner = self.inner.clone();
        self.tasks
            .spawn(async move { inner.update_education_level(level).await });
    }

    pub async fn sign_out(&self) {
        self.tasks.abort_all();
        self.inner.ops.sign_out().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::InMemoryAuth;
    use crate::store::InMemoryStore;

    async fn settled(profile: &ProfileController) -> DisplayState<UserProfile> {
        let mut rx = profile.subscribe();
        rx.wait_for(|state| !state.is_loading()).await.unwrap().clone()
    }

    async fn signed_in() -> (Arc<InMemoryStore>, Operations) {
        let store = Arc::new(InMemoryStore::new());
        let ops = Operations::new(store.clone(), Arc::new(InMemoryAuth::new()));
        ops.sign_up("a@b.co", "secret1", "budi", EducationLevel::Sd)
            .await
            .unwrap();
        (store, ops)
    }

    #[tokio::test]
    async fn test_not_logged_in() {
        let ops = Operations::new(Arc::new(InMemoryStore::new()), Arc::new(InMemoryAuth::new()));
        let profile = ProfileController::new(ops);
        assert_eq!(settled(&profile).await.error(), Some("User not logged in"));
    }

    #[tokio::test]
    async fn test_update_education_level() {
        let (_store, ops) = signed_in().await;
        let profile = ProfileController::new(ops.clone());
        settled(&profile).await;

        profile.inner.update_education_level(EducationLevel::Sma).await;
        let updated = profile.state();
        assert_eq!(
            updated.success().and_then(|p| p.education_level),
            Some(EducationLevel::Sma)
        );

        let stored = ops.current_user().await.unwrap();
        assert_eq!(stored.education_level, Some(EducationLevel::Sma));
    }

    #[tokio::test]
    async fn test_update_failure_message() {
        let (store, ops) = signed_in().await;
        let profile = ProfileController::new(ops);
        settled(&profile).await;

        store.fail_next("quota exceeded");
        profile.inner.update_education_level(EducationLevel::Smp).await;
        assert_eq!(profile.state().error(), Some("Failed to update: quota exceeded"));

        profile.refresh().await;
        assert!(profile.state().success().is_some());
    }

    #[tokio::test]
    async fn test_update_ignored_while_failed() {
        let (store, ops) = signed_in().await;
        store.set_offline(true);
        let profile = ProfileController::new(ops);
        assert!(settled(&profile).await.error().is_some());

        let before = store.operation_count();
        profile.inner.update_education_level(EducationLevel::Sma).await;
        assert_eq!(store.operation_count(), before);
    }

    #[tokio::test]
    async fn test_sign_out() {
        let (_store, ops) = signed_in().await;
        let profile = ProfileController::new(ops.clone());
        settled(&profile).await;
        profile.sign_out().await;
        assert!(ops.current_session().is_none());
    }
}
