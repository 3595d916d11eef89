//! Change-password and edit-profile screens

use tokio::sync::watch;

use super::form::{FormController, FormState};
use crate::error::Error;
use crate::model::{EducationLevel, UserProfile};
use crate::operations::Operations;
use crate::validation;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PasswordFields {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

pub struct ChangePasswordController {
    form: FormController<PasswordFields>,
    ops: Operations,
}

impl ChangePasswordController {
    pub fn new(ops: Operations) -> Self {
        Self {
            form: FormController::new(),
            ops,
        }
    }

    pub fn state(&self) -> FormState<PasswordFields> {
        self.form.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<FormState<PasswordFields>> {
        self.form.subscribe()
    }

    pub fn edit(&self, change: impl FnOnce(&mut PasswordFields)) {
        self.form.edit(change);
    }

    pub async fn change_password(&self) -> bool {
        let ops = &self.ops;
        self.form
            .submit(
                |f| validation::check_password_change(&f.current_password, &f.new_password, &f.confirm_password),
                |f| async move {
                    ops.change_password(&f.current_password, &f.new_password, &f.confirm_password)
                        .await
                },
                "Failed to change password",
            )
            .await
            .is_some()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProfileFields {
    pub username: String,
    pub picture_url: String,
    pub education_level: EducationLevel,
}

impl Default for ProfileFields {
    fn default() -> Self {
        Self {
            username: String::new(),
            picture_url: String::new(),
            education_level: EducationLevel::FALLBACK,
        }
    }
}

pub struct EditProfileController {
    form: FormController<ProfileFields>,
    ops: Operations,
}

impl EditProfileController {
    pub fn new(ops: Operations) -> Self {
        Self {
            form: FormController::new(),
            ops,
        }
    }

    /// Fill the form from the signed-in user's profile
    pub async fn prefill(&self) {
        match self.ops.current_user().await {
            Ok(profile) => self.form.edit(|f| {
                f.username = profile.username.clone();
                f.picture_url = profile.profile_picture_url.clone().unwrap_or_default();
                f.education_level = profile.effective_level();
            }),
            Err(e) => tracing::warn!(error = %e, "Cannot prefill profile form"),
        }
    }

    pub fn state(&self) -> FormState<ProfileFields> {
        self.form.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<FormState<ProfileFields>> {
        self.form.subscribe()
    }

    pub fn on_username_change(&self, username: &str) {
        self.form.edit(|f| f.username = username.to_string());
    }

    pub fn on_picture_url_change(&self, url: &str) {
        self.form.edit(|f| f.picture_url = url.to_string());
    }

    pub fn on_education_level_change(&self, level: EducationLevel) {
        self.form.edit(|f| f.education_level = level);
    }

    /// Save the picture URL when one is given, then the username and level
    pub async fn save(&self) -> Option<UserProfile> {
        let ops = &self.ops;
        self.form
            .submit(
                |f| validation::check_username(&f.username),
                |f| async move {
                    let Some(session) = ops.current_session() else {
                        return Err(Error::NotSignedIn);
                    };
                    let picture_url = f.picture_url.trim();
                    if !picture_url.is_empty() {
                        ops.set_profile_picture_url(&session.uid, picture_url).await?;
                    }
                    ops.update_profile(&session.uid, &f.username, f.education_level)
                        .await
                },
                "Failed to update profile",
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::auth::InMemoryAuth;
    use crate::store::InMemoryStore;

    async fn signed_in() -> Operations {
        let ops = Operations::new(Arc::new(InMemoryStore::new()), Arc::new(InMemoryAuth::new()));
        ops.sign_up("a@b.co", "secret1", "budi", EducationLevel::Smp)
            .await
            .unwrap();
        ops
    }

    #[tokio::test]
    async fn test_change_password_flow() {
        let screen = ChangePasswordController::new(signed_in().await);

        assert!(!screen.change_password().await);
        assert_eq!(
            screen.state().error.as_deref(),
            Some("Please enter your current password")
        );

        screen.edit(|f| {
            f.current_password = "wrong12".into();
            f.new_password = "secret2".into();
            f.confirm_password = "secret2".into();
        });
        assert!(!screen.change_password().await);
        assert_eq!(
            screen.state().error.as_deref(),
            Some("Current password is incorrect")
        );

        screen.edit(|f| f.current_password = "secret1".into());
        assert!(screen.change_password().await);
        assert!(screen.state().succeeded);
    }

    #[tokio::test]
    async fn test_edit_profile() {
        let screen = EditProfileController::new(signed_in().await);
        screen.prefill().await;
        assert_eq!(screen.state().fields.username, "budi");
        assert_eq!(screen.state().fields.education_level, EducationLevel::Smp);

        screen.on_username_change("  ");
        assert!(screen.save().await.is_none());
        assert_eq!(screen.state().error.as_deref(), Some("Username cannot be empty"));

        screen.on_username_change("budi_s");
        screen.on_education_level_change(EducationLevel::Sma);
        let saved = screen.save().await.unwrap();
        assert_eq!(saved.username, "budi_s");
        assert_eq!(saved.education_level, Some(EducationLevel::Sma));
        assert_eq!(saved.profile_picture_url, None);

        screen.on_picture_url_change(" https://img.faunadex.id/budi.png ");
        let saved = screen.save().await.unwrap();
        assert_eq!(
            saved.profile_picture_url.as_deref(),
            Some("https://img.faunadex.id/budi.png")
        );

        let reopened = EditProfileController::new(screen.ops.clone());
        reopened.prefill().await;
        assert_eq!(reopened.state().fields.picture_url, "https://img.faunadex.id/budi.png");
    }
}
