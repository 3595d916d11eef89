//! Login and registration screens

use tokio::sync::watch;

use super::form::{FormController, FormState};
use crate::model::{EducationLevel, UserProfile};
use crate::operations::Operations;
use crate::validation;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoginFields {
    pub email: String,
    pub password: String,
}

pub struct LoginController {
    form: FormController<LoginFields>,
    ops: Operations,
}

impl LoginController {
    pub fn new(ops: Operations) -> Self {
        Self {
            form: FormController::new(),
            ops,
        }
    }

    pub fn state(&self) -> FormState<LoginFields> {
        self.form.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<FormState<LoginFields>> {
        self.form.subscribe()
    }

    pub fn on_email_change(&self, email: &str) {
        self.form.edit(|f| f.email = email.to_string());
    }

    pub fn on_password_change(&self, password: &str) {
        self.form.edit(|f| f.password = password.to_string());
    }

    pub async fn sign_in(&self) -> Option<UserProfile> {
        let ops = &self.ops;
        self.form
            .submit(
                |_| Ok(()),
                |f| async move { ops.sign_in(&f.email, &f.password).await },
                "Sign in failed",
            )
            .await
    }

    pub fn reset_sign_in_state(&self) {
        self.form.reset_success();
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegisterFields {
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub education_level: Option<EducationLevel>,
}

pub struct RegisterController {
    form: FormController<RegisterFields>,
    ops: Operations,
}

impl RegisterController {
    pub fn new(ops: Operations) -> Self {
        Self {
            form: FormController::new(),
            ops,
        }
    }

    pub fn state(&self) -> FormState<RegisterFields> {
        self.form.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<FormState<RegisterFields>> {
        self.form.subscribe()
    }

    pub fn edit(&self, change: impl FnOnce(&mut RegisterFields)) {
        self.form.edit(change);
    }

    pub fn on_education_level_change(&self, level: EducationLevel) {
        self.form.edit(|f| f.education_level = Some(level));
    }

    /// Required fields and the password confirmation are checked before any
    /// remote call.
    pub async fn sign_up(&self) -> Option<UserProfile> {
        let ops = &self.ops;
        self.form
            .submit(
                |f| {
                    validation::check_registration(
                        &f.email,
                        &f.username,
                        &f.password,
                        &f.confirm_password,
                        f.education_level.map(EducationLevel::as_str).unwrap_or_default(),
                    )
                },
                |f| async move {
                    let level = f.education_level.unwrap_or(EducationLevel::FALLBACK);
                    ops.sign_up(&f.email, &f.password, &f.username, level).await
                },
                "Registration failed",
            )
            .await
    }

    pub fn reset_sign_up_state(&self) {
        self.form.reset_success();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::auth::{AuthProvider, InMemoryAuth};
    use crate::store::InMemoryStore;

    fn ops() -> (Arc<InMemoryAuth>, Operations) {
        let auth = Arc::new(InMemoryAuth::new());
        let ops = Operations::new(Arc::new(InMemoryStore::new()), auth.clone());
        (auth, ops)
    }

    #[tokio::test]
    async fn test_login_blank_fields() {
        let (auth, ops) = ops();
        let login = LoginController::new(ops);
        assert!(login.sign_in().await.is_none());
        assert_eq!(
            login.state().error.as_deref(),
            Some("Email and password cannot be empty")
        );
        assert_eq!(auth.call_count(), 0);

        login.on_email_change("a@b.co");
        assert_eq!(login.state().error, None);
    }

    #[tokio::test]
    async fn test_login_wrong_password_message() {
        let (auth, ops) = ops();
        auth.create_account("a@b.co", "secret1").await.unwrap();
        auth.sign_out().await;

        let login = LoginController::new(ops);
        login.on_email_change("a@b.co");
        login.on_password_change("secret2");
        assert!(login.sign_in().await.is_none());
        assert_eq!(
            login.state().error.as_deref(),
            Some("The email or password is incorrect")
        );

        login.on_password_change("secret1");
        assert!(login.sign_in().await.is_some());
        assert!(login.state().succeeded);
    }

    #[tokio::test]
    async fn test_register_local_checks() {
        let (auth, ops) = ops();
        let register = RegisterController::new(ops);
        register.edit(|f| {
            f.email = "a@b.co".into();
            f.username = "budi".into();
            f.password = "secret1".into();
            f.confirm_password = "secret1".into();
        });

        assert!(register.sign_up().await.is_none());
        assert_eq!(register.state().error.as_deref(), Some("All fields are required"));

        register.on_education_level_change(EducationLevel::Smp);
        register.edit(|f| f.confirm_password = "secret2".into());
        assert!(register.sign_up().await.is_none());
        assert_eq!(register.state().error.as_deref(), Some("Passwords do not match"));
        assert_eq!(auth.call_count(), 0);

        register.edit(|f| f.confirm_password = "secret1".into());
        let profile = register.sign_up().await.unwrap();
        assert_eq!(profile.education_level, Some(EducationLevel::Smp));
        assert_eq!(auth.call_count(), 1);
    }
}
