use std::sync::Arc;

use tokio::sync::watch;

use super::AuthProvider;
use crate::error::{Error, Result};
use crate::gateway::UserGateway;
use crate::model::{EducationLevel, Session, UserProfile};

/// Accounts and their stored profiles, kept consistent with each other
#[derive(Clone)]
pub struct AccountService {
    auth: Arc<dyn AuthProvider>,
    users: UserGateway,
}

impl AccountService {
    pub fn new(auth: Arc<dyn AuthProvider>, users: UserGateway) -> Self {
        Self { auth, users }
    }

    /// Create the account and its profile. When the profile cannot be
    /// written the fresh account is deleted again.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        username: &str,
        education_level: EducationLevel,
    ) -> Result<UserProfile> {
        let session = self.auth.create_account(email, password).await?;

        let profile = UserProfile {
            uid: session.uid.clone(),
            email: session.email.clone(),
            username: username.trim().to_string(),
            education_level: Some(education_level),
            ..UserProfile::default()
        };

        if let Err(e) = self.users.create_profile(&profile).await {
            tracing::warn!(uid = %session.uid, error = %e, "Rolling back account after profile failure");
            if let Err(rollback) = self.auth.delete_current().await {
                tracing::error!(uid = %session.uid, error = %rollback, "Account rollback failed");
            }
            return Err(e);
        }

        self.users.fetch_profile(&session.uid).await.or(Ok(profile))
    }

    /// Sign in and load the profile, falling back to a basic one
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserProfile> {
        let session = self.auth.sign_in(email, password).await?;
        match self.users.fetch_profile(&session.uid).await {
            Ok(profile) => Ok(profile),
            Err(e) => {
                tracing::warn!(uid = %session.uid, error = %e, "Profile unavailable after sign in");
                Ok(UserProfile::basic(&session))
            }
        }
    }

    pub async fn sign_out(&self) {
        self.auth.sign_out().await;
    }

    pub fn current_session(&self) -> Option<Session> {
        self.auth.current_session()
    }

    pub fn logged_in(&self) -> watch::Receiver<bool> {
        self.auth.logged_in()
    }

    /// Profile of the signed-in user. A profile that cannot be read is
    /// replaced by a basic one at the fallback education level.
    pub async fn current_user(&self) -> Result<UserProfile> {
        let session = self.current_session().ok_or(Error::NotSignedIn)?;
        match self.users.fetch_profile(&session.uid).await {
            Ok(profile) => Ok(profile),
            Err(e) => {
                tracing::warn!(uid = %session.uid, error = %e, "Using basic profile");
                Ok(UserProfile {
                    education_level: Some(EducationLevel::FALLBACK),
                    ..UserProfile::basic(&session)
                })
            }
        }
    }

    pub async fn change_password(&self, current: &str, new: &str) -> Result<()> {
        if self.current_session().is_none() {
            return Err(Error::NotSignedIn);
        }

        self.auth.reauthenticate(current).await.map_err(|e| match e {
            Error::InvalidCredentials(_) => Error::WrongPassword,
            other => other,
        })?;
        self.auth.update_password(new).await?;
        tracing::info!("Password changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::InMemoryAuth;
    use crate::store::InMemoryStore;

    fn service() -> (Arc<InMemoryAuth>, Arc<InMemoryStore>, AccountService) {
        let auth = Arc::new(InMemoryAuth::new());
        let store = Arc::new(InMemoryStore::new());
        let service = AccountService::new(auth.clone(), UserGateway::new(store.clone()));
        (auth, store, service)
    }

    #[tokio::test]
    async fn test_sign_up_writes_profile() {
        let (auth, _store, accounts) = service();
        let profile = accounts
            .sign_up("budi@faunadex.id", "secret1", "budi", EducationLevel::Smp)
            .await
            .unwrap();

        assert_eq!(profile.username, "budi");
        assert_eq!(profile.education_level, Some(EducationLevel::Smp));
        assert!(profile.joined_at.is_some());
        assert_eq!(auth.call_count(), 1);
        assert!(*accounts.logged_in().borrow());
    }

    #[tokio::test]
    async fn test_sign_up_rolls_back_account() {
        let (auth, store, accounts) = service();
        store.set_offline(true);

        let result = accounts
            .sign_up("budi@faunadex.id", "secret1", "budi", EducationLevel::Smp)
            .await;
        assert!(matches!(result, Err(Error::Backend(_))));
        assert_eq!(auth.account_count(), 0);
        assert!(accounts.current_session().is_none());
    }

    #[tokio::test]
    async fn test_sign_in_falls_back_to_basic_profile() {
        let (auth, store, accounts) = service();
        auth.create_account("a@b.co", "secret1").await.unwrap();
        auth.sign_out().await;

        store.set_offline(true);
        let profile = accounts.sign_in("a@b.co", "secret1").await.unwrap();
        assert_eq!(profile.email, "a@b.co");
        assert_eq!(profile.education_level, None);
    }

    #[tokio::test]
    async fn test_current_user_fallback_level() {
        let (auth, _store, accounts) = service();
        assert_eq!(accounts.current_user().await, Err(Error::NotSignedIn));

        auth.create_account("a@b.co", "secret1").await.unwrap();
        let user = accounts.current_user().await.unwrap();
        assert_eq!(user.education_level, Some(EducationLevel::Sma));
    }

    #[tokio::test]
    async fn test_change_password() {
        let (_auth, _store, accounts) = service();
        accounts
            .sign_up("a@b.co", "secret1", "a", EducationLevel::Sd)
            .await
            .unwrap();

        assert_eq!(
            accounts.change_password("wrong1", "secret2").await,
            Err(Error::WrongPassword)
        );
        accounts.change_password("secret1", "secret2").await.unwrap();

        accounts.sign_out().await;
        assert!(accounts.sign_in("a@b.co", "secret2").await.is_ok());
    }
}
