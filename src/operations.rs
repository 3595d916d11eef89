//! Use cases invoked by the screen controllers
//!
//! Each operation runs its local checks first and only then delegates to
//! the gateway or the account service. Nothing here retries.

use std::sync::Arc;

use tokio::sync::watch;

use crate::auth::{AccountService, AuthProvider};
use crate::error::Result;
use crate::gateway::{AnimalGateway, UserGateway};
use crate::model::{Animal, EducationLevel, Session, UserProfile};
use crate::store::DocumentStore;
use crate::validation;

#[derive(Clone)]
pub struct Operations {
    accounts: AccountService,
    animals: AnimalGateway,
    users: UserGateway,
}

impl Operations {
    pub fn new(store: Arc<dyn DocumentStore>, auth: Arc<dyn AuthProvider>) -> Self {
        let users = UserGateway::new(store.clone());
        Self {
            accounts: AccountService::new(auth, users.clone()),
            animals: AnimalGateway::new(store),
            users,
        }
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        username: &str,
        education_level: EducationLevel,
    ) -> Result<UserProfile> {
        validation::check_sign_up(email, password)?;
        self.accounts
            .sign_up(email.trim(), password, username, education_level)
            .await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserProfile> {
        validation::check_sign_in(email, password)?;
        self.accounts.sign_in(email.trim(), password).await
    }

    pub async fn sign_out(&self) {
        self.accounts.sign_out().await;
    }

    pub fn current_session(&self) -> Option<Session> {
        self.accounts.current_session()
    }

    pub fn logged_in(&self) -> watch::Receiver<bool> {
        self.accounts.logged_in()
    }

    pub async fn current_user(&self) -> Result<UserProfile> {
        self.accounts.current_user().await
    }

    pub async fn user_profile(&self, uid: &str) -> Result<UserProfile> {
        self.users.fetch_profile(uid).await
    }

    pub async fn animal_detail(&self, animal_id: &str) -> Result<Animal> {
        validation::check_animal_id(animal_id)?;
        self.animals.fetch_by_id(animal_id.trim()).await
    }

    pub async fn all_animals(&self) -> Result<Vec<Animal>> {
        self.animals.fetch_all().await
    }

    pub async fn animals_by_category(&self, category: &str) -> Result<Vec<Animal>> {
        self.animals.fetch_by_category(category).await
    }

    pub async fn favorite_ids(&self, uid: &str) -> Result<Vec<String>> {
        self.users.favorite_ids(uid).await
    }

    /// Remove `animal_id` from the favorites when `is_favorite`, add it
    /// otherwise. Returns the new membership.
    pub async fn toggle_favorite(&self, uid: &str, animal_id: &str, is_favorite: bool) -> Result<bool> {
        validation::check_animal_id(animal_id)?;
        if is_favorite {
            self.users.remove_favorite(uid, animal_id).await?;
        } else {
            self.users.add_favorite(uid, animal_id).await?;
        }
        Ok(!is_favorite)
    }

    pub async fn update_education_level(&self, uid: &str, level: EducationLevel) -> Result<UserProfile> {
        let mut profile = self.users.fetch_profile(uid).await?;
        profile.education_level = Some(level);
        self.users.update_profile(&profile).await?;
        tracing::info!(uid, level = %level, "Education level updated");
        Ok(profile)
    }

    pub async fn update_profile(&self, uid: &str, username: &str, level: EducationLevel) -> Result<UserProfile> {
        validation::check_username(username)?;
        self.users
            .update_username_and_level(uid, username.trim(), level)
            .await?;
        self.users.fetch_profile(uid).await
    }

    pub async fn set_profile_picture_url(&self, uid: &str, url: &str) -> Result<()> {
        self.users.set_profile_picture_url(uid, url).await
    }

    pub async fn change_password(&self, current: &str, new: &str, confirm: &str) -> Result<()> {
        validation::check_password_change(current, new, confirm)?;
        self.accounts.change_password(current, new).await
    }

    pub async fn add_xp(&self, uid: &str, amount: i64) -> Result<i64> {
        self.users.add_xp(uid, amount).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::InMemoryAuth;
    use crate::error::{Error, ValidationError};
    use crate::store::InMemoryStore;
    use crate::store::seed::{BUNDLED_ANIMALS, seed_animals};

    struct Fixture {
        auth: Arc<InMemoryAuth>,
        store: Arc<InMemoryStore>,
        ops: Operations,
    }

    async fn fixture() -> Fixture {
        let auth = Arc::new(InMemoryAuth::new());
        let store = Arc::new(InMemoryStore::new());
        seed_animals(&*store, BUNDLED_ANIMALS).await.unwrap();
        let ops = Operations::new(store.clone(), auth.clone());
        Fixture { auth, store, ops }
    }

    #[tokio::test]
    async fn test_blank_credentials_never_reach_provider() {
        let f = fixture().await;
        for (email, password) in [("", "secret1"), ("a@b.co", ""), ("   ", "   ")] {
            assert_eq!(
                f.ops.sign_in(email, password).await,
                Err(Error::Validation(ValidationError::EmptyCredentials))
            );
            assert_eq!(
                f.ops.sign_up(email, password, "budi", EducationLevel::Sd).await,
                Err(Error::Validation(ValidationError::EmptyCredentials))
            );
        }
        assert_eq!(f.auth.call_count(), 0);
    }

    #[tokio::test]
    async fn test_sign_up_rejections_are_distinct() {
        let f = fixture().await;
        assert_eq!(
            f.ops.sign_up("a@b.co", "123", "a", EducationLevel::Sd).await,
            Err(Error::Validation(ValidationError::PasswordTooShort))
        );
        assert_eq!(
            f.ops.sign_up("not-an-email", "secret1", "a", EducationLevel::Sd).await,
            Err(Error::Validation(ValidationError::InvalidEmail))
        );
        assert_eq!(f.auth.call_count(), 0);
    }

    #[tokio::test]
    async fn test_valid_sign_up_calls_provider_once() {
        let f = fixture().await;
        assert!(f.ops.sign_up("a@b.co", "secret1", "a", EducationLevel::Sd).await.is_ok());
        assert_eq!(f.auth.call_count(), 1);

        f.ops.sign_out().await;
        f.auth.fail_next("network down");
        assert_eq!(
            f.ops.sign_up("c@d.co", "secret1", "c", EducationLevel::Sd).await,
            Err(Error::Backend("network down".into()))
        );
        assert_eq!(f.auth.call_count(), 2);
    }

    #[tokio::test]
    async fn test_animal_detail() {
        let f = fixture().await;
        assert_eq!(
            f.ops.animal_detail("  ").await,
            Err(Error::Validation(ValidationError::EmptyAnimalId))
        );
        assert_eq!(f.store.operation_count(), 5);

        let animal = f.ops.animal_detail("komodo_dragon").await.unwrap();
        assert_eq!(animal.category, "reptile");
        assert_eq!(f.ops.animals_by_category("mammal").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_toggle_favorite_twice_restores_set() {
        let f = fixture().await;
        let profile = f
            .ops
            .sign_up("a@b.co", "secret1", "a", EducationLevel::Smp)
            .await
            .unwrap();
        let before = f.ops.favorite_ids(&profile.uid).await.unwrap();

        assert!(f.ops.toggle_favorite(&profile.uid, "komodo_dragon", false).await.unwrap());
        assert_eq!(f.ops.favorite_ids(&profile.uid).await.unwrap(), vec!["komodo_dragon"]);
        assert!(!f.ops.toggle_favorite(&profile.uid, "komodo_dragon", true).await.unwrap());
        assert_eq!(f.ops.favorite_ids(&profile.uid).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_profile_updates() {
        let f = fixture().await;
        let profile = f
            .ops
            .sign_up("a@b.co", "secret1", "a", EducationLevel::Sd)
            .await
            .unwrap();

        let updated = f.ops.update_education_level(&profile.uid, EducationLevel::Sma).await.unwrap();
        assert_eq!(updated.education_level, Some(EducationLevel::Sma));

        assert_eq!(
            f.ops.update_profile(&profile.uid, " ", EducationLevel::Sd).await,
            Err(Error::Validation(ValidationError::EmptyUsername))
        );
        let renamed = f
            .ops
            .update_profile(&profile.uid, "budi", EducationLevel::Smp)
            .await
            .unwrap();
        assert_eq!(renamed.username, "budi");
        assert_eq!(renamed.education_level, Some(EducationLevel::Smp));

        f.ops
            .set_profile_picture_url(&profile.uid, "https://img.faunadex.id/a.png")
            .await
            .unwrap();
        assert_eq!(f.ops.add_xp(&profile.uid, 10).await.unwrap(), 10);
        let reloaded = f.ops.user_profile(&profile.uid).await.unwrap();
        assert_eq!(reloaded.total_xp, 10);
        assert_eq!(
            reloaded.profile_picture_url.as_deref(),
            Some("https://img.faunadex.id/a.png")
        );
        assert_eq!(reloaded.username, "budi");
    }

    #[tokio::test]
    async fn test_change_password_checks_first() {
        let f = fixture().await;
        f.ops.sign_up("a@b.co", "secret1", "a", EducationLevel::Sd).await.unwrap();
        assert_eq!(
            f.ops.change_password("secret1", "secret2", "secret3").await,
            Err(Error::Validation(ValidationError::PasswordMismatch))
        );
        f.ops.change_password("secret1", "secret2", "secret2").await.unwrap();
    }
}
