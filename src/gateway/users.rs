//! User profile reads and writes

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Value, json};

use crate::error::{Error, Result};
use crate::model::{EducationLevel, UserProfile};
use crate::store::{DocumentStore, Fields, USERS};

const FAVORITES_FIELD: &str = "favorite_animal_ids";

#[derive(Clone)]
pub struct UserGateway {
    store: Arc<dyn DocumentStore>,
}

impl UserGateway {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Write a fresh profile, stamping `joined_at` with the current time
    pub async fn create_profile(&self, profile: &UserProfile) -> Result<()> {
        let mut fields = profile.to_fields();
        fields.insert("joined_at".into(), Value::String(Utc::now().to_rfc3339()));
        fields.insert(FAVORITES_FIELD.into(), Value::Array(Vec::new()));

        self.store
            .set(USERS, &profile.uid, fields)
            .await
            .inspect_err(|e| tracing::error!(uid = %profile.uid, error = %e, "Creating profile failed"))?;
        tracing::info!(uid = %profile.uid, "Profile created");
        Ok(())
    }

    pub async fn fetch_profile(&self, uid: &str) -> Result<UserProfile> {
        let document = self
            .store
            .get(USERS, uid)
            .await?
            .ok_or_else(|| Error::not_found(USERS, uid))?;
        let profile = UserProfile::from_document(&document)?;
        tracing::debug!(
            uid,
            username = %profile.username,
            level = ?profile.education_level,
            xp = profile.total_xp,
            "Profile loaded"
        );
        Ok(profile)
    }

    /// Merge the profile's fields into the stored document. Favorites are
    /// not part of the write.
    pub async fn update_profile(&self, profile: &UserProfile) -> Result<()> {
        self.store
            .update(USERS, &profile.uid, profile.to_fields())
            .await
            .inspect_err(|e| tracing::error!(uid = %profile.uid, error = %e, "Updating profile failed"))
    }

    pub async fn update_username_and_level(
        &self,
        uid: &str,
        username: &str,
        level: EducationLevel,
    ) -> Result<()> {
        let mut fields = Fields::new();
        fields.insert("username".into(), json!(username));
        fields.insert("education_level".into(), json!(level.as_str()));
        self.store.update(USERS, uid, fields).await
    }

    pub async fn set_profile_picture_url(&self, uid: &str, url: &str) -> Result<()> {
        let mut fields = Fields::new();
        fields.insert("profile_picture_url".into(), json!(url));
        self.store.update(USERS, uid, fields).await?;
        tracing::info!(uid, "Profile picture updated");
        Ok(())
    }

    /// Add experience points, returning the new total
    pub async fn add_xp(&self, uid: &str, amount: i64) -> Result<i64> {
        let profile = self.fetch_profile(uid).await?;
        let total = profile.total_xp.saturating_add(amount).max(0);

        let mut fields = Fields::new();
        fields.insert("total_xp".into(), json!(total));
        self.store.update(USERS, uid, fields).await?;
        tracing::info!(uid, amount, total, "Experience added");
        Ok(total)
    }

    pub async fn add_favorite(&self, uid: &str, animal_id: &str) -> Result<()> {
        self.store
            .array_union(USERS, uid, FAVORITES_FIELD, json!(animal_id))
            .await
            .inspect_err(|e| tracing::error!(uid, animal_id, error = %e, "Adding favorite failed"))?;
        tracing::debug!(uid, animal_id, "Added animal to favorites");
        Ok(())
    }

    pub async fn remove_favorite(&self, uid: &str, animal_id: &str) -> Result<()> {
        self.store
            .array_remove(USERS, uid, FAVORITES_FIELD, json!(animal_id))
            .await
            .inspect_err(|e| tracing::error!(uid, animal_id, error = %e, "Removing favorite failed"))?;
        tracing::debug!(uid, animal_id, "Removed animal from favorites");
        Ok(())
    }

    /// Favorite ids of `uid`; a user without a document has none
    pub async fn favorite_ids(&self, uid: &str) -> Result<Vec<String>> {
        let Some(document) = self.store.get(USERS, uid).await? else {
            return Ok(Vec::new());
        };
        let ids = document.get_string_list(FAVORITES_FIELD)?;
        tracing::debug!(uid, count = ids.len(), "Favorites loaded");
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    fn profile(uid: &str) -> UserProfile {
        UserProfile {
            uid: uid.into(),
            email: format!("{}@faunadex.id", uid),
            username: uid.into(),
            education_level: Some(EducationLevel::Smp),
            ..UserProfile::default()
        }
    }

    fn gateway() -> (Arc<InMemoryStore>, UserGateway) {
        let store = Arc::new(InMemoryStore::new());
        (store.clone(), UserGateway::new(store))
    }

    #[tokio::test]
    async fn test_create_then_fetch() {
        let (_store, users) = gateway();
        users.create_profile(&profile("budi")).await.unwrap();

        let loaded = users.fetch_profile("budi").await.unwrap();
        assert_eq!(loaded.email, "budi@faunadex.id");
        assert!(loaded.joined_at.is_some());
        assert!(loaded.favorites.is_empty());
    }

    #[tokio::test]
    async fn test_missing_profile_is_not_found() {
        let (_store, users) = gateway();
        assert!(matches!(
            users.fetch_profile("ghost").await,
            Err(Error::NotFound { .. })
        ));
        assert!(users.favorite_ids("ghost").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_keeps_favorites() {
        let (_store, users) = gateway();
        users.create_profile(&profile("budi")).await.unwrap();
        users.add_favorite("budi", "komodo_dragon").await.unwrap();

        let mut changed = users.fetch_profile("budi").await.unwrap();
        changed.education_level = Some(EducationLevel::Sma);
        users.update_profile(&changed).await.unwrap();

        let loaded = users.fetch_profile("budi").await.unwrap();
        assert_eq!(loaded.education_level, Some(EducationLevel::Sma));
        assert!(loaded.favorites.contains("komodo_dragon"));
    }

    #[tokio::test]
    async fn test_favorites_add_remove() {
        let (_store, users) = gateway();
        users.create_profile(&profile("budi")).await.unwrap();

        users.add_favorite("budi", "a").await.unwrap();
        users.add_favorite("budi", "b").await.unwrap();
        users.add_favorite("budi", "a").await.unwrap();
        assert_eq!(users.favorite_ids("budi").await.unwrap(), vec!["a", "b"]);

        users.remove_favorite("budi", "a").await.unwrap();
        assert_eq!(users.favorite_ids("budi").await.unwrap(), vec!["b"]);
    }

    #[tokio::test]
    async fn test_partial_updates() {
        let (_store, users) = gateway();
        users.create_profile(&profile("budi")).await.unwrap();

        users
            .update_username_and_level("budi", "budi_s", EducationLevel::Sd)
            .await
            .unwrap();
        users.set_profile_picture_url("budi", "https://img/budi.jpg").await.unwrap();
        assert_eq!(users.add_xp("budi", 50).await.unwrap(), 50);

        let loaded = users.fetch_profile("budi").await.unwrap();
        assert_eq!(loaded.username, "budi_s");
        assert_eq!(loaded.education_level, Some(EducationLevel::Sd));
        assert_eq!(loaded.profile_picture_url.as_deref(), Some("https://img/budi.jpg"));
        assert_eq!(loaded.total_xp, 50);
    }
}
