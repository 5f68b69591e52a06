//! User profile document

use chrono::Utc;
use uuid::Uuid;

use shared::{ProfileUpdate, PublicUser, UserProfile};

use crate::error::{AppError, AppResult};
use crate::services::storage::{load_typed, profile_key, save_typed, DocumentStore};

pub struct ProfileService<S> {
    store: S,
    key: String,
}

impl<S: DocumentStore> ProfileService<S> {
    pub fn new(store: S, user_id: Uuid) -> Self {
        Self {
            store,
            key: profile_key(user_id),
        }
    }

    pub async fn get(&self) -> AppResult<UserProfile> {
        load_typed(&self.store, &self.key)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile".to_string()))
    }

    /// Create the profile for a freshly signed-up user
    pub async fn seed(&self, user: &PublicUser) -> AppResult<UserProfile> {
        let profile = UserProfile::for_user(user, Utc::now());
        save_typed(&self.store, &self.key, &profile).await?;
        Ok(profile)
    }

    /// Load the profile, creating the default one if the document is missing.
    ///
    /// Runs on every login so an account whose signup-time seed failed still
    /// gets a profile before any token for it exists.
    pub async fn ensure(&self, user: &PublicUser) -> AppResult<UserProfile> {
        match load_typed(&self.store, &self.key).await? {
            Some(profile) => Ok(profile),
            None => {
                tracing::info!(user_id = %user.id, "Creating missing profile");
                self.seed(user).await
            }
        }
    }

    pub async fn update(&self, patch: ProfileUpdate) -> AppResult<UserProfile> {
        if let Some(name) = &patch.name {
            shared::validate_required(name).map_err(|m| AppError::validation("name", m))?;
        }

        let profile = self.get().await?.apply(patch);
        save_typed(&self.store, &self.key, &profile).await?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::services::storage::MemoryDocumentStore;

    fn user() -> PublicUser {
        PublicUser {
            id: Uuid::new_v4(),
            name: "Meena".to_string(),
            email_or_phone: "meena@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_seed_then_partial_update() {
        let user = user();
        let profiles = ProfileService::new(Arc::new(MemoryDocumentStore::default()), user.id);
        assert!(matches!(profiles.get().await, Err(AppError::NotFound(_))));

        profiles.seed(&user).await.unwrap();
        let updated = profiles
            .update(ProfileUpdate {
                farm_name: Some("Green Acres".to_string()),
                location: Some("Cuttack".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.name, "Meena");
        assert_eq!(updated.farm_name.as_deref(), Some("Green Acres"));

        let again = profiles
            .update(ProfileUpdate {
                phone: Some("9876543210".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(again.location.as_deref(), Some("Cuttack"));
        assert_eq!(profiles.get().await.unwrap(), again);
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected() {
        let user = user();
        let profiles = ProfileService::new(Arc::new(MemoryDocumentStore::default()), user.id);
        profiles.seed(&user).await.unwrap();
        let err = profiles
            .update(ProfileUpdate {
                name: Some("  ".to_string()),
                ..Default::default()
            })
            .await;
        assert!(matches!(err, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_ensure_creates_missing_profile_once() {
        let user = user();
        let store = Arc::new(MemoryDocumentStore::default());
        let profiles = ProfileService::new(store.clone(), user.id);

        let created = profiles.ensure(&user).await.unwrap();
        assert_eq!(created.email_or_phone, "meena@example.com");
        assert_eq!(store.writes(), 1);

        profiles
            .update(ProfileUpdate {
                farm_name: Some("Green Acres".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        let again = profiles.ensure(&user).await.unwrap();
        assert_eq!(again.farm_name.as_deref(), Some("Green Acres"));
        assert_eq!(store.writes(), 2);
    }
}
