//! Maintenance operations on existing profiles.
//!
//! Unlike bootstrap, these operate on rows the operator expects to exist,
//! so an absent row is an error here rather than a creation trigger.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use crate::models::{Plan, ProfilePatch, UserProfile};
use crate::store::{RecordStore, StoreError};

/// Errors specific to maintenance operations.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Profile not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct ProfileMaintenance<S> {
    store: S,
}

impl<S: RecordStore> ProfileMaintenance<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Fetches one profile by id.
    pub async fn get(&self, id: &str) -> Result<UserProfile, ProfileError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ProfileError::NotFound(id.to_string()))
    }

    /// Corrects a profile's display name.
    pub async fn set_full_name(&self, id: &str, name: &str) -> Result<UserProfile, ProfileError> {
        let patch = ProfilePatch {
            full_name: Some(name.to_string()),
            ..Default::default()
        };
        let updated = self.apply(id, &patch).await?;
        info!("Renamed profile {} to {:?}", id, name);
        Ok(updated)
    }

    /// Moves a profile to `plan` and stamps the new expiry.
    pub async fn set_plan(
        &self,
        id: &str,
        plan: Plan,
        expiry: DateTime<Utc>,
    ) -> Result<UserProfile, ProfileError> {
        let patch = ProfilePatch {
            plan: Some(plan),
            plan_expiry: Some(expiry),
            ..Default::default()
        };
        let updated = self.apply(id, &patch).await?;
        info!("Profile {} moved to plan {} until {}", id, plan, expiry);
        Ok(updated)
    }

    /// Adds credits to both meters. Read-modify-write: the current row is
    /// fetched first so the grant is additive, and the meters saturate
    /// instead of wrapping.
    pub async fn grant_credits(
        &self,
        id: &str,
        find: u32,
        verify: u32,
    ) -> Result<UserProfile, ProfileError> {
        let current = self.get(id).await?;

        let patch = ProfilePatch {
            credits_find: Some(current.credits_find.saturating_add(find)),
            credits_verify: Some(current.credits_verify.saturating_add(verify)),
            ..Default::default()
        };
        let updated = self.apply(id, &patch).await?;
        info!(
            "Granted {} find / {} verify credits to {} (now {}/{})",
            find, verify, id, updated.credits_find, updated.credits_verify
        );
        Ok(updated)
    }

    async fn apply(&self, id: &str, patch: &ProfilePatch) -> Result<UserProfile, ProfileError> {
        self.store
            .update(id, patch)
            .await?
            .ok_or_else(|| ProfileError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Identity;
    use crate::store::MemoryRecordStore;
    use chrono::Duration;

    async fn seeded_service() -> ProfileMaintenance<MemoryRecordStore> {
        let store = MemoryRecordStore::new();
        store
            .insert(&UserProfile::new_for(
                &Identity::new("u1").with_email("jo@x.com"),
            ))
            .await
            .unwrap();
        ProfileMaintenance::new(store)
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let service = ProfileMaintenance::new(MemoryRecordStore::new());
        let err = service.get("ghost").await.unwrap_err();
        assert!(matches!(err, ProfileError::NotFound(id) if id == "ghost"));
    }

    #[tokio::test]
    async fn rename_updates_only_the_name() {
        let service = seeded_service().await;
        let updated = service.set_full_name("u1", "Jo Smith").await.unwrap();

        assert_eq!(updated.full_name, Some("Jo Smith".to_string()));
        assert_eq!(updated.email, "jo@x.com");
        assert_eq!(updated.plan, Plan::Free);
    }

    #[tokio::test]
    async fn set_plan_stamps_expiry() {
        let service = seeded_service().await;
        let expiry = Utc::now() + Duration::days(30);
        let updated = service.set_plan("u1", Plan::Pro, expiry).await.unwrap();

        assert_eq!(updated.plan, Plan::Pro);
        assert_eq!(updated.plan_expiry, Some(expiry));
    }

    #[tokio::test]
    async fn grant_credits_is_additive() {
        let service = seeded_service().await;
        let updated = service.grant_credits("u1", 10, 5).await.unwrap();

        assert_eq!(updated.credits_find, 35);
        assert_eq!(updated.credits_verify, 30);
    }

    #[tokio::test]
    async fn grant_credits_saturates() {
        let service = seeded_service().await;
        let updated = service.grant_credits("u1", u32::MAX, 0).await.unwrap();

        assert_eq!(updated.credits_find, u32::MAX);
        assert_eq!(updated.credits_verify, 25);
    }

    #[tokio::test]
    async fn maintenance_on_missing_profile_fails() {
        let service = ProfileMaintenance::new(MemoryRecordStore::new());
        assert!(matches!(
            service.set_full_name("ghost", "x").await.unwrap_err(),
            ProfileError::NotFound(_)
        ));
        assert!(matches!(
            service.grant_credits("ghost", 1, 1).await.unwrap_err(),
            ProfileError::NotFound(_)
        ));
    }
}
