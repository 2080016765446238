//! In-memory record store.
//!
//! Backs the test suites and offline dry runs. Honors the same contract as
//! the hosted backend, including the uniqueness constraint on the id column
//! and the store-side `created_at` / `updated_at` stamping.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::{ProfilePatch, UserProfile};
use crate::store::{InsertError, RecordStore, StoreError};

#[derive(Default)]
pub struct MemoryRecordStore {
    rows: RwLock<HashMap<String, UserProfile>>,
}

impl MemoryRecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently in the table.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(&self, id: &str) -> Result<Option<UserProfile>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.get(id).cloned())
    }

    async fn insert(&self, profile: &UserProfile) -> Result<UserProfile, InsertError> {
        let mut rows = self.rows.write().await;

        if rows.contains_key(&profile.id) {
            return Err(InsertError::UniqueViolation(profile.id.clone()));
        }

        let now = Utc::now();
        let mut stored = profile.clone();
        stored.created_at = Some(now);
        stored.updated_at = Some(now);

        rows.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        id: &str,
        patch: &ProfilePatch,
    ) -> Result<Option<UserProfile>, StoreError> {
        let mut rows = self.rows.write().await;

        let Some(row) = rows.get_mut(id) else {
            return Ok(None);
        };

        if let Some(full_name) = &patch.full_name {
            row.full_name = Some(full_name.clone());
        }
        if let Some(plan) = patch.plan {
            row.plan = plan;
        }
        if let Some(plan_expiry) = patch.plan_expiry {
            row.plan_expiry = Some(plan_expiry);
        }
        if let Some(credits_find) = patch.credits_find {
            row.credits_find = credits_find;
        }
        if let Some(credits_verify) = patch.credits_verify {
            row.credits_verify = credits_verify;
        }
        row.updated_at = Some(Utc::now());

        Ok(Some(row.clone()))
    }
}
