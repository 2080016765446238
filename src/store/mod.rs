//! Record-store capability for the hosted profiles table.
//!
//! The core never talks to the backend directly; it goes through the
//! [`RecordStore`] trait so callers can inject the HTTP client, the
//! in-memory table, or anything else that honors the same contract.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ProfilePatch, UserProfile};

pub mod http;
pub mod memory;

pub use http::HttpRecordStore;
pub use memory::MemoryRecordStore;

/// Failures from the hosted backend that are not part of normal control
/// flow. "Row absent" is never one of these: lookups report absence as
/// `Ok(None)`, and a duplicate insert reports [`InsertError::UniqueViolation`].
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(String),

    #[error("store rejected request: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("failed to decode store response: {0}")]
    Decode(String),
}

/// Insert outcome. The uniqueness constraint on the profiles table is the
/// only cross-caller coordination mechanism, so losing the insert race is an
/// expected result, kept distinct from real store failures.
#[derive(Debug, Clone, Error)]
pub enum InsertError {
    #[error("duplicate key: {0}")]
    UniqueViolation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Point operations on the profiles table, keyed by profile id.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Point lookup. `Ok(None)` means the row does not exist.
    async fn get(&self, id: &str) -> Result<Option<UserProfile>, StoreError>;

    /// Inserts a new row and returns it as persisted (timestamps stamped).
    async fn insert(&self, profile: &UserProfile) -> Result<UserProfile, InsertError>;

    /// Applies a partial update. `Ok(None)` means no row matched the id.
    async fn update(
        &self,
        id: &str,
        patch: &ProfilePatch,
    ) -> Result<Option<UserProfile>, StoreError>;
}

#[async_trait]
impl<S: RecordStore + ?Sized> RecordStore for Arc<S> {
    async fn get(&self, id: &str) -> Result<Option<UserProfile>, StoreError> {
        (**self).get(id).await
    }

    async fn insert(&self, profile: &UserProfile) -> Result<UserProfile, InsertError> {
        (**self).insert(profile).await
    }

    async fn update(
        &self,
        id: &str,
        patch: &ProfilePatch,
    ) -> Result<Option<UserProfile>, StoreError> {
        (**self).update(id, patch).await
    }
}
