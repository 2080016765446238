//! Profile bootstrap-on-first-access.
//!
//! Guarantees a profile row exists for an authenticated identity: point
//! lookup, create with defaults on a miss, and fall back to the winning row
//! when a concurrent caller creates it first. The store's uniqueness
//! constraint on the id column is the only cross-caller coordination; the
//! bootstrapper itself holds no state between attempts.

use std::time::Duration;

use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::models::{Identity, UserProfile};
use crate::store::{InsertError, RecordStore, StoreError};

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BASE_DELAY_MS: u64 = 1000;

/// Errors surfaced by the bootstrapper.
///
/// Lookup misses and lost insert races never show up here; both are handled
/// inside [`ProfileBootstrapper::ensure_profile`].
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Malformed caller arguments. Surfaced immediately, never retried.
    #[error("invalid identity: {0}")]
    InvalidInput(String),

    /// A store failure from a single attempt.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// All retry attempts exhausted; carries the last store failure.
    #[error("bootstrap failed after {attempts} attempts: {last}")]
    Failed {
        attempts: u32,
        #[source]
        last: StoreError,
    },
}

/// Bounded-retry settings for [`ProfileBootstrapper::ensure_profile_with_retry`].
///
/// Backoff is linear: attempt N sleeps N x `base_delay` before the next try.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
        }
    }
}

pub struct ProfileBootstrapper<S> {
    store: S,
    retry: RetryPolicy,
}

impl<S: RecordStore> ProfileBootstrapper<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Ensures a profile row exists for `identity` and returns it.
    ///
    /// Idempotent: an existing row is returned unchanged. A lookup miss
    /// creates the row with the default plan, credits, and expiry window.
    /// A store failure during lookup propagates as-is and does not trigger
    /// creation; an absent row is only ever signalled by `Ok(None)` from
    /// the store.
    pub async fn ensure_profile(&self, identity: &Identity) -> Result<UserProfile, BootstrapError> {
        if identity.id.trim().is_empty() {
            return Err(BootstrapError::InvalidInput(
                "identity id must not be empty".to_string(),
            ));
        }

        if let Some(existing) = self.store.get(&identity.id).await? {
            debug!("Profile {} already exists", existing.id);
            return Ok(existing);
        }

        let fresh = UserProfile::new_for(identity);
        match self.store.insert(&fresh).await {
            Ok(created) => {
                info!(
                    "Created profile {} ({} find / {} verify credits)",
                    created.id, created.credits_find, created.credits_verify
                );
                Ok(created)
            }
            Err(InsertError::UniqueViolation(id)) => {
                // Lost the creation race; the winning row is authoritative.
                debug!("Profile {} created concurrently, re-fetching", id);
                self.store
                    .get(&identity.id)
                    .await?
                    .ok_or_else(|| {
                        // Duplicate key implies the row exists; a miss here is
                        // a transient inconsistency, reported as retryable.
                        StoreError::Transport(format!(
                            "profile {id} vanished after duplicate-key insert"
                        ))
                        .into()
                    })
            }
            Err(InsertError::Store(err)) => Err(err.into()),
        }
    }

    /// [`Self::ensure_profile`] wrapped in a bounded retry loop.
    ///
    /// Each attempt is an independent lookup-then-maybe-insert sequence.
    /// Only store failures are retried; invalid input fails immediately.
    pub async fn ensure_profile_with_retry(
        &self,
        identity: &Identity,
    ) -> Result<UserProfile, BootstrapError> {
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            match self.ensure_profile(identity).await {
                Ok(profile) => {
                    if attempt > 1 {
                        info!("Bootstrap for {} succeeded on attempt {}", profile.id, attempt);
                    }
                    return Ok(profile);
                }
                Err(BootstrapError::Store(err)) => {
                    if attempt >= self.retry.max_attempts {
                        warn!(
                            "Bootstrap for {} failed after {} attempts: {}",
                            identity.id, attempt, err
                        );
                        return Err(BootstrapError::Failed {
                            attempts: attempt,
                            last: err,
                        });
                    }

                    let delay = self.retry.base_delay * attempt;
                    warn!(
                        "Bootstrap attempt {}/{} for {} failed: {}. Retrying in {:?}",
                        attempt, self.retry.max_attempts, identity.id, err, delay
                    );
                    sleep(delay).await;
                }
                Err(other) => return Err(other),
            }
        }
    }
}
