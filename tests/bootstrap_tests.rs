//! End-to-end tests for the profile bootstrap routine against the in-memory
//! store, including failure injection for the retry contract.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use profilectl::models::{DEFAULT_CREDITS, DEFAULT_PLAN_DAYS, Identity, Plan, ProfilePatch, UserProfile};
use profilectl::services::{BootstrapError, ProfileBootstrapper, RetryPolicy};
use profilectl::store::{InsertError, MemoryRecordStore, RecordStore, StoreError};

/// Wraps the in-memory store, counting calls and failing the first
/// `fail_first` of them with a transport error.
struct FlakyStore {
    inner: MemoryRecordStore,
    get_calls: AtomicU32,
    insert_calls: AtomicU32,
    fail_first: u32,
    total_calls: AtomicU32,
}

impl FlakyStore {
    fn new(fail_first: u32) -> Self {
        Self {
            inner: MemoryRecordStore::new(),
            get_calls: AtomicU32::new(0),
            insert_calls: AtomicU32::new(0),
            fail_first,
            total_calls: AtomicU32::new(0),
        }
    }

    fn get_calls(&self) -> u32 {
        self.get_calls.load(Ordering::SeqCst)
    }

    fn insert_calls(&self) -> u32 {
        self.insert_calls.load(Ordering::SeqCst)
    }

    fn maybe_fail(&self) -> Result<(), StoreError> {
        let n = self.total_calls.fetch_add(1, Ordering::SeqCst);
        if n < self.fail_first {
            Err(StoreError::Transport("injected failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RecordStore for FlakyStore {
    async fn get(&self, id: &str) -> Result<Option<UserProfile>, StoreError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.maybe_fail()?;
        self.inner.get(id).await
    }

    async fn insert(&self, profile: &UserProfile) -> Result<UserProfile, InsertError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.maybe_fail()?;
        self.inner.insert(profile).await
    }

    async fn update(
        &self,
        id: &str,
        patch: &ProfilePatch,
    ) -> Result<Option<UserProfile>, StoreError> {
        self.maybe_fail()?;
        self.inner.update(id, patch).await
    }
}

/// Simulates losing the creation race: the first lookup reports the row as
/// absent even though a concurrent caller has already created it, so the
/// subsequent insert hits the uniqueness constraint.
struct RacingStore {
    inner: MemoryRecordStore,
    misses_left: AtomicU32,
}

impl RacingStore {
    fn new(inner: MemoryRecordStore) -> Self {
        Self {
            inner,
            misses_left: AtomicU32::new(1),
        }
    }
}

#[async_trait]
impl RecordStore for RacingStore {
    async fn get(&self, id: &str) -> Result<Option<UserProfile>, StoreError> {
        if self
            .misses_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Ok(None);
        }
        self.inner.get(id).await
    }

    async fn insert(&self, profile: &UserProfile) -> Result<UserProfile, InsertError> {
        self.inner.insert(profile).await
    }

    async fn update(
        &self,
        id: &str,
        patch: &ProfilePatch,
    ) -> Result<Option<UserProfile>, StoreError> {
        self.inner.update(id, patch).await
    }
}

fn no_delay() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::ZERO,
    }
}

#[tokio::test]
async fn first_access_creates_profile_with_defaults() {
    let bootstrapper = ProfileBootstrapper::new(MemoryRecordStore::new());
    let identity = Identity::new("u1").with_email("jo@x.com");

    let profile = bootstrapper.ensure_profile(&identity).await.unwrap();

    assert_eq!(profile.id, "u1");
    assert_eq!(profile.email, "jo@x.com");
    assert_eq!(profile.full_name, Some("jo".to_string()));
    assert_eq!(profile.plan, Plan::Free);
    assert_eq!(profile.credits_find, DEFAULT_CREDITS);
    assert_eq!(profile.credits_verify, DEFAULT_CREDITS);

    let expiry = profile.plan_expiry.expect("new profile has a plan expiry");
    let expected = chrono::Utc::now() + chrono::Duration::days(DEFAULT_PLAN_DAYS);
    assert!((expected - expiry).num_seconds().abs() < 5);
}

#[tokio::test]
async fn bootstrap_is_idempotent() {
    let store = Arc::new(MemoryRecordStore::new());
    let identity = Identity::new("u1").with_email("jo@x.com");
    let bootstrapper = ProfileBootstrapper::new(Arc::clone(&store));

    let first = bootstrapper.ensure_profile(&identity).await.unwrap();
    let second = bootstrapper.ensure_profile(&identity).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.created_at, second.created_at);
    assert_eq!(second.full_name, Some("jo".to_string()));

    // Two calls, still exactly one row.
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn invalid_input_makes_zero_store_calls() {
    let store = Arc::new(FlakyStore::new(0));
    let bootstrapper = ProfileBootstrapper::new(Arc::clone(&store));

    let err = bootstrapper
        .ensure_profile(&Identity::new(""))
        .await
        .unwrap_err();
    assert!(matches!(err, BootstrapError::InvalidInput(_)));

    let err = bootstrapper
        .ensure_profile_with_retry(&Identity::new(""))
        .await
        .unwrap_err();
    assert!(matches!(err, BootstrapError::InvalidInput(_)));

    assert_eq!(store.get_calls(), 0);
    assert_eq!(store.insert_calls(), 0);
}

#[tokio::test]
async fn lookup_error_does_not_trigger_creation() {
    // Every call fails, so the first lookup errors out. Creation must not be
    // attempted: a store failure is not the same thing as an absent row.
    let store = Arc::new(FlakyStore::new(u32::MAX));
    let bootstrapper = ProfileBootstrapper::new(Arc::clone(&store));

    let err = bootstrapper
        .ensure_profile(&Identity::new("u1"))
        .await
        .unwrap_err();

    assert!(matches!(err, BootstrapError::Store(StoreError::Transport(_))));
    assert_eq!(store.get_calls(), 1);
    assert_eq!(store.insert_calls(), 0);
}

#[tokio::test]
async fn lost_insert_race_returns_winning_row() {
    let inner = MemoryRecordStore::new();
    let winner = inner
        .insert(&UserProfile::new_for(
            &Identity::new("u1").with_email("first@x.com").with_name("Winner"),
        ))
        .await
        .unwrap();

    let store = RacingStore::new(inner);
    let bootstrapper = ProfileBootstrapper::new(store);

    let identity = Identity::new("u1").with_email("second@x.com");
    let profile = bootstrapper.ensure_profile(&identity).await.unwrap();

    // The pre-existing row wins; the loser's identity data is discarded.
    assert_eq!(profile.full_name, Some("Winner".to_string()));
    assert_eq!(profile.email, "first@x.com");
    assert_eq!(profile.created_at, winner.created_at);
}

#[tokio::test]
async fn retry_exhaustion_fails_with_attempt_count() {
    let store = Arc::new(FlakyStore::new(u32::MAX));
    let bootstrapper = ProfileBootstrapper::new(Arc::clone(&store)).with_retry_policy(no_delay());

    let err = bootstrapper
        .ensure_profile_with_retry(&Identity::new("u1"))
        .await
        .unwrap_err();

    match err {
        BootstrapError::Failed { attempts, last } => {
            assert_eq!(attempts, 3);
            assert!(matches!(last, StoreError::Transport(_)));
        }
        other => panic!("expected Failed, got {other:?}"),
    }

    // One lookup per attempt, never an insert.
    assert_eq!(store.get_calls(), 3);
    assert_eq!(store.insert_calls(), 0);
}

#[tokio::test]
async fn retry_succeeds_after_transient_failures() {
    // First two calls fail, so attempts 1 and 2 error out and attempt 3
    // completes the lookup-then-insert sequence.
    let store = Arc::new(FlakyStore::new(2));
    let bootstrapper = ProfileBootstrapper::new(Arc::clone(&store)).with_retry_policy(no_delay());

    let identity = Identity::new("u1").with_email("jo@x.com");
    let profile = bootstrapper
        .ensure_profile_with_retry(&identity)
        .await
        .unwrap();

    assert_eq!(profile.id, "u1");
    assert_eq!(store.get_calls(), 3);
    assert_eq!(store.insert_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn backoff_is_linear_in_attempt_number() {
    let store = FlakyStore::new(u32::MAX);
    let bootstrapper = ProfileBootstrapper::new(store).with_retry_policy(RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_secs(1),
    });

    let start = tokio::time::Instant::now();
    let err = bootstrapper
        .ensure_profile_with_retry(&Identity::new("u1"))
        .await
        .unwrap_err();
    assert!(matches!(err, BootstrapError::Failed { .. }));

    // 1 x base after attempt 1, 2 x base after attempt 2, nothing after the
    // final attempt.
    assert_eq!(start.elapsed(), Duration::from_secs(3));
}
