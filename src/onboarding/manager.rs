//! OnboardingManager — collects the fields a user still owes after sign-in
//! and re-runs reconciliation once they are written.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::model::UserProfile;
use super::reconcile::Reconciler;
use super::state::OnboardingFlags;
use super::validate::{normalize_phone_number, normalize_username};
use crate::auth::Principal;
use crate::config::UsernamePolicy;
use crate::error::OnboardingError;
use crate::store::ProfileStore;

/// What the client should ask for next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NextStep {
    Username,
    PhoneNumber,
    None,
}

/// Onboarding status returned by the REST endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct OnboardingStatus {
    pub uid: String,
    pub flags: OnboardingFlags,
    pub complete: bool,
    pub next_step: NextStep,
}

impl OnboardingStatus {
    /// `flags` are as last persisted; `complete` and `next_step` follow the
    /// fields on file, so a write whose reconciliation failed still counts.
    fn from_profile(profile: &UserProfile) -> Self {
        let username_set = profile.username_is_set();
        let phone_number_set = profile.phone_number_is_set();
        let next_step = if !username_set {
            NextStep::Username
        } else if !phone_number_set {
            NextStep::PhoneNumber
        } else {
            NextStep::None
        };
        Self {
            uid: profile.uid.clone(),
            flags: profile.flags(),
            complete: username_set && phone_number_set,
            next_step,
        }
    }
}

/// Coordinates the username and phone number steps of onboarding.
pub struct OnboardingManager {
    reconciler: Arc<Reconciler>,
    store: Arc<dyn ProfileStore>,
    policy: UsernamePolicy,
}

impl OnboardingManager {
    pub fn new(
        reconciler: Arc<Reconciler>,
        store: Arc<dyn ProfileStore>,
        policy: UsernamePolicy,
    ) -> Self {
        Self {
            reconciler,
            store,
            policy,
        }
    }

    /// Validate and claim a username, then reconcile. The uid stays locked
    /// from the write until the reconciled profile is returned.
    pub async fn set_username(&self, uid: &str, raw: &str) -> Result<UserProfile, OnboardingError> {
        let username = normalize_username(raw, &self.policy).inspect_err(|e| {
            warn!(uid, error = %e, "Rejected username");
        })?;

        let guard = self.reconciler.lock(uid).await;
        self.store
            .claim_username(uid, &username)
            .await
            .inspect_err(|e| warn!(uid, %username, error = %e, "Failed to claim username"))?;
        info!(uid, %username, "Username claimed");

        self.reconciler
            .reconcile_locked(&Principal::new(uid), &guard)
            .await
    }

    /// Validate and store a phone number, then reconcile under the uid's lock.
    pub async fn set_phone_number(
        &self,
        uid: &str,
        raw: &str,
    ) -> Result<UserProfile, OnboardingError> {
        let phone_number = normalize_phone_number(raw).inspect_err(|e| {
            warn!(uid, error = %e, "Rejected phone number");
        })?;

        let guard = self.reconciler.lock(uid).await;
        self.store
            .set_phone_number(uid, &phone_number)
            .await
            .inspect_err(|e| warn!(uid, error = %e, "Failed to store phone number"))?;
        info!(uid, "Phone number stored");

        self.reconciler
            .reconcile_locked(&Principal::new(uid), &guard)
            .await
    }

    /// Current onboarding status.
    pub async fn status(&self, uid: &str) -> Result<OnboardingStatus, OnboardingError> {
        let profile = self.store.fetch_profile(uid).await?;
        Ok(OnboardingStatus::from_profile(&profile))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::auth::AuthState;
    use crate::error::StoreError;
    use crate::onboarding::state::OnboardingCategory;
    use crate::store::MemoryProfileStore;

    struct Fixture {
        manager: OnboardingManager,
        reconciler: Arc<Reconciler>,
        store: Arc<MemoryProfileStore>,
        auth: Arc<AuthState>,
    }

    /// Memory store whose profile reads take a while.
    struct SlowFetchStore {
        inner: MemoryProfileStore,
        delay: Duration,
    }

    #[async_trait]
    impl ProfileStore for SlowFetchStore {
        async fn upsert(&self, principal: &Principal) -> Result<OnboardingCategory, StoreError> {
            self.inner.upsert(principal).await
        }

        async fn persist_flags(&self, uid: &str, flags: OnboardingFlags) -> Result<(), StoreError> {
            self.inner.persist_flags(uid, flags).await
        }

        async fn fetch_profile(&self, uid: &str) -> Result<UserProfile, StoreError> {
            tokio::time::sleep(self.delay).await;
            self.inner.fetch_profile(uid).await
        }

        async fn claim_username(&self, uid: &str, username: &str) -> Result<(), StoreError> {
            self.inner.claim_username(uid, username).await
        }

        async fn set_phone_number(&self, uid: &str, phone_number: &str) -> Result<(), StoreError> {
            self.inner.set_phone_number(uid, phone_number).await
        }
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryProfileStore::new());
        let auth = AuthState::new();
        let reconciler = Arc::new(Reconciler::new(store.clone(), auth.clone()));
        let manager = OnboardingManager::new(
            Arc::clone(&reconciler),
            store.clone(),
            UsernamePolicy::default(),
        );
        Fixture {
            manager,
            reconciler,
            store,
            auth,
        }
    }

    #[tokio::test]
    async fn completing_both_fields_finishes_onboarding() {
        let f = fixture();
        f.reconciler.reconcile(&Principal::new("u1")).await.unwrap();

        let status = f.manager.status("u1").await.unwrap();
        assert_eq!(status.next_step, NextStep::Username);

        let profile = f.manager.set_username("u1", " Ada ").await.unwrap();
        assert_eq!(profile.username.as_deref(), Some("ada"));
        assert!(profile.has_username);
        assert_eq!(
            f.manager.status("u1").await.unwrap().next_step,
            NextStep::PhoneNumber
        );

        let profile = f
            .manager
            .set_phone_number("u1", "+1 415 555 0100")
            .await
            .unwrap();
        assert_eq!(profile.phone_number.as_deref(), Some("+14155550100"));

        let status = f.manager.status("u1").await.unwrap();
        assert!(status.complete);
        assert_eq!(status.next_step, NextStep::None);

        let snap = f.auth.snapshot();
        assert!(snap.data_loaded);
        assert_eq!(snap.local_user.unwrap().flags(), status.flags);
    }

    #[tokio::test]
    async fn invalid_username_never_reaches_the_store() {
        let f = fixture();
        f.reconciler.reconcile(&Principal::new("u1")).await.unwrap();

        let err = f.manager.set_username("u1", "no spaces").await.unwrap_err();
        assert_eq!(err.code(), "validation_error");
        assert_eq!(
            f.manager.status("u1").await.unwrap().next_step,
            NextStep::Username
        );
    }

    #[tokio::test]
    async fn taken_username_conflicts() {
        let f = fixture();
        f.reconciler.reconcile(&Principal::new("u1")).await.unwrap();
        f.reconciler.reconcile(&Principal::new("u2")).await.unwrap();

        f.manager.set_username("u1", "ada").await.unwrap();
        let err = f.manager.set_username("u2", "ADA").await.unwrap_err();
        assert!(matches!(
            err,
            OnboardingError::Store(StoreError::Conflict { .. })
        ));
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let f = fixture();
        let err = f
            .manager
            .set_phone_number("ghost", "+14155550100")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "not_found");
        assert!(!f.auth.snapshot().data_loaded);
    }

    #[tokio::test]
    async fn concurrent_renames_each_get_their_own_name() {
        let store = Arc::new(SlowFetchStore {
            inner: MemoryProfileStore::new(),
            delay: Duration::from_millis(30),
        });
        let auth = AuthState::new();
        let reconciler = Arc::new(Reconciler::new(store.clone(), auth));
        let manager = OnboardingManager::new(
            Arc::clone(&reconciler),
            store,
            UsernamePolicy::default(),
        );
        reconciler.reconcile(&Principal::new("u1")).await.unwrap();

        let (first, second) = tokio::join!(manager.set_username("u1", "alpha"), async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            manager.set_username("u1", "beta").await
        });

        assert_eq!(first.unwrap().username.as_deref(), Some("alpha"));
        assert_eq!(second.unwrap().username.as_deref(), Some("beta"));
    }

    #[tokio::test]
    async fn status_follows_fields_even_before_reconciliation() {
        let f = fixture();
        f.reconciler.reconcile(&Principal::new("u1")).await.unwrap();
        // Written without a follow-up reconciliation, so flags are stale.
        f.store.claim_username("u1", "ada").await.unwrap();

        let status = f.manager.status("u1").await.unwrap();
        assert!(!status.flags.has_username);
        assert_eq!(status.next_step, NextStep::PhoneNumber);
        assert!(!status.complete);
    }
}
