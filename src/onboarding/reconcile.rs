//! Reconciler — brings a signed-in principal's onboarding flags in line with
//! the profile store and announces the loaded user.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::locks::{PrincipalGuard, PrincipalLocks};
use super::model::UserProfile;
use super::state::classify;
use crate::auth::{AuthObserver, Principal};
use crate::error::{OnboardingError, StoreError};
use crate::store::ProfileStore;

/// Sequences one reconciliation attempt per call.
pub struct Reconciler {
    store: Arc<dyn ProfileStore>,
    observer: Arc<dyn AuthObserver>,
    locks: PrincipalLocks,
}

impl Reconciler {
    pub fn new(store: Arc<dyn ProfileStore>, observer: Arc<dyn AuthObserver>) -> Self {
        Self {
            store,
            observer,
            locks: PrincipalLocks::new(),
        }
    }

    /// Take exclusive access to `uid`. Callers that write to a profile
    /// before reconciling it hold this across both, see [`Self::reconcile_locked`].
    pub async fn lock(&self, uid: &str) -> PrincipalGuard {
        self.locks.acquire(uid).await
    }

    /// Run the flow for `principal`:
    ///
    /// 1. Register-or-fetch the profile, yielding its onboarding category.
    /// 2. Classify the category into flags.
    /// 3. Persist both flags.
    /// 4. Fetch the full profile.
    /// 5. Publish it as the local user.
    /// 6. Raise the data-loaded flag.
    ///
    /// Any failure stops the sequence; nothing is published unless steps
    /// 1–4 all succeeded.
    pub async fn reconcile(&self, principal: &Principal) -> Result<UserProfile, OnboardingError> {
        if principal.uid.trim().is_empty() {
            warn!("Rejected reconciliation for blank uid");
            return Err(OnboardingError::validation("uid", "must not be blank"));
        }

        let guard = self.lock(&principal.uid).await;
        self.reconcile_locked(principal, &guard).await
    }

    /// Same as [`Self::reconcile`], under a guard the caller already holds
    /// for `principal.uid`.
    pub async fn reconcile_locked(
        &self,
        principal: &Principal,
        guard: &PrincipalGuard,
    ) -> Result<UserProfile, OnboardingError> {
        let attempt = Uuid::new_v4();
        let uid = principal.uid.as_str();

        if guard.uid() != uid {
            let err = OnboardingError::Unknown(anyhow::anyhow!(
                "guard for {} used to reconcile {}",
                guard.uid(),
                uid
            ));
            warn!(%attempt, uid, error = %err, "Reconciliation failed");
            return Err(err);
        }
        debug!(%attempt, uid, "Reconciliation started");

        let category = self
            .store
            .upsert(principal)
            .await
            .map_err(|e| store_failure(attempt, uid, "upsert", e))?;
        debug!(%attempt, uid, %category, "Onboarding category resolved");

        let flags = classify(category).inspect_err(|e| {
            warn!(%attempt, uid, step = "classify", %category, error = %e, "Reconciliation failed");
        })?;

        self.store
            .persist_flags(uid, flags)
            .await
            .map_err(|e| store_failure(attempt, uid, "persist_flags", e))?;

        let profile = self
            .store
            .fetch_profile(uid)
            .await
            .map_err(|e| store_failure(attempt, uid, "fetch_profile", e))?;

        if profile.uid != uid {
            let err = OnboardingError::Unknown(anyhow::anyhow!(
                "store returned profile {} for {}",
                profile.uid,
                uid
            ));
            warn!(%attempt, uid, step = "fetch_profile", error = %err, "Reconciliation failed");
            return Err(err);
        }

        self.observer.publish_local_user(profile.clone());
        self.observer.set_data_loaded(true);

        info!(
            %attempt,
            uid,
            has_username = flags.has_username,
            has_phone_number = flags.has_phone_number,
            "User data loaded"
        );
        Ok(profile)
    }
}

fn store_failure(attempt: Uuid, uid: &str, step: &'static str, err: StoreError) -> OnboardingError {
    warn!(%attempt, uid, step, error = %err, "Reconciliation failed");
    OnboardingError::Store(err)
}
