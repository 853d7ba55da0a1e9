//! `ProfileStore` trait — the async interface to the remote profile store.

use async_trait::async_trait;

use crate::auth::Principal;
use crate::error::StoreError;
use crate::onboarding::model::UserProfile;
use crate::onboarding::state::{OnboardingCategory, OnboardingFlags};

/// Backend-agnostic profile store keyed by principal uid.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Register the principal if no profile exists, otherwise report where
    /// the existing profile stands in onboarding.
    async fn upsert(&self, principal: &Principal) -> Result<OnboardingCategory, StoreError>;

    /// Write both onboarding flags in a single update.
    async fn persist_flags(&self, uid: &str, flags: OnboardingFlags) -> Result<(), StoreError>;

    /// Fetch the full profile.
    async fn fetch_profile(&self, uid: &str) -> Result<UserProfile, StoreError>;

    /// Assign a username, failing with [`StoreError::Conflict`] if another
    /// user holds it.
    async fn claim_username(&self, uid: &str, username: &str) -> Result<(), StoreError>;

    /// Record the user's phone number.
    async fn set_phone_number(&self, uid: &str, phone_number: &str) -> Result<(), StoreError>;
}
