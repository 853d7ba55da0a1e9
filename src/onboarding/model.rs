//! User profile document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::OnboardingFlags;
use crate::auth::Principal;

/// A user's profile as stored in the profile store.
///
/// Serialised in camelCase, the shape the store keeps documents in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Last flags persisted by reconciliation.
    #[serde(default)]
    pub has_username: bool,
    #[serde(default)]
    pub has_phone_number: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// A fresh profile for a first sign-in: claims copied, nothing onboarded.
    pub fn from_principal(principal: &Principal, now: DateTime<Utc>) -> Self {
        Self {
            uid: principal.uid.clone(),
            display_name: principal.display_name.clone(),
            email: principal.email.clone(),
            photo_url: principal.photo_url.clone(),
            username: None,
            phone_number: None,
            has_username: false,
            has_phone_number: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether a non-blank username is on file.
    pub fn username_is_set(&self) -> bool {
        is_present(&self.username)
    }

    /// Whether a non-blank phone number is on file.
    pub fn phone_number_is_set(&self) -> bool {
        is_present(&self.phone_number)
    }

    /// Flags as last persisted on this document.
    pub fn flags(&self) -> OnboardingFlags {
        OnboardingFlags {
            has_username: self.has_username,
            has_phone_number: self.has_phone_number,
        }
    }
}

fn is_present(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|v| !v.trim().is_empty())
}
