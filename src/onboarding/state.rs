//! Onboarding categories and the flags derived from them.

use serde::{Deserialize, Serialize};

use crate::error::OnboardingError;

/// Where a user stands in onboarding, as reported by the profile store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OnboardingCategory {
    NewUserNeedsBoth,
    ExistingUserNeedsBoth,
    ExistingUserNeedsUsername,
    ExistingUserNeedsNumber,
    ExistingUserCompletedOnboarding,
    /// The stored onboarding state could not be recognised.
    Error,
}

impl OnboardingCategory {
    /// Category of a profile that already exists, given which fields are set.
    pub fn for_existing(username_set: bool, phone_number_set: bool) -> Self {
        match (username_set, phone_number_set) {
            (false, false) => Self::ExistingUserNeedsBoth,
            (false, true) => Self::ExistingUserNeedsUsername,
            (true, false) => Self::ExistingUserNeedsNumber,
            (true, true) => Self::ExistingUserCompletedOnboarding,
        }
    }
}

impl std::fmt::Display for OnboardingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NewUserNeedsBoth => "NEW_USER_NEEDS_BOTH",
            Self::ExistingUserNeedsBoth => "EXISTING_USER_NEEDS_BOTH",
            Self::ExistingUserNeedsUsername => "EXISTING_USER_NEEDS_USERNAME",
            Self::ExistingUserNeedsNumber => "EXISTING_USER_NEEDS_NUMBER",
            Self::ExistingUserCompletedOnboarding => "EXISTING_USER_COMPLETED_ONBOARDING",
            Self::Error => "ERROR",
        };
        write!(f, "{s}")
    }
}

/// Whether the user has a username and a phone number on file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingFlags {
    pub has_username: bool,
    pub has_phone_number: bool,
}

impl OnboardingFlags {
    pub fn is_complete(&self) -> bool {
        self.has_username && self.has_phone_number
    }
}

/// Map a category to its flags. Fails only for [`OnboardingCategory::Error`].
pub fn classify(category: OnboardingCategory) -> Result<OnboardingFlags, OnboardingError> {
    use OnboardingCategory::*;
    let (has_username, has_phone_number) = match category {
        NewUserNeedsBoth | ExistingUserNeedsBoth => (false, false),
        ExistingUserNeedsUsername => (false, true),
        ExistingUserNeedsNumber => (true, false),
        ExistingUserCompletedOnboarding => (true, true),
        Error => {
            return Err(OnboardingError::Classification {
                reason: "Error finding state of username".to_string(),
            });
        }
    };
    Ok(OnboardingFlags {
        has_username,
        has_phone_number,
    })
}
