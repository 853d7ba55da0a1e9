//! Error types for the onboarding core.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Profile store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Profile store unavailable: {0}")]
    Unavailable(String),

    #[error("Permission denied for profile {uid}")]
    PermissionDenied { uid: String },

    #[error("Profile not found: {uid}")]
    NotFound { uid: String },

    #[error("Malformed profile document {uid}: {reason}")]
    Malformed { uid: String, reason: String },

    #[error("{field} '{value}' is already taken")]
    Conflict { field: String, value: String },
}

/// Failure outcome of a reconciliation or onboarding-completion attempt.
#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    /// The store reported an onboarding state that maps to no flags.
    #[error("Classification failed: {reason}")]
    Classification { reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Unexpected failure: {0}")]
    Unknown(#[from] anyhow::Error),
}

impl OnboardingError {
    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Stable snake_case identifier, used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Classification { .. } => "classification_error",
            Self::Store(StoreError::Unavailable(_)) => "store_unavailable",
            Self::Store(StoreError::PermissionDenied { .. }) => "permission_denied",
            Self::Store(StoreError::NotFound { .. }) => "not_found",
            Self::Store(StoreError::Malformed { .. }) => "malformed_profile",
            Self::Store(StoreError::Conflict { .. }) => "conflict",
            Self::Validation { .. } => "validation_error",
            Self::Unknown(_) => "unknown_error",
        }
    }
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
