//! Configuration types.

use crate::error::ConfigError;

/// Bounds applied to usernames chosen during onboarding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsernamePolicy {
    /// Minimum length in characters, inclusive.
    pub min_len: usize,
    /// Maximum length in characters, inclusive.
    pub max_len: usize,
}

impl Default for UsernamePolicy {
    fn default() -> Self {
        Self {
            min_len: 3,
            max_len: 24,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port the HTTP harness listens on.
    pub port: u16,
    pub username: UsernamePolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            username: UsernamePolicy::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `LINKUP_*` environment variables, falling back
    /// to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = parse_var(&lookup, "LINKUP_PORT", defaults.port)?;
        let min_len = parse_var(&lookup, "LINKUP_USERNAME_MIN_LEN", defaults.username.min_len)?;
        let max_len = parse_var(&lookup, "LINKUP_USERNAME_MAX_LEN", defaults.username.max_len)?;

        if min_len == 0 || min_len > max_len {
            return Err(ConfigError::InvalidValue {
                key: "LINKUP_USERNAME_MIN_LEN".to_string(),
                message: format!("must be between 1 and LINKUP_USERNAME_MAX_LEN ({max_len})"),
            });
        }

        Ok(Self {
            port,
            username: UsernamePolicy { min_len, max_len },
        })
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("'{raw}': {e}"),
        }),
        None => Ok(default),
    }
}
