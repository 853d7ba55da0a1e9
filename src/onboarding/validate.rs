//! Normalisation and validation of the fields collected during onboarding.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::UsernamePolicy;
use crate::error::OnboardingError;

static USERNAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9._]+$").expect("valid username regex"));

/// E.164: leading `+`, no leading zero, 7 to 15 digits in total.
static E164: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[1-9][0-9]{6,14}$").expect("valid phone regex"));

/// Trim and lowercase a username, then check it against `policy`.
pub fn normalize_username(raw: &str, policy: &UsernamePolicy) -> Result<String, OnboardingError> {
    let username = raw.trim().to_lowercase();
    let len = username.chars().count();

    if len < policy.min_len || len > policy.max_len {
        return Err(OnboardingError::validation(
            "username",
            format!(
                "must be between {} and {} characters",
                policy.min_len, policy.max_len
            ),
        ));
    }
    if !USERNAME_CHARS.is_match(&username) {
        return Err(OnboardingError::validation(
            "username",
            "may only contain letters, digits, '.' and '_'",
        ));
    }
    if username.starts_with('.') || username.ends_with('.') {
        return Err(OnboardingError::validation(
            "username",
            "may not start or end with '.'",
        ));
    }
    Ok(username)
}

/// Strip formatting characters and require an E.164 number.
pub fn normalize_phone_number(raw: &str) -> Result<String, OnboardingError> {
    let phone: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();

    if !E164.is_match(&phone) {
        return Err(OnboardingError::validation(
            "phone_number",
            "must be in international format, e.g. +14155550100",
        ));
    }
    Ok(phone)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> UsernamePolicy {
        UsernamePolicy::default()
    }

    #[test]
    fn username_is_trimmed_and_lowercased() {
        assert_eq!(normalize_username("  Ada_L ", &policy()).unwrap(), "ada_l");
        assert_eq!(normalize_username("a.b.c", &policy()).unwrap(), "a.b.c");
    }

    #[test]
    fn username_length_bounds() {
        assert!(normalize_username("ab", &policy()).is_err());
        assert!(normalize_username(&"a".repeat(25), &policy()).is_err());
        assert!(normalize_username(&"a".repeat(24), &policy()).is_ok());

        let narrow = UsernamePolicy {
            min_len: 5,
            max_len: 6,
        };
        assert!(normalize_username("abcd", &narrow).is_err());
        assert!(normalize_username("abcde", &narrow).is_ok());
    }

    #[test]
    fn username_rejects_bad_characters() {
        for bad in ["ada lovelace", "ada!", "ädä", "ada-l"] {
            let err = normalize_username(bad, &policy()).unwrap_err();
            assert_eq!(err.code(), "validation_error", "{bad}");
        }
        assert!(normalize_username(".ada", &policy()).is_err());
        assert!(normalize_username("ada.", &policy()).is_err());
    }

    #[test]
    fn phone_formatting_is_stripped() {
        assert_eq!(
            normalize_phone_number("+1 (415) 555-0100").unwrap(),
            "+14155550100"
        );
        assert_eq!(normalize_phone_number("+44.20.7946.0958").unwrap(), "+442079460958");
    }

    #[test]
    fn phone_must_be_e164() {
        for bad in ["4155550100", "+0123456789", "+1234", "+1234567890123456", "+1415abc0100"] {
            assert!(normalize_phone_number(bad).is_err(), "{bad}");
        }
    }
}
