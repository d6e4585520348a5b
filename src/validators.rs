/// Input validation for usernames and passwords
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AuthError, Result};

// Letters (Latin or Cyrillic via \p{L}), digits and hyphens only
static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{L}0-9-]+$").expect("hardcoded username regex is invalid - fix source code")
});

/// Validate username shape: non-empty, letters, digits and hyphens only
pub fn validate_username(username: &str) -> bool {
    !username.is_empty() && username.len() <= 255 && USERNAME_REGEX.is_match(username)
}

pub fn check_username(username: &str) -> Result<()> {
    if validate_username(username) {
        Ok(())
    } else {
        Err(AuthError::Validation(
            "Name should contain only letters, digits and hyphens".to_string(),
        ))
    }
}

/// Validate password complexity:
/// - Minimum 8 characters
/// - Both an uppercase and a lowercase letter
/// - At least one non-alphanumeric character
pub fn check_password(password: &str) -> Result<()> {
    if password.chars().count() < 8 {
        return Err(AuthError::Validation(
            "Password should be at least 8 characters long".to_string(),
        ));
    }

    let has_uppercase = password.chars().any(|c| c.is_uppercase());
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    if !has_uppercase || !has_lowercase {
        return Err(AuthError::Validation(
            "Password should contain both uppercase and lowercase letters".to_string(),
        ));
    }

    if password.chars().all(|c| c.is_alphanumeric()) {
        return Err(AuthError::Validation(
            "Password should contain at least one special character".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_username() {
        assert!(validate_username("alice"));
        assert!(validate_username("alice-one"));
        assert!(validate_username("alice-1"));
        assert!(validate_username("user2"));
        assert!(validate_username("Алиса"));
    }

    #[test]
    fn test_invalid_username() {
        assert!(!validate_username(""));
        assert!(!validate_username("alice_1"));
        assert!(!validate_username("alice 1"));
        assert!(!validate_username("user@name"));
    }

    #[test]
    fn test_digit_username_passes_check() {
        assert!(check_username("alice-1").is_ok());
    }

    #[test]
    fn test_valid_password() {
        assert!(check_password("Abcdefg1!").is_ok());
        // No digit requirement
        assert!(check_password("Abcdefgh!").is_ok());
    }

    #[test]
    fn test_password_too_short() {
        assert!(matches!(
            check_password("Ab1!"),
            Err(AuthError::Validation(_))
        ));
    }

    #[test]
    fn test_password_single_case() {
        assert!(check_password("abcdefg1!").is_err());
        assert!(check_password("ABCDEFG1!").is_err());
    }

    #[test]
    fn test_password_no_special_char() {
        assert!(check_password("Abcdefg1").is_err());
    }
}
