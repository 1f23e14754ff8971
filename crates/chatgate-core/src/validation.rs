//! Input validation for sign-up requests
//!
//! Lengths are counted in Unicode scalar values, not bytes, so a display
//! name like "Zoë" is three characters.

use crate::AuthError;
use serde::{Deserialize, Serialize};

/// Check that `value` has between `min` and `max` characters (inclusive)
///
/// The error message names `field` and both bounds so the client can show
/// it verbatim.
pub fn validate_length(
    field: &str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), AuthError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(AuthError::Validation(format!(
            "{field} must be between {min} and {max} characters long"
        )));
    }
    Ok(())
}

/// Check `value` against the default [`PasswordPolicy`]
pub fn validate_password(field: &str, value: &str) -> Result<(), AuthError> {
    PasswordPolicy::default().validate(field, value)
}

/// Minimum strength rules for new passwords
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordPolicy {
    /// Minimum number of characters (default: 8)
    pub min_length: usize,
    /// Maximum number of characters (default: 128), bounds hashing cost
    pub max_length: usize,
    /// Require at least one alphabetic character
    pub require_letter: bool,
    /// Require at least one ASCII digit
    pub require_digit: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            require_letter: true,
            require_digit: true,
        }
    }
}

impl PasswordPolicy {
    pub fn validate(&self, field: &str, value: &str) -> Result<(), AuthError> {
        let len = value.chars().count();

        if len < self.min_length {
            return Err(AuthError::Validation(format!(
                "{field} must be at least {} characters long",
                self.min_length
            )));
        }

        if len > self.max_length {
            return Err(AuthError::Validation(format!(
                "{field} must be at most {} characters long",
                self.max_length
            )));
        }

        if self.require_letter && !value.chars().any(char::is_alphabetic) {
            return Err(AuthError::Validation(format!(
                "{field} must contain at least one letter"
            )));
        }

        if self.require_digit && !value.chars().any(|c| c.is_ascii_digit()) {
            return Err(AuthError::Validation(format!(
                "{field} must contain at least one digit"
            )));
        }

        Ok(())
    }
}
