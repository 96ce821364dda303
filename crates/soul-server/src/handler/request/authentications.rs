//! Authentication request types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Shortest accepted username, counted after trimming.
const USERNAME_MIN_LENGTH: usize = 4;
/// Longest accepted username, counted after trimming.
const USERNAME_MAX_LENGTH: usize = 64;

/// Username and password sent to `/signup` and `/signin`.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
pub struct Credentials {
    /// Login name, surrounding whitespace is ignored.
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    /// Password of the account.
    #[validate(length(min = 8, max = 64))]
    pub password: String,
}

impl Credentials {
    /// Returns the username without surrounding whitespace.
    pub fn username(&self) -> &str {
        self.username.trim()
    }
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    let length = username.trim().chars().count();
    if (USERNAME_MIN_LENGTH..=USERNAME_MAX_LENGTH).contains(&length) {
        return Ok(());
    }

    let mut error = ValidationError::new("length");
    error.add_param("min".into(), &USERNAME_MIN_LENGTH);
    error.add_param("max".into(), &USERNAME_MAX_LENGTH);
    Err(error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_owned(),
            password: password.to_owned(),
        }
    }

    #[test]
    fn accepts_valid_credentials() {
        assert!(credentials("diarist", "password123").validate().is_ok());
    }

    #[test]
    fn username_is_trimmed_before_length_check() {
        let padded = credentials("   abc   ", "password123");
        assert!(padded.validate().is_err());

        let padded = credentials("  abcd  ", "password123");
        assert!(padded.validate().is_ok());
        assert_eq!(padded.username(), "abcd");
    }

    #[test]
    fn rejects_long_username() {
        let username = "u".repeat(65);
        assert!(credentials(&username, "password123").validate().is_err());
    }

    #[test]
    fn rejects_short_and_long_passwords() {
        assert!(credentials("diarist", "short").validate().is_err());
        assert!(credentials("diarist", &"p".repeat(65)).validate().is_err());
        assert!(credentials("diarist", &"p".repeat(64)).validate().is_ok());
    }
}
