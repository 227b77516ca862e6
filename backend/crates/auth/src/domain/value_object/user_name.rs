//! User Name Value Object
//!
//! The display name shown on listings and the seller badge. Not unique and
//! not used for login.

use serde::{Deserialize, Serialize};

/// Maximum display name length, in characters
pub const USER_NAME_MAX_LENGTH: usize = 100;

/// Display name value object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserName(String);

impl UserName {
    /// Trim and validate a display name
    pub fn new(name: impl AsRef<str>) -> Result<Self, &'static str> {
        let name = name.as_ref().trim();

        if name.is_empty() {
            return Err("Name is required");
        }

        if name.chars().count() > USER_NAME_MAX_LENGTH {
            return Err("Name must be at most 100 characters");
        }

        if name.chars().any(char::is_control) {
            return Err("Name contains invalid characters");
        }

        Ok(Self(name.to_string()))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_trimmed() {
        assert_eq!(UserName::new("  Ana Souza ").unwrap().as_str(), "Ana Souza");
    }

    #[test]
    fn test_name_rejects_blank_and_long() {
        assert!(UserName::new("").is_err());
        assert!(UserName::new("   ").is_err());
        assert!(UserName::new("x".repeat(101)).is_err());
        assert!(UserName::new("é".repeat(100)).is_ok());
    }

    #[test]
    fn test_name_rejects_control_characters() {
        assert!(UserName::new("Ana\u{0007}").is_err());
    }
}
