//! User Password Value Object
//!
//! Domain wrappers over `platform::password`. Hashing and verification are
//! explicit calls made by the use cases; nothing hashes implicitly on save.

use platform::password::{ClearTextPassword, HashedPassword, HashingCost};
use std::fmt;

use crate::error::{AuthError, AuthResult};

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Raw password from user input. Memory is zeroized when dropped.
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Create a new password, enforcing the policy (6-100 characters after
    /// NFKC, not blank, no control characters).
    ///
    /// The error is a user-facing message suitable for a field error.
    pub fn new(raw: String) -> Result<Self, String> {
        ClearTextPassword::new(raw)
            .map(Self)
            .map_err(|e| e.to_string())
    }

    /// Wrap a password supplied at login. No policy is applied: whatever the
    /// caller typed is verified as-is.
    pub fn for_verification(raw: String) -> Self {
        Self(ClearTextPassword::for_verification(raw))
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

/// Argon2id PHC string as stored in `users.password_hash`
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    /// Hash a validated password
    pub fn from_raw(
        raw: &RawPassword,
        cost: &HashingCost,
        pepper: Option<&[u8]>,
    ) -> AuthResult<Self> {
        raw.0
            .hash(cost, pepper)
            .map(Self)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Load from the database
    pub fn from_phc_string(phc_string: impl Into<String>) -> AuthResult<Self> {
        HashedPassword::from_phc_string(phc_string)
            .map(Self)
            .map_err(|_| AuthError::Internal("Invalid password hash in database".to_string()))
    }

    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    /// Constant-time verification through argon2
    pub fn verify(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.0.verify(&raw.0, pepper)
    }

    /// True when the stored parameters differ from `cost`
    pub fn needs_rehash(&self, cost: &HashingCost) -> bool {
        self.0.needs_rehash(cost)
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cost() -> HashingCost {
        HashingCost::fast()
    }

    #[test]
    fn test_raw_password_policy() {
        assert!(RawPassword::new("secret1".to_string()).is_ok());
        assert!(RawPassword::new("12345".to_string()).is_err());
        assert!(RawPassword::new("a".repeat(101)).is_err());
        assert!(RawPassword::new("      ".to_string()).is_err());
    }

    #[test]
    fn test_verification_skips_policy() {
        let raw = RawPassword::new("secret1".to_string()).unwrap();
        let hashed = UserPassword::from_raw(&raw, &cost(), None).unwrap();

        // Too short for the policy, but still just a wrong password
        assert!(!hashed.verify(&RawPassword::for_verification("abc".to_string()), None));
        assert!(hashed.verify(&RawPassword::for_verification("secret1".to_string()), None));
    }

    #[test]
    fn test_hash_with_pepper() {
        let raw = RawPassword::new("secret1".to_string()).unwrap();
        let hashed = UserPassword::from_raw(&raw, &cost(), Some(b"pepper")).unwrap();

        assert!(hashed.verify(&raw, Some(b"pepper")));
        assert!(!hashed.verify(&raw, None));
    }

    #[test]
    fn test_phc_string_roundtrip() {
        let raw = RawPassword::new("secret1".to_string()).unwrap();
        let hashed = UserPassword::from_raw(&raw, &cost(), None).unwrap();

        let restored = UserPassword::from_phc_string(hashed.as_phc_string()).unwrap();
        assert!(restored.verify(&raw, None));
        assert!(!restored.needs_rehash(&cost()));
        assert!(UserPassword::from_phc_string("not-a-hash").is_err());
    }

    #[test]
    fn test_debug_redaction() {
        let raw = RawPassword::new("SecretPassword".to_string()).unwrap();
        assert!(!format!("{:?}", raw).contains("Secret"));
    }
}
