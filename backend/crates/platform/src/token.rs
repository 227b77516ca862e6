//! Signed Session Tokens
//!
//! HS256 JSON Web Tokens carrying the user id and an expiry.
//!
//! Expiry is checked against the caller-supplied time rather than the
//! system clock so that verification stays deterministic under test.
//! Every failure (bad signature, malformed token, missing claims, expired)
//! collapses into [`TokenError`]; nothing fails open.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::{RngCore, rngs::OsRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Random HS256 secret for processes started without one configured
pub fn generate_secret(len: usize) -> Vec<u8> {
    let mut secret = vec![0u8; len];
    OsRng.fill_bytes(&mut secret);
    secret
}

/// Registered claims written into every token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id, as a decimal string
    pub sub: String,
    /// Issued-at, seconds since the epoch
    pub iat: i64,
    /// Expiry, seconds since the epoch
    pub exp: i64,
}

/// Token verification/issuance errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,

    #[error("Token is invalid")]
    Invalid,

    #[error("Token signing failed: {0}")]
    Signing(String),
}

/// A freshly issued token and its expiry
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// HS256 signer/verifier
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `subject`, valid from `now` for the configured TTL
    pub fn issue(&self, subject: i64, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify signature and expiry, returning the subject id
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<i64, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is enforced below against `now`
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data =
            decode::<Claims>(token, &self.decoding, &validation).map_err(|_| TokenError::Invalid)?;

        if data.claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        data.claims.sub.parse::<i64>().map_err(|_| TokenError::Invalid)
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new(b"test-secret-key-with-enough-bytes", Duration::days(7))
    }

    #[test]
    fn test_issue_and_verify() {
        let now = Utc::now();
        let issued = signer().issue(42, now).unwrap();

        assert_eq!(issued.expires_at, now + Duration::days(7));
        assert_eq!(signer().verify(&issued.token, now).unwrap(), 42);
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = Utc::now();
        let issued = signer().issue(42, now).unwrap();

        let later = now + Duration::days(7) + Duration::seconds(1);
        assert_eq!(
            signer().verify(&issued.token, later),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let now = Utc::now();
        let issued = signer().issue(42, now).unwrap();

        let other = TokenSigner::new(b"another-secret-entirely-different", Duration::days(7));
        assert_eq!(other.verify(&issued.token, now), Err(TokenError::Invalid));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let now = Utc::now();
        let issued = signer().issue(42, now).unwrap();

        let mut parts: Vec<&str> = issued.token.split('.').collect();
        parts[1] = "eyJzdWIiOiIxIiwiaWF0IjowLCJleHAiOjk5OTk5OTk5OTl9";
        let forged = parts.join(".");

        assert_eq!(signer().verify(&forged, now), Err(TokenError::Invalid));
    }

    #[test]
    fn test_generated_secrets_differ() {
        let a = generate_secret(32);
        assert_eq!(a.len(), 32);
        assert_ne!(a, generate_secret(32));
    }

    #[test]
    fn test_garbage_rejected() {
        let now = Utc::now();
        assert_eq!(signer().verify("", now), Err(TokenError::Invalid));
        assert_eq!(signer().verify("a.b.c", now), Err(TokenError::Invalid));
    }
}
