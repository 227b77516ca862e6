//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, field::FieldError, kind::ErrorKind};
use platform::token::TokenError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// No bearer header and no session cookie
    #[error("You are not logged in. Please log in to get access.")]
    MissingToken,

    /// Signature mismatch, malformed or expired token
    #[error("Invalid or expired token. Please log in again.")]
    InvalidToken,

    /// Token is valid but the user it names is gone
    #[error("The user belonging to this token no longer exists.")]
    TokenUserMissing,

    /// Account has been deactivated
    #[error("This account has been disabled.")]
    UserInactive,

    /// Login without email or password
    #[error("Please provide email and password")]
    MissingCredentials,

    /// Unknown email or wrong password (deliberately indistinguishable)
    #[error("Incorrect email or password")]
    InvalidCredentials,

    /// Password change without both passwords
    #[error("Please provide your current password and a new password")]
    MissingPasswords,

    /// Password change with a wrong current password
    #[error("Your current password is incorrect")]
    IncorrectCurrentPassword,

    /// Email already registered
    #[error("Email already in use")]
    EmailTaken,

    /// Profile update attempted to change the password
    #[error("This route is not for password updates. Please use /update-password.")]
    PasswordChangeNotAllowed,

    /// Authenticated but lacking the required role
    #[error("You do not have permission to perform this action")]
    Forbidden,

    /// Admin lookup of a missing user
    #[error("User not found")]
    UserNotFound,

    /// Input failed field validation
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::TokenUserMissing
            | AuthError::UserInactive
            | AuthError::InvalidCredentials
            | AuthError::IncorrectCurrentPassword => ErrorKind::Unauthenticated,
            AuthError::MissingCredentials
            | AuthError::MissingPasswords
            | AuthError::PasswordChangeNotAllowed
            | AuthError::Validation(_) => ErrorKind::Validation,
            AuthError::EmailTaken => ErrorKind::Conflict,
            AuthError::Forbidden => ErrorKind::Forbidden,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Convert to AppError
    pub fn into_app_error(self) -> AppError {
        match self {
            AuthError::Validation(errors) => {
                AppError::validation("Validation failed").with_field_errors(errors)
            }
            AuthError::Database(e) => AppError::from(e),
            other => AppError::new(other.kind(), other.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::TokenUserMissing => {
                tracing::warn!("Token presented for a user that no longer exists");
            }
            AuthError::UserInactive => {
                tracing::warn!("Request from a disabled account");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.into_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired | TokenError::Invalid => AuthError::InvalidToken,
            TokenError::Signing(msg) => AuthError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_failures_are_401() {
        for err in [
            AuthError::MissingToken,
            AuthError::InvalidToken,
            AuthError::TokenUserMissing,
            AuthError::UserInactive,
        ] {
            assert_eq!(err.kind().status_code(), 401);
        }
    }

    #[test]
    fn test_email_taken_is_400_conflict() {
        let app = AuthError::EmailTaken.into_app_error();
        assert_eq!(app.kind(), ErrorKind::Conflict);
        assert_eq!(app.status_code(), 400);
        assert_eq!(app.message(), "Email already in use");
    }

    #[test]
    fn test_validation_keeps_fields() {
        let app = AuthError::Validation(vec![FieldError::new("email", "Invalid email format")])
            .into_app_error();
        assert_eq!(app.field_errors()[0].field, "email");
    }

    #[test]
    fn test_token_errors_fail_closed() {
        assert!(matches!(
            AuthError::from(TokenError::Expired),
            AuthError::InvalidToken
        ));
        assert!(matches!(
            AuthError::from(TokenError::Invalid),
            AuthError::InvalidToken
        ));
    }
}
