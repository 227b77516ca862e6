//! Current User Extractor
//!
//! The request gate stores the authenticated user in the request
//! extensions; handlers pull it out with `CurrentUser`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::entity::user::User;
use crate::error::AuthError;

/// The user behind a request that passed the gate
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn user(&self) -> &User {
        &self.0
    }

    pub fn into_inner(self) -> User {
        self.0
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthError::MissingToken)
    }
}
