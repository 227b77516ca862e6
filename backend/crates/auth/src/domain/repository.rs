//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the infra layer.

use kernel::id::UserId;

use crate::domain::entity::user::{NewUser, User};
use crate::domain::value_object::email::Email;
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a new user. A duplicate email is `AuthError::EmailTaken`.
    async fn create(&self, user: &NewUser) -> AuthResult<User>;

    /// Find user by ID
    async fn find_by_id(&self, id: UserId) -> AuthResult<Option<User>>;

    /// Find user by (normalized) email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// Check if email exists
    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    /// All users, newest first
    async fn find_all(&self) -> AuthResult<Vec<User>>;

    /// Persist every mutable field. A duplicate email is `AuthError::EmailTaken`.
    async fn update(&self, user: &User) -> AuthResult<()>;

    /// Hard delete; returns whether a row was removed
    async fn delete(&self, id: UserId) -> AuthResult<bool>;
}
