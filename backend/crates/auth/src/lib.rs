//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Registration and login by email + password
//! - Stateless HS256 tokens, sent as a bearer header or a `jwt` cookie
//! - Request gate with a short-lived read-through user cache
//! - Profile self-service and admin user management
//! - Two roles: `user` and `admin`; sellers are users with `is_seller`
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (tunable cost, optional pepper)
//! - Login never reveals whether an email is registered
//! - Deactivated accounts are rejected at login and at the gate
//! - State-changing requests always re-read the user from the database

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use domain::entity::user::User;
pub use domain::value_object::user_role::UserRole;
pub use error::{AuthError, AuthResult};
pub use infra::{memory::InMemoryUserRepository, postgres::PgUserRepository};
pub use presentation::{
    AuthAppState, CurrentUser, auth_router, require_admin, require_auth, users_router,
};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
