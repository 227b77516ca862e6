//! Application Layer
//!
//! Use cases and application services.

pub mod admin_users;
pub mod check_session;
pub mod config;
pub mod profile;
pub mod session;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;
pub mod update_password;
pub mod user_cache;

// Re-exports
pub use admin_users::{AdminUserUpdate, AdminUsersUseCase, ensure_admin, restrict_to};
pub use check_session::CheckSessionUseCase;
pub use config::AuthConfig;
pub use profile::{ProfileUpdate, ProfileUseCase};
pub use session::{SessionGrant, SessionTokens};
pub use sign_in::{SignInInput, SignInUseCase};
pub use sign_out::SignOutUseCase;
pub use sign_up::{SignUpInput, SignUpUseCase};
pub use update_password::{UpdatePasswordInput, UpdatePasswordUseCase};
pub use user_cache::UserCache;
