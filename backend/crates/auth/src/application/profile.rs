//! Profile Use Cases
//!
//! Self-service operations on the signed-in account.

use std::sync::Arc;

use kernel::clock::Clock;
use kernel::error::field::FieldErrors;
use kernel::id::UserId;

use crate::application::user_cache::UserCache;
use crate::domain::entity::user::{SellerProfilePatch, User};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, user_name::UserName};
use crate::error::{AuthError, AuthResult};

/// Fields a user may change on their own account
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub is_seller: Option<bool>,
    pub profile: SellerProfilePatch,
    /// The request tried to set a password
    pub includes_password: bool,
}

pub struct ProfileUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    cache: UserCache,
    clock: Arc<dyn Clock>,
}

impl<U> ProfileUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, cache: UserCache, clock: Arc<dyn Clock>) -> Self {
        Self {
            user_repo,
            cache,
            clock,
        }
    }

    pub async fn update_me(&self, user_id: UserId, update: ProfileUpdate) -> AuthResult<User> {
        if update.includes_password {
            return Err(AuthError::PasswordChangeNotAllowed);
        }

        let mut user = self.load(user_id).await?;
        apply_identity(self.user_repo.as_ref(), &mut user, update.name, update.email).await?;

        if let Some(is_seller) = update.is_seller {
            user.is_seller = is_seller;
        }
        update.profile.apply_to(&mut user.profile);
        user.touch(self.clock.now());

        self.user_repo.update(&user).await?;
        self.cache.invalidate(user.id);

        tracing::info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }

    /// Soft delete: the account stays but can no longer sign in
    pub async fn deactivate_me(&self, user_id: UserId) -> AuthResult<()> {
        let mut user = self.load(user_id).await?;
        user.deactivate(self.clock.now());

        self.user_repo.update(&user).await?;
        self.cache.invalidate(user.id);

        tracing::info!(user_id = %user.id, "Account deactivated");
        Ok(())
    }

    async fn load(&self, user_id: UserId) -> AuthResult<User> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::TokenUserMissing)
    }
}

/// Validate and apply a name/email change, collecting field errors.
/// A changed email must not belong to another account.
pub(crate) async fn apply_identity<U>(
    repo: &U,
    user: &mut User,
    name: Option<String>,
    email: Option<String>,
) -> AuthResult<()>
where
    U: UserRepository,
{
    let mut errors = FieldErrors::new();

    let name = name.map(UserName::new).transpose().unwrap_or_else(|message| {
        errors.push("name", message);
        None
    });
    let email = email
        .map(Email::new)
        .transpose()
        .unwrap_or_else(|message| {
            errors.push("email", message);
            None
        });

    errors.finish().map_err(AuthError::Validation)?;

    if let Some(email) = email {
        if email != user.email && repo.exists_by_email(&email).await? {
            return Err(AuthError::EmailTaken);
        }
        user.email = email;
    }
    if let Some(name) = name {
        user.name = name;
    }
    Ok(())
}
