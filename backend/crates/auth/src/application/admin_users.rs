//! Admin User Management
//!
//! Listing, inspecting, editing and hard-deleting any account. Every
//! operation re-checks that the actor is an admin.

use std::sync::Arc;

use kernel::clock::Clock;
use kernel::id::UserId;

use crate::application::profile::apply_identity;
use crate::application::user_cache::UserCache;
use crate::domain::entity::user::{SellerProfilePatch, User};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_role::UserRole;
use crate::error::{AuthError, AuthResult};

/// Fields an admin may change on any account
#[derive(Debug, Default)]
pub struct AdminUserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
    pub is_seller: Option<bool>,
    pub profile: SellerProfilePatch,
}

pub struct AdminUsersUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    cache: UserCache,
    clock: Arc<dyn Clock>,
}

impl<U> AdminUsersUseCase<U>
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

    pub async fn list(&self, actor: &User) -> AuthResult<Vec<User>> {
        ensure_admin(actor)?;
        self.user_repo.find_all().await
    }

    pub async fn get(&self, actor: &User, id: UserId) -> AuthResult<User> {
        ensure_admin(actor)?;
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    pub async fn update(
        &self,
        actor: &User,
        id: UserId,
        update: AdminUserUpdate,
    ) -> AuthResult<User> {
        let mut user = self.get(actor, id).await?;

        apply_identity(self.user_repo.as_ref(), &mut user, update.name, update.email).await?;
        if let Some(role) = update.role {
            user.role = role;
        }
        if let Some(is_active) = update.is_active {
            user.is_active = is_active;
        }
        if let Some(is_seller) = update.is_seller {
            user.is_seller = is_seller;
        }
        update.profile.apply_to(&mut user.profile);
        user.touch(self.clock.now());

        self.user_repo.update(&user).await?;
        self.cache.invalidate(user.id);

        tracing::info!(admin_id = %actor.id, user_id = %user.id, "User updated by admin");
        Ok(user)
    }

    pub async fn delete(&self, actor: &User, id: UserId) -> AuthResult<()> {
        ensure_admin(actor)?;

        if !self.user_repo.delete(id).await? {
            return Err(AuthError::UserNotFound);
        }
        self.cache.invalidate(id);

        tracing::info!(admin_id = %actor.id, user_id = %id, "User deleted by admin");
        Ok(())
    }
}

/// `restrict_to(admin)`
pub fn ensure_admin(actor: &User) -> AuthResult<()> {
    restrict_to(actor, &[UserRole::Admin])
}

/// Fails with `Forbidden` unless the actor holds one of `roles`
pub fn restrict_to(actor: &User, roles: &[UserRole]) -> AuthResult<()> {
    if roles.contains(&actor.role) {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}
