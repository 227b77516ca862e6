//! Acting User
//!
//! The slice of an authenticated user that catalog rules look at.

use auth::User;
use kernel::id::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub is_admin: bool,
    pub is_seller: bool,
}

impl Actor {
    pub fn admin(id: UserId) -> Self {
        Self {
            id,
            is_admin: true,
            is_seller: false,
        }
    }

    pub fn seller(id: UserId) -> Self {
        Self {
            id,
            is_admin: false,
            is_seller: true,
        }
    }

    pub fn buyer(id: UserId) -> Self {
        Self {
            id,
            is_admin: false,
            is_seller: false,
        }
    }

    /// Owner of the resource, or an admin
    pub fn can_manage(&self, owner: UserId) -> bool {
        self.is_admin || self.id == owner
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            is_admin: user.is_admin(),
            is_seller: user.is_seller,
        }
    }
}
