//! In-Memory Repository
//!
//! Process-local user store used by tests and local tooling. Enforces the
//! same email uniqueness as the `users.email` constraint.

use std::collections::BTreeMap;
use std::sync::Arc;

use kernel::id::UserId;
use tokio::sync::RwLock;

use crate::domain::entity::user::{NewUser, User};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct Store {
    users: BTreeMap<UserId, User>,
    last_id: i64,
}

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.users.len()
    }
}

impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &NewUser) -> AuthResult<User> {
        let mut store = self.store.write().await;
        if store.users.values().any(|u| u.email == user.email) {
            return Err(AuthError::EmailTaken);
        }

        store.last_id += 1;
        let created = user.clone().into_user(UserId::from_i64(store.last_id));
        store.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: UserId) -> AuthResult<Option<User>> {
        Ok(self.store.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let store = self.store.read().await;
        Ok(store.users.values().find(|u| &u.email == email).cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let store = self.store.read().await;
        Ok(store.users.values().any(|u| &u.email == email))
    }

    async fn find_all(&self) -> AuthResult<Vec<User>> {
        let store = self.store.read().await;
        let mut users: Vec<User> = store.users.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(users)
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let mut store = self.store.write().await;
        if store
            .users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(AuthError::EmailTaken);
        }
        if let Some(existing) = store.users.get_mut(&user.id) {
            *existing = user.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: UserId) -> AuthResult<bool> {
        Ok(self.store.write().await.users.remove(&id).is_some())
    }
}
