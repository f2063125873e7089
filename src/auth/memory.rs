//! In-process `UserStore` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::auth::{
    repo::{StoreError, UserStore},
    repo_types::{NewUser, User},
};

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_by_phone(&self, phone: &str) -> Option<User> {
        let users = self.users.lock().expect("users lock poisoned");
        users.iter().find(|u| u.phone == phone).cloned()
    }

    pub fn len(&self) -> usize {
        self.users.lock().expect("users lock poisoned").len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn register(&self, new_user: &NewUser) -> Result<User, StoreError> {
        let mut users = self.users.lock().expect("users lock poisoned");
        if users
            .iter()
            .any(|u| u.phone == new_user.phone || u.username == new_user.username)
        {
            return Err(StoreError::Conflict);
        }

        let now = OffsetDateTime::now_utc();
        let user = User {
            id: users.len() as i32 + 1,
            phone: new_user.phone.clone(),
            avatar: new_user.avatar.clone(),
            nickname: new_user.nickname.clone(),
            username: new_user.username.clone(),
            is_premium: false,
            created_at: now,
            last_seen: Some(now),
        };
        users.push(user.clone());

        // INSERT ... RETURNING leaves last_seen out
        Ok(User {
            last_seen: None,
            ..user
        })
    }

    async fn login(&self, phone: &str) -> Result<Option<User>, StoreError> {
        let mut users = self.users.lock().expect("users lock poisoned");
        let Some(user) = users.iter_mut().find(|u| u.phone == phone) else {
            return Ok(None);
        };
        user.last_seen = Some(OffsetDateTime::now_utc());
        Ok(Some(user.clone()))
    }
}

/// Store whose every call fails the way an unreachable database does.
pub struct UnreachableStore;

#[async_trait]
impl UserStore for UnreachableStore {
    async fn register(&self, _new_user: &NewUser) -> Result<User, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn login(&self, _phone: &str) -> Result<Option<User>, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }
}
