#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Mutex};

use crate::AuthError;

use super::user::{AuthUser, UserRepository};

#[derive(Clone, Default)]
pub struct MockUserRepository {
    pub users: Arc<Mutex<Vec<AuthUser>>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `user` as-is, overriding its `id` with the next free one.
    pub fn insert(&self, mut user: AuthUser) -> AuthUser {
        let mut users = self.users.lock().unwrap();
        user.id = next_id(&users);
        users.push(user.clone());
        user
    }
}

fn next_id(users: &[AuthUser]) -> i64 {
    users.iter().map(|u| u.id).max().unwrap_or(0) + 1
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<AuthUser>, AuthError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(
        &self,
        name: &str,
        email: &str,
        hashed_password: &str,
    ) -> Result<AuthUser, AuthError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == email) {
            return Err(AuthError::UserAlreadyExists);
        }

        let now = Utc::now();
        let user = AuthUser {
            id: next_id(&users),
            uuid: uuid::Uuid::new_v4().to_string(),
            name: name.to_owned(),
            email: email.to_owned(),
            hashed_password: hashed_password.to_owned(),
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        drop(users);

        Ok(user)
    }
}
