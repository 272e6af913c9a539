#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::crypto::{generate_refresh_token, hash_token};
use crate::{AuthError, SecretString};

use super::refresh_token::{RefreshToken, RefreshTokenRepository};

/// In-memory refresh token store. Rows keep the token hash, like the SQL
/// stores do.
#[derive(Clone, Default)]
pub struct MockRefreshTokenRepository {
    pub tokens: Arc<Mutex<Vec<RefreshToken>>>,
    pub create_calls: Arc<AtomicUsize>,
}

impl MockRefreshTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_call_count(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RefreshTokenRepository for MockRefreshTokenRepository {
    async fn create_refresh_token(
        &self,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, AuthError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        let plain = generate_refresh_token();
        let now = Utc::now();

        let mut tokens = self.tokens.lock().unwrap();
        let stored = RefreshToken {
            id: i64::try_from(tokens.len()).unwrap() + 1,
            user_id,
            token: SecretString::new(hash_token(&plain)),
            expires_at,
            used: false,
            used_ip: None,
            created_at: now,
        };
        tokens.push(stored.clone());
        drop(tokens);

        Ok(RefreshToken {
            token: SecretString::new(plain),
            ..stored
        })
    }

    async fn find_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>, AuthError> {
        let hashed = hash_token(token);
        let tokens = self.tokens.lock().unwrap();
        Ok(tokens
            .iter()
            .find(|t| t.token.expose_secret() == hashed)
            .cloned())
    }

    async fn mark_used(&self, token: &str, ip: &str) -> Result<bool, AuthError> {
        let hashed = hash_token(token);
        let mut tokens = self.tokens.lock().unwrap();

        match tokens
            .iter_mut()
            .find(|t| t.token.expose_secret() == hashed && !t.used)
        {
            Some(row) => {
                row.used = true;
                row.used_ip = Some(ip.to_owned());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
