use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AuthError, SecretString};

/// A single-use refresh token row.
///
/// When returned from [`RefreshTokenRepository::create_refresh_token`],
/// `token` holds the plain value handed to the client. Rows read back from
/// a store carry the SHA-256 hash instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshToken {
    pub id: i64,
    pub user_id: i64,
    pub token: SecretString,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub used_ip: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Generates and stores a new token for `user_id`.
    async fn create_refresh_token(
        &self,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, AuthError>;

    async fn find_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>, AuthError>;

    /// Flips `used` from false to true and records `ip`, atomically.
    ///
    /// Returns `Ok(true)` only for the call that performed the transition.
    /// Concurrent callers racing on the same token see `Ok(false)`, as does
    /// a call for a token that does not exist.
    async fn mark_used(&self, token: &str, ip: &str) -> Result<bool, AuthError>;
}
