use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use super::store_error;
use crate::crypto::{generate_refresh_token, hash_token};
use crate::{AuthError, RefreshToken, RefreshTokenRepository, SecretString};

/// Stores SHA-256 hashes of refresh tokens, never the plain values.
#[derive(Clone)]
pub struct SqliteRefreshTokenRepository {
    pool: SqlitePool,
}

impl SqliteRefreshTokenRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct RefreshTokenRecord {
    id: i64,
    user_id: i64,
    token_hash: String,
    expires_at: DateTime<Utc>,
    used: bool,
    used_ip: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<RefreshTokenRecord> for RefreshToken {
    fn from(row: RefreshTokenRecord) -> Self {
        RefreshToken {
            id: row.id,
            user_id: row.user_id,
            token: SecretString::new(row.token_hash),
            expires_at: row.expires_at,
            used: row.used,
            used_ip: row.used_ip,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl RefreshTokenRepository for SqliteRefreshTokenRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn create_refresh_token(
        &self,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, AuthError> {
        let plain = generate_refresh_token();
        let now = Utc::now();

        let row: RefreshTokenRecord = sqlx::query_as(
            "INSERT INTO refresh_tokens (user_id, token_hash, expires_at, used, created_at) \
             VALUES (?, ?, ?, 0, ?) \
             RETURNING id, user_id, token_hash, expires_at, used, used_ip, created_at",
        )
        .bind(user_id)
        .bind(hash_token(&plain))
        .bind(expires_at)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| store_error("create_refresh_token", &e))?;

        Ok(RefreshToken {
            token: SecretString::new(plain),
            ..RefreshToken::from(row)
        })
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, token), err))]
    async fn find_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>, AuthError> {
        let row: Option<RefreshTokenRecord> = sqlx::query_as(
            "SELECT id, user_id, token_hash, expires_at, used, used_ip, created_at \
             FROM refresh_tokens WHERE token_hash = ?",
        )
        .bind(hash_token(token))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error("find_refresh_token", &e))?;

        Ok(row.map(Into::into))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, token), err))]
    async fn mark_used(&self, token: &str, ip: &str) -> Result<bool, AuthError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET used = 1, used_ip = ? WHERE token_hash = ? AND used = 0",
        )
        .bind(ip)
        .bind(hash_token(token))
        .execute(&self.pool)
        .await
        .map_err(|e| store_error("mark_used", &e))?;

        Ok(result.rows_affected() == 1)
    }
}
