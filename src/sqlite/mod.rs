//! `SQLite` implementations of the repository traits.

pub mod migrations;
mod refresh_token;
mod user;

pub use refresh_token::SqliteRefreshTokenRepository;
pub use user::SqliteUserRepository;

use sqlx::SqlitePool;

use crate::AuthError;

pub fn create_repositories(pool: SqlitePool) -> (SqliteUserRepository, SqliteRefreshTokenRepository) {
    (
        SqliteUserRepository::new(pool.clone()),
        SqliteRefreshTokenRepository::new(pool),
    )
}

/// Logs a database failure and folds it into `AuthError::StoreError`.
pub(crate) fn store_error(operation: &str, e: &sqlx::Error) -> AuthError {
    log::error!(
        target: "gatehouse",
        "msg=\"database error\", operation=\"{operation}\", error=\"{e}\""
    );
    AuthError::StoreError(e.to_string())
}
