use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AuthError;

/// A registered account.
///
/// `id` is the store's internal key and never leaves the process; `uuid` is
/// the external identifier carried in access tokens and API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    #[serde(skip_serializing)]
    pub id: i64,
    pub uuid: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(any(test, feature = "mocks"))]
impl AuthUser {
    pub fn mock() -> Self {
        Self::mock_from_credentials("test@example.com", "fakehashedpassword")
    }

    pub fn mock_from_email(email: &str) -> Self {
        Self::mock_from_credentials(email, "fakehashedpassword")
    }

    pub fn mock_from_credentials(email: &str, hashed_password: &str) -> Self {
        let now = Utc::now();
        AuthUser {
            id: 1,
            uuid: uuid::Uuid::new_v4().to_string(),
            name: "Test User".to_owned(),
            email: email.to_owned(),
            hashed_password: hashed_password.to_owned(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Credential store.
///
/// `email` arguments are expected to be normalized (trimmed, lowercase) by
/// the caller.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<AuthUser>, AuthError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;

    /// Inserts a user. The store assigns both `id` and a fresh v4 `uuid`.
    ///
    /// # Errors
    ///
    /// `AuthError::UserAlreadyExists` if the email is taken.
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        hashed_password: &str,
    ) -> Result<AuthUser, AuthError>;
}
