use std::sync::Arc;

use crate::crypto::{Argon2Hasher, PasswordHasher};
use crate::validators::{normalize_email, validate_email, validate_name, validate_password};
use crate::{AuthError, AuthUser, UserRepository};

pub struct SignupAction<U: UserRepository> {
    user_repository: U,
    hasher: Arc<dyn PasswordHasher>,
}

impl<U: UserRepository> SignupAction<U> {
    pub fn new(user_repository: U) -> Self {
        Self {
            user_repository,
            hasher: Arc::new(Argon2Hasher::default()),
        }
    }

    #[must_use]
    pub fn with_hasher(mut self, hasher: Arc<dyn PasswordHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    /// Registers a user. The email is normalized before the duplicate check
    /// and stored that way.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "signup", skip_all, err)
    )]
    pub async fn execute(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, AuthError> {
        let name = name.trim();
        let email = normalize_email(email);

        validate_name(name)?;
        validate_email(&email)?;
        validate_password(password)?;

        if self.user_repository.find_user_by_email(&email).await?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let hashed = self.hasher.hash(password)?;
        let user = self.user_repository.create_user(name, &email, &hashed).await?;

        log::info!(
            target: "gatehouse",
            "msg=\"user registered\", user_id={}",
            user.id
        );

        Ok(user)
    }
}
