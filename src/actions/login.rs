use std::sync::Arc;

use crate::actions::{TokenMinter, TokenPair};
use crate::clock::Clock;
use crate::config::TokenConfig;
use crate::crypto::{Argon2Hasher, PasswordHasher};
use crate::jwt::TokenSigner;
use crate::validators::normalize_email;
use crate::{AuthError, CredentialFailure, RefreshTokenRepository, UserRepository};

pub struct LoginAction<U: UserRepository, R: RefreshTokenRepository, S: TokenSigner> {
    user_repository: U,
    minter: TokenMinter<R, S>,
    hasher: Arc<dyn PasswordHasher>,
}

impl<U: UserRepository, R: RefreshTokenRepository, S: TokenSigner> LoginAction<U, R, S> {
    pub fn new(user_repository: U, refresh_repository: R, signer: S) -> Self {
        Self {
            user_repository,
            minter: TokenMinter::new(refresh_repository, signer),
            hasher: Arc::new(Argon2Hasher::default()),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: TokenConfig) -> Self {
        self.minter = self.minter.with_config(config);
        self
    }

    #[must_use]
    pub fn with_hasher(mut self, hasher: Arc<dyn PasswordHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.minter = self.minter.with_clock(clock);
        self
    }

    /// Authenticates `email`/`password` and mints a fresh token pair.
    ///
    /// Nothing is written to the refresh token store unless the credentials
    /// check out.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "login", skip_all, err)
    )]
    pub async fn execute(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let email = normalize_email(email);

        let Some(user) = self.user_repository.find_user_by_email(&email).await? else {
            log::warn!(
                target: "gatehouse",
                "msg=\"login failed\", reason=\"{}\"",
                CredentialFailure::UnknownEmail
            );
            return Err(AuthError::InvalidCredentials {
                reason: CredentialFailure::UnknownEmail,
            });
        };

        if !self.hasher.verify(password, &user.hashed_password)? {
            log::warn!(
                target: "gatehouse",
                "msg=\"login failed\", reason=\"{}\", user_id={}",
                CredentialFailure::WrongPassword,
                user.id
            );
            return Err(AuthError::InvalidCredentials {
                reason: CredentialFailure::WrongPassword,
            });
        }

        let pair = self.minter.mint(&user).await?;

        log::info!(
            target: "gatehouse",
            "msg=\"login success\", user_id={}",
            user.id
        );

        Ok(pair)
    }
}
