use std::sync::Arc;

use crate::actions::{TokenMinter, TokenPair};
use crate::clock::Clock;
use crate::config::TokenConfig;
use crate::jwt::TokenSigner;
use crate::{AuthError, RefreshTokenRepository, UserRepository};

/// Exchanges a refresh token for a new pair, consuming it.
pub struct RefreshTokenAction<U: UserRepository, R: RefreshTokenRepository, S: TokenSigner> {
    user_repository: U,
    minter: TokenMinter<R, S>,
}

impl<U: UserRepository, R: RefreshTokenRepository, S: TokenSigner> RefreshTokenAction<U, R, S> {
    pub fn new(user_repository: U, refresh_repository: R, signer: S) -> Self {
        Self {
            user_repository,
            minter: TokenMinter::new(refresh_repository, signer),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: TokenConfig) -> Self {
        self.minter = self.minter.with_config(config);
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.minter = self.minter.with_clock(clock);
        self
    }

    /// Checks run in a fixed order: existence, used flag, expiry, owner.
    /// The token is then consumed with a conditional update, so of several
    /// concurrent calls with the same value at most one gets past it.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "refresh_token", skip(self, token), err)
    )]
    pub async fn execute(&self, token: &str, ip: &str) -> Result<TokenPair, AuthError> {
        let refresh_repository = self.minter.refresh_repository();

        let Some(record) = refresh_repository.find_refresh_token(token).await? else {
            return Err(AuthError::TokenNotFound);
        };

        if record.used {
            log::warn!(
                target: "gatehouse::replay",
                "msg=\"used refresh token presented\", user_id={}, token_id={}, ip=\"{ip}\"",
                record.user_id,
                record.id
            );
            return Err(AuthError::TokenAlreadyUsed);
        }

        if record.is_expired_at(self.minter.clock().now()) {
            return Err(AuthError::TokenExpired);
        }

        let Some(user) = self.user_repository.find_user_by_id(record.user_id).await? else {
            log::error!(
                target: "gatehouse",
                "msg=\"refresh token owner missing\", user_id={}, token_id={}",
                record.user_id,
                record.id
            );
            return Err(AuthError::UserNotFound);
        };

        if !refresh_repository.mark_used(token, ip).await? {
            log::warn!(
                target: "gatehouse::replay",
                "msg=\"refresh token consumed concurrently\", user_id={}, token_id={}, ip=\"{ip}\"",
                record.user_id,
                record.id
            );
            return Err(AuthError::TokenAlreadyUsed);
        }

        let pair = self.minter.mint(&user).await?;

        log::info!(
            target: "gatehouse",
            "msg=\"refresh token rotated\", user_id={}",
            user.id
        );

        Ok(pair)
    }
}
