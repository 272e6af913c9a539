use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::TokenConfig;
use crate::jwt::{AccessClaims, TokenSigner};
use crate::{AuthError, AuthUser, RefreshTokenRepository, SecretString};

pub const TOKEN_TYPE: &str = "Bearer";

/// Access token plus the refresh token that can later replace it.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Shared final step of login and refresh.
///
/// The access token is signed before the refresh token is stored, so a
/// signer failure leaves no orphaned refresh token behind.
pub struct TokenMinter<R: RefreshTokenRepository, S: TokenSigner> {
    refresh_repository: R,
    signer: S,
    clock: Arc<dyn Clock>,
    config: TokenConfig,
}

impl<R: RefreshTokenRepository, S: TokenSigner> TokenMinter<R, S> {
    pub fn new(refresh_repository: R, signer: S) -> Self {
        Self {
            refresh_repository,
            signer,
            clock: Arc::new(SystemClock),
            config: TokenConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: TokenConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn refresh_repository(&self) -> &R {
        &self.refresh_repository
    }

    pub async fn mint(&self, user: &AuthUser) -> Result<TokenPair, AuthError> {
        let now = self.clock.now();
        let claims = AccessClaims::new(
            &user.uuid,
            &user.email,
            now,
            self.config.access_token_expiry,
        );

        let access_token = self.signer.sign(&claims).map_err(|e| {
            log::error!(
                target: "gatehouse",
                "msg=\"access token signing failed\", user_id={}, error=\"{e}\"",
                user.id
            );
            e
        })?;

        let refresh = self
            .refresh_repository
            .create_refresh_token(user.id, now + self.config.refresh_token_expiry)
            .await?;

        Ok(TokenPair {
            access_token: SecretString::new(access_token),
            refresh_token: refresh.token,
            token_type: TOKEN_TYPE,
            expires_in: self.config.access_token_expiry_secs(),
        })
    }
}
