use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use super::csrf::csrf_protect;
use super::handlers;
use crate::actions::{LoginAction, RefreshTokenAction, SignupAction};
use crate::clock::{Clock, SystemClock};
use crate::config::GatehouseConfig;
use crate::crypto::{Argon2Hasher, PasswordHasher};
use crate::csrf::CsrfGuard;
use crate::jwt::TokenSigner;
use crate::{RefreshTokenRepository, UserRepository};

/// Everything the handlers need. Actions are built per request from it.
#[derive(Clone)]
pub struct AppState<U, R, S> {
    pub user_repo: U,
    pub refresh_repo: R,
    pub signer: S,
    pub csrf: CsrfGuard,
    pub hasher: Arc<dyn PasswordHasher>,
    pub clock: Arc<dyn Clock>,
    pub config: GatehouseConfig,
}

impl<U, R, S> AppState<U, R, S>
where
    U: UserRepository + Clone,
    R: RefreshTokenRepository + Clone,
    S: TokenSigner + Clone,
{
    pub fn new(user_repo: U, refresh_repo: R, signer: S, csrf: CsrfGuard) -> Self {
        let config = GatehouseConfig::default();
        Self {
            user_repo,
            refresh_repo,
            signer,
            csrf: csrf.with_config(config.csrf.clone()),
            hasher: Arc::new(Argon2Hasher::default()),
            clock: Arc::new(SystemClock),
            config,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: GatehouseConfig) -> Self {
        self.csrf = self.csrf.with_config(config.csrf.clone());
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_hasher(mut self, hasher: Arc<dyn PasswordHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    /// Also drives CSRF token issue and expiry.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.csrf = self.csrf.with_clock(Arc::clone(&clock));
        self.clock = clock;
        self
    }

    pub fn signup_action(&self) -> SignupAction<U> {
        SignupAction::new(self.user_repo.clone()).with_hasher(Arc::clone(&self.hasher))
    }

    pub fn login_action(&self) -> LoginAction<U, R, S> {
        LoginAction::new(
            self.user_repo.clone(),
            self.refresh_repo.clone(),
            self.signer.clone(),
        )
        .with_config(self.config.tokens.clone())
        .with_hasher(Arc::clone(&self.hasher))
        .with_clock(Arc::clone(&self.clock))
    }

    pub fn refresh_action(&self) -> RefreshTokenAction<U, R, S> {
        RefreshTokenAction::new(
            self.user_repo.clone(),
            self.refresh_repo.clone(),
            self.signer.clone(),
        )
        .with_config(self.config.tokens.clone())
        .with_clock(Arc::clone(&self.clock))
    }
}

/// Unprotected route table; see [`router`] for the CSRF-wrapped service.
pub fn auth_routes<U, R, S>() -> Router<AppState<U, R, S>>
where
    U: UserRepository + Clone + 'static,
    R: RefreshTokenRepository + Clone + 'static,
    S: TokenSigner + Clone + 'static,
{
    Router::new()
        .route("/register", post(handlers::register::<U, R, S>))
        .route("/auth/login", post(handlers::login::<U, R, S>))
        .route("/auth/refresh", post(handlers::refresh::<U, R, S>))
        .route("/csrf/get", get(handlers::csrf_token::<U, R, S>))
        .route("/healthcheck", get(handlers::healthcheck))
}

/// All routes behind the CSRF guard, with request tracing.
pub fn router<U, R, S>(state: AppState<U, R, S>) -> Router
where
    U: UserRepository + Clone + 'static,
    R: RefreshTokenRepository + Clone + 'static,
    S: TokenSigner + Clone + 'static,
{
    let guard = state.csrf.clone();

    auth_routes::<U, R, S>()
        .layer(middleware::from_fn_with_state(guard, csrf_protect))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
