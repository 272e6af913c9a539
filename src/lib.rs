//! Credential login, rotating single-use refresh tokens and stateless CSRF
//! protection.
//!
//! The crate is organised around a handful of capability traits:
//!
//! | Trait | Role |
//! |-------|------|
//! | [`UserRepository`] | credential store |
//! | [`RefreshTokenRepository`] | refresh token store with an atomic "mark used" |
//! | [`TokenSigner`](jwt::TokenSigner) | signs and verifies access tokens |
//! | [`PasswordHasher`](crypto::PasswordHasher) | hashes and verifies passwords |
//! | [`Clock`] | current instant |
//!
//! [`actions`] orchestrates login, refresh and signup on top of them and
//! [`csrf`] implements the CSRF token protocol. The HTTP surface lives in
//! `api::axum` behind the `axum_api` feature.

pub mod actions;
pub mod clock;
pub mod config;
pub mod crypto;
pub mod csrf;
pub mod jwt;
pub mod repository;
mod secret;
pub mod validators;

#[cfg(feature = "axum_api")]
pub mod api;

#[cfg(feature = "sqlx_sqlite")]
pub mod sqlite;

use std::fmt;

pub use clock::{Clock, SystemClock};
pub use config::{CsrfConfig, GatehouseConfig, LoginConfig, TokenConfig};
pub use repository::{AuthUser, RefreshToken, RefreshTokenRepository, UserRepository};
pub use secret::SecretString;

#[cfg(any(test, feature = "mocks"))]
pub use clock::FixedClock;
#[cfg(any(test, feature = "mocks"))]
pub use repository::{MockRefreshTokenRepository, MockUserRepository};

/// Why a login attempt was rejected.
///
/// Both reasons are always logged. Whether the HTTP caller learns which one
/// applied is decided by [`LoginConfig::expose_credential_failure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialFailure {
    UnknownEmail,
    WrongPassword,
}

impl fmt::Display for CredentialFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialFailure::UnknownEmail => write!(f, "invalid email"),
            CredentialFailure::WrongPassword => write!(f, "invalid password"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    Validation(String),
    UserAlreadyExists,
    InvalidCredentials { reason: CredentialFailure },
    /// The owning user of a refresh token has disappeared.
    UserNotFound,
    TokenNotFound,
    TokenAlreadyUsed,
    TokenExpired,
    TokenInvalid,
    CsrfTokenMissing,
    CsrfTokenInvalid,
    PasswordHashError,
    SigningError(String),
    StoreError(String),
    ConfigurationError(String),
}

impl AuthError {
    /// Stable machine-readable code used in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Validation(_) => "VALIDATION_ERROR",
            AuthError::UserAlreadyExists => "USER_ALREADY_EXISTS",
            AuthError::InvalidCredentials { .. } => "INVALID_CREDENTIALS",
            AuthError::UserNotFound => "USER_NOT_FOUND",
            AuthError::TokenNotFound => "TOKEN_NOT_FOUND",
            AuthError::TokenAlreadyUsed => "TOKEN_ALREADY_USED",
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::TokenInvalid => "TOKEN_INVALID",
            AuthError::CsrfTokenMissing => "CSRF_TOKEN_MISSING",
            AuthError::CsrfTokenInvalid => "CSRF_TOKEN_INVALID",
            AuthError::PasswordHashError => "PASSWORD_HASH_ERROR",
            AuthError::SigningError(_) => "SIGNING_ERROR",
            AuthError::StoreError(_) => "STORE_ERROR",
            AuthError::ConfigurationError(_) => "CONFIGURATION_ERROR",
        }
    }

    /// True for failures caused by the server rather than by the caller's input.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AuthError::UserNotFound
                | AuthError::PasswordHashError
                | AuthError::SigningError(_)
                | AuthError::StoreError(_)
                | AuthError::ConfigurationError(_)
        )
    }
}

impl std::error::Error for AuthError {}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Validation(msg) => write!(f, "{msg}"),
            AuthError::UserAlreadyExists => write!(f, "User already exists"),
            AuthError::InvalidCredentials { .. } => write!(f, "Invalid email or password"),
            AuthError::UserNotFound => write!(f, "User not found"),
            AuthError::TokenNotFound => write!(f, "Refresh token not found"),
            AuthError::TokenAlreadyUsed => write!(f, "Refresh token already used"),
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::TokenInvalid => write!(f, "Invalid token"),
            AuthError::CsrfTokenMissing => write!(f, "not set csrf token"),
            AuthError::CsrfTokenInvalid => write!(f, "invalid csrf token"),
            AuthError::PasswordHashError => write!(f, "Failed to hash password"),
            AuthError::SigningError(msg) => write!(f, "Failed to sign token: {msg}"),
            AuthError::StoreError(msg) => write!(f, "Store error: {msg}"),
            AuthError::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl From<validators::ValidationError> for AuthError {
    fn from(err: validators::ValidationError) -> Self {
        AuthError::Validation(err.to_string())
    }
}
