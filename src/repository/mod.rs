//! Storage contracts.
//!
//! | Trait | Description |
//! |-------|-------------|
//! | [`UserRepository`] | find users by id or email, create users |
//! | [`RefreshTokenRepository`] | create, look up and atomically consume refresh tokens |
//!
//! In-memory implementations ([`MockUserRepository`],
//! [`MockRefreshTokenRepository`]) are available with the `mocks` feature.

mod refresh_token;
mod user;

#[cfg(any(test, feature = "mocks"))]
mod refresh_token_mock;
#[cfg(any(test, feature = "mocks"))]
mod user_mock;

pub use refresh_token::RefreshToken;
pub use refresh_token::RefreshTokenRepository;
pub use user::AuthUser;
pub use user::UserRepository;

#[cfg(any(test, feature = "mocks"))]
pub use refresh_token_mock::MockRefreshTokenRepository;
#[cfg(any(test, feature = "mocks"))]
pub use user_mock::MockUserRepository;
