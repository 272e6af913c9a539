//! Login, refresh and signup orchestration.
//!
//! Actions hold repositories and collaborators but no per-request state, so
//! one instance can serve any number of concurrent calls.

pub mod login;
pub mod mint;
pub mod refresh_token;
pub mod signup;

#[cfg(test)]
mod testing;

pub use login::LoginAction;
pub use mint::{TOKEN_TYPE, TokenMinter, TokenPair};
pub use refresh_token::RefreshTokenAction;
pub use signup::SignupAction;
