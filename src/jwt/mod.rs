//! HS256 access tokens.
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use gatehouse::jwt::{AccessClaims, JwtConfig, JwtService, TokenSigner};
//!
//! let service = JwtService::new(JwtConfig::new("a-signing-secret-of-32-bytes-min").unwrap());
//! let now = Utc::now();
//! let claims = AccessClaims::new("9b1d…", "user@example.com", now, Duration::hours(1));
//!
//! let token = service.sign(&claims).unwrap();
//! assert_eq!(service.verify(&token, now).unwrap().email, "user@example.com");
//! ```

mod claims;
mod config;
mod service;

use chrono::{DateTime, Utc};

use crate::AuthError;

pub use claims::AccessClaims;
pub use config::{JwtConfig, MIN_SECRET_LENGTH};
pub use service::JwtService;

/// Signs and verifies access tokens.
pub trait TokenSigner: Send + Sync {
    /// # Errors
    ///
    /// `AuthError::SigningError` if the token cannot be produced.
    fn sign(&self, claims: &AccessClaims) -> Result<String, AuthError>;

    /// Checks the signature and that `now` has not passed `exp`.
    ///
    /// # Errors
    ///
    /// `AuthError::TokenExpired` for a well-signed but stale token,
    /// `AuthError::TokenInvalid` for anything else.
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<AccessClaims, AuthError>;
}
