#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::crypto::{Argon2Hasher, PasswordHasher};
use crate::jwt::{AccessClaims, JwtConfig, JwtService, TokenSigner};
use crate::{AuthError, AuthUser, MockUserRepository};

pub const SECRET: &str = "test-secret-32-bytes-long-key-01";

pub fn hasher() -> Arc<dyn PasswordHasher> {
    Arc::new(Argon2Hasher::new(1024, 1, 1))
}

pub fn signer() -> JwtService {
    JwtService::new(JwtConfig::new(SECRET).unwrap())
}

/// Stores a user whose password is `password`.
pub fn seed_user(repo: &MockUserRepository, email: &str, password: &str) -> AuthUser {
    let digest = hasher().hash(password).unwrap();
    repo.insert(AuthUser::mock_from_credentials(email, &digest))
}

#[derive(Clone)]
pub struct FailingSigner;

impl TokenSigner for FailingSigner {
    fn sign(&self, _claims: &AccessClaims) -> Result<String, AuthError> {
        Err(AuthError::SigningError("key unavailable".to_owned()))
    }

    fn verify(&self, _token: &str, _now: DateTime<Utc>) -> Result<AccessClaims, AuthError> {
        Err(AuthError::TokenInvalid)
    }
}
