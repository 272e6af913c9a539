use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;

use crate::AuthError;

type HmacSha256 = Hmac<Sha256>;

const TIMESTAMP_LEN: usize = 8;
const NONCE_LEN: usize = 16;
const MAC_LEN: usize = 32;
const SIGNED_LEN: usize = TIMESTAMP_LEN + NONCE_LEN;

/// Decoded length of a token.
pub const TOKEN_BYTES: usize = SIGNED_LEN + MAC_LEN;

/// The check a CSRF token failed. Callers outside this module only ever
/// surface it as `AuthError::CsrfTokenInvalid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrfError {
    Malformed,
    Mismatch,
    Expired,
}

impl fmt::Display for CsrfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsrfError::Malformed => write!(f, "malformed csrf token"),
            CsrfError::Mismatch => write!(f, "csrf token signature mismatch"),
            CsrfError::Expired => write!(f, "csrf token expired"),
        }
    }
}

impl std::error::Error for CsrfError {}

#[derive(Clone)]
pub struct CsrfService {
    /// Keyed once at construction and cloned per token.
    key: HmacSha256,
    validity: Duration,
}

impl fmt::Debug for CsrfService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsrfService")
            .field("key", &"[REDACTED]")
            .field("validity", &self.validity)
            .finish()
    }
}

impl CsrfService {
    /// # Errors
    ///
    /// `AuthError::ConfigurationError` if `secret` is empty.
    pub fn new(secret: impl Into<String>) -> Result<Self, AuthError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(AuthError::ConfigurationError(
                "CSRF secret must not be empty".to_owned(),
            ));
        }

        let key = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| AuthError::ConfigurationError(format!("invalid CSRF secret: {e}")))?;

        Ok(Self {
            key,
            validity: Duration::hours(1),
        })
    }

    #[must_use]
    pub fn with_validity(mut self, validity: Duration) -> Self {
        self.validity = validity;
        self
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Issues a token stamped with `timestamp` and a fresh nonce.
    pub fn issue(&self, timestamp: DateTime<Utc>) -> String {
        let mut raw = [0u8; TOKEN_BYTES];
        raw[..TIMESTAMP_LEN].copy_from_slice(&timestamp.timestamp().to_be_bytes());
        OsRng.fill_bytes(&mut raw[TIMESTAMP_LEN..SIGNED_LEN]);

        let tag = self.mac(&raw[..SIGNED_LEN]).finalize().into_bytes();
        raw[SIGNED_LEN..].copy_from_slice(&tag);

        URL_SAFE_NO_PAD.encode(raw)
    }

    /// Checks, in order: shape, signature (constant-time), age.
    ///
    /// A token is valid up to and including `timestamp + validity`.
    /// Timestamps in the future are accepted.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<(), CsrfError> {
        let raw = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| CsrfError::Malformed)?;
        if raw.len() != TOKEN_BYTES {
            return Err(CsrfError::Malformed);
        }

        let (signed, tag) = raw.split_at(SIGNED_LEN);
        self.mac(signed)
            .verify_slice(tag)
            .map_err(|_| CsrfError::Mismatch)?;

        let mut ts = [0u8; TIMESTAMP_LEN];
        ts.copy_from_slice(&signed[..TIMESTAMP_LEN]);
        let issued_at = i64::from_be_bytes(ts);

        if now.timestamp() > issued_at.saturating_add(self.validity.num_seconds()) {
            return Err(CsrfError::Expired);
        }

        Ok(())
    }

    fn mac(&self, message: &[u8]) -> HmacSha256 {
        let mut mac = self.key.clone();
        mac.update(message);
        mac
    }
}
