//! Stateless CSRF tokens.
//!
//! A token is `base64url_nopad(timestamp ‖ nonce ‖ hmac)`: an 8-byte
//! big-endian unix timestamp, 16 random bytes and an HMAC-SHA256 over the
//! first 24 bytes keyed by the server secret. Any process holding the secret
//! can issue and verify tokens; nothing is stored.
//!
//! [`CsrfService`] implements issue/verify. [`CsrfGuard`] applies the
//! request policy (exempt methods, where to look for the token) on top of it.

mod guard;
mod service;

pub use guard::{CsrfCandidates, CsrfGuard, cookie_value, is_exempt_method};
pub use service::{CsrfError, CsrfService, TOKEN_BYTES};
