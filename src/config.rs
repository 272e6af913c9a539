//! Runtime knobs for token lifetimes, the CSRF protocol and login error
//! disclosure.
//!
//! ```rust
//! use gatehouse::config::{GatehouseConfig, TokenConfig};
//! use chrono::Duration;
//!
//! let config = GatehouseConfig {
//!     tokens: TokenConfig {
//!         refresh_token_expiry: Duration::days(14),
//!         ..Default::default()
//!     },
//!     ..Default::default()
//! };
//! assert_eq!(config.tokens.access_token_expiry, Duration::hours(1));
//! ```

use chrono::Duration;

#[derive(Debug, Clone, Default)]
pub struct GatehouseConfig {
    pub tokens: TokenConfig,
    pub csrf: CsrfConfig,
    pub login: LoginConfig,
}

impl GatehouseConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Lifetime of a signed access token. Default: 1 hour
    pub access_token_expiry: Duration,

    /// Lifetime of a refresh token. Default: 30 days
    pub refresh_token_expiry: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_token_expiry: Duration::hours(1),
            refresh_token_expiry: Duration::days(30),
        }
    }
}

impl TokenConfig {
    /// Access token lifetime in whole seconds, as reported in `expires_in`.
    pub fn access_token_expiry_secs(&self) -> i64 {
        self.access_token_expiry.num_seconds()
    }
}

/// Where the CSRF guard looks for a token and how long one stays valid.
#[derive(Debug, Clone)]
pub struct CsrfConfig {
    /// Default: 1 hour
    pub validity: Duration,
    pub header_name: String,
    pub form_field: String,
    pub cookie_name: String,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            validity: Duration::hours(1),
            header_name: "X-CSRF-Token".to_owned(),
            form_field: "_token".to_owned(),
            cookie_name: "csrf_token".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginConfig {
    /// When set, HTTP login failures say whether the email or the password
    /// was wrong ("invalid email" / "invalid password"). Off by default, so
    /// both answer "Invalid email or password"; the service this crate
    /// replaces always sent the distinct messages, so set this to keep that
    /// behaviour. Both cases are logged either way.
    pub expose_credential_failure: bool,
}
