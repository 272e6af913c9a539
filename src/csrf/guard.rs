use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::CsrfConfig;
use crate::csrf::CsrfService;
use crate::AuthError;

/// Methods that never need a token.
pub fn is_exempt_method(method: &str) -> bool {
    matches!(method, "GET" | "HEAD")
}

/// Token values found on a request, one per source.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsrfCandidates<'a> {
    pub header: Option<&'a str>,
    pub form: Option<&'a str>,
    pub cookie: Option<&'a str>,
}

impl<'a> CsrfCandidates<'a> {
    /// First non-empty value, by priority header, form field, cookie.
    pub fn select(&self) -> Option<&'a str> {
        [self.header, self.form, self.cookie]
            .into_iter()
            .flatten()
            .find(|v| !v.is_empty())
    }
}

/// Looks `name` up in a `Cookie` request header value.
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"'))
}

/// Request-side CSRF policy.
#[derive(Clone)]
pub struct CsrfGuard {
    service: CsrfService,
    clock: Arc<dyn Clock>,
    config: CsrfConfig,
}

impl CsrfGuard {
    pub fn new(service: CsrfService) -> Self {
        Self {
            service,
            clock: Arc::new(SystemClock),
            config: CsrfConfig::default(),
        }
    }

    /// Also applies `config.validity` to the underlying service.
    #[must_use]
    pub fn with_config(mut self, config: CsrfConfig) -> Self {
        self.service = self.service.with_validity(config.validity);
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &CsrfConfig {
        &self.config
    }

    /// Issues a token stamped with the current time.
    pub fn issue(&self) -> String {
        self.service.issue(self.clock.now())
    }

    /// Admits or rejects a request. Never mutates anything.
    ///
    /// # Errors
    ///
    /// `AuthError::CsrfTokenMissing` when a non-exempt request carries no
    /// token, `AuthError::CsrfTokenInvalid` when the token fails any check.
    pub fn check(&self, method: &str, candidates: &CsrfCandidates<'_>) -> Result<(), AuthError> {
        if is_exempt_method(method) {
            return Ok(());
        }

        let Some(token) = candidates.select() else {
            log::debug!(
                target: "gatehouse::csrf",
                "msg=\"csrf token missing\", method=\"{method}\""
            );
            return Err(AuthError::CsrfTokenMissing);
        };

        self.service.verify(token, self.clock.now()).map_err(|e| {
            log::debug!(
                target: "gatehouse::csrf",
                "msg=\"csrf token rejected\", method=\"{method}\", reason=\"{e}\""
            );
            AuthError::CsrfTokenInvalid
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FixedClock;
    use chrono::Duration;

    fn guard() -> (CsrfGuard, FixedClock) {
        let clock = FixedClock::default();
        let guard = CsrfGuard::new(CsrfService::new("guard-secret").unwrap())
            .with_clock(Arc::new(clock.clone()));
        (guard, clock)
    }

    #[test]
    fn test_exempt_methods() {
        let (guard, _) = guard();
        let none = CsrfCandidates::default();

        assert!(guard.check("GET", &none).is_ok());
        assert!(guard.check("HEAD", &none).is_ok());
        assert_eq!(guard.check("OPTIONS", &none), Err(AuthError::CsrfTokenMissing));
        assert_eq!(guard.check("POST", &none), Err(AuthError::CsrfTokenMissing));
    }

    #[test]
    fn test_header_has_priority() {
        let (guard, _) = guard();
        let token = guard.issue();

        let candidates = CsrfCandidates {
            header: Some(&token),
            form: Some("garbage"),
            cookie: Some("garbage"),
        };
        assert!(guard.check("POST", &candidates).is_ok());

        let candidates = CsrfCandidates {
            header: Some("garbage"),
            form: None,
            cookie: Some(&token),
        };
        assert_eq!(guard.check("POST", &candidates), Err(AuthError::CsrfTokenInvalid));
    }

    #[test]
    fn test_empty_values_are_absent() {
        let (guard, _) = guard();
        let token = guard.issue();

        let candidates = CsrfCandidates {
            header: Some(""),
            form: Some(""),
            cookie: Some(&token),
        };
        assert_eq!(candidates.select(), Some(token.as_str()));
        assert!(guard.check("DELETE", &candidates).is_ok());

        let empty = CsrfCandidates {
            header: Some(""),
            form: None,
            cookie: Some(""),
        };
        assert_eq!(guard.check("PUT", &empty), Err(AuthError::CsrfTokenMissing));
    }

    #[test]
    fn test_expired_is_invalid() {
        let (guard, clock) = guard();
        let token = guard.issue();
        clock.advance(Duration::hours(1) + Duration::seconds(1));

        let candidates = CsrfCandidates {
            form: Some(&token),
            ..Default::default()
        };
        assert_eq!(guard.check("POST", &candidates), Err(AuthError::CsrfTokenInvalid));
    }

    #[test]
    fn test_cookie_value() {
        let header = "theme=dark; csrf_token=abc-_123; other=\"x\"";
        assert_eq!(cookie_value(header, "csrf_token"), Some("abc-_123"));
        assert_eq!(cookie_value(header, "other"), Some("x"));
        assert_eq!(cookie_value(header, "missing"), None);
        assert_eq!(cookie_value("csrf_token_old=1", "csrf_token"), None);
    }
}
