use serde::{Deserialize, Serialize};

use crate::actions::TokenPair;
use crate::{AuthError, AuthUser, SecretString};

// Request DTOs
//
// Missing fields deserialize as empty strings so that they are reported
// through validation rather than as a JSON shape error.

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: SecretString,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: SecretString,
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    #[serde(default)]
    pub refresh_token: SecretString,
}

// Response DTOs

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub uuid: String,
    pub username: String,
    pub email: String,
}

impl From<AuthUser> for RegisterResponse {
    fn from(user: AuthUser) -> Self {
        RegisterResponse {
            uuid: user.uuid,
            username: user.name,
            email: user.email,
        }
    }
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
    pub token_type: String,
    pub expires_in: i64,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        TokenResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: pair.token_type.to_owned(),
            expires_in: pair.expires_in,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CsrfTokenResponse {
    pub csrf_token: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    /// Like `From<&AuthError>`, but names the failed credential check for
    /// `InvalidCredentials` when `expose_credential_failure` is set.
    pub fn with_policy(err: &AuthError, expose_credential_failure: bool) -> Self {
        match err {
            AuthError::InvalidCredentials { reason } if expose_credential_failure => {
                ErrorResponse {
                    error: reason.to_string(),
                    code: err.code().to_owned(),
                }
            }
            _ => ErrorResponse::from(err),
        }
    }
}

impl From<&AuthError> for ErrorResponse {
    fn from(err: &AuthError) -> Self {
        let error = if err.is_internal() {
            "Internal server error".to_owned()
        } else {
            err.to_string()
        };

        ErrorResponse {
            error,
            code: err.code().to_owned(),
        }
    }
}

impl From<AuthError> for ErrorResponse {
    fn from(err: AuthError) -> Self {
        ErrorResponse::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CredentialFailure;

    #[test]
    fn test_internal_detail_hidden() {
        let body = ErrorResponse::from(AuthError::StoreError("connection refused at 10.0.0.5".to_owned()));
        assert_eq!(body.error, "Internal server error");
        assert_eq!(body.code, "STORE_ERROR");
    }

    #[test]
    fn test_credential_policy() {
        let err = AuthError::InvalidCredentials {
            reason: CredentialFailure::WrongPassword,
        };

        assert_eq!(ErrorResponse::with_policy(&err, false).error, "Invalid email or password");
        assert_eq!(ErrorResponse::with_policy(&err, true).error, "invalid password");
    }

    #[test]
    fn test_register_response_shape() {
        let user = AuthUser::mock();
        let json = serde_json::to_value(RegisterResponse::from(user.clone())).unwrap();

        assert_eq!(json["uuid"], user.uuid.as_str());
        assert_eq!(json["username"], "Test User");
        assert_eq!(json["email"], "test@example.com");
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let req: LoginRequest = serde_json::from_str(r#"{"email":"a@b.co"}"#).unwrap();
        assert!(req.password.is_empty());
    }
}
