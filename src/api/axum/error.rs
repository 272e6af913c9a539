use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::AuthError;
use crate::api::ErrorResponse;

/// Converts `AuthError` into an HTTP response.
///
/// Login and refresh failures answer 500 rather than 401; existing clients
/// of the service depend on that.
#[derive(Debug)]
pub struct AppError {
    pub error: AuthError,
    expose_credential_failure: bool,
}

impl AppError {
    pub fn new(error: AuthError) -> Self {
        Self {
            error,
            expose_credential_failure: false,
        }
    }

    #[must_use]
    pub fn exposing_credential_failure(mut self, expose: bool) -> Self {
        self.expose_credential_failure = expose;
        self
    }

    pub fn status(&self) -> StatusCode {
        match &self.error {
            AuthError::Validation(_)
            | AuthError::UserAlreadyExists
            | AuthError::CsrfTokenMissing => StatusCode::BAD_REQUEST,
            AuthError::CsrfTokenInvalid => StatusCode::FORBIDDEN,
            AuthError::InvalidCredentials { .. }
            | AuthError::UserNotFound
            | AuthError::TokenNotFound
            | AuthError::TokenAlreadyUsed
            | AuthError::TokenExpired
            | AuthError::TokenInvalid
            | AuthError::PasswordHashError
            | AuthError::SigningError(_)
            | AuthError::StoreError(_)
            | AuthError::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        Self::new(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.error.is_internal() {
            log::error!(
                target: "gatehouse",
                "msg=\"request failed\", code=\"{}\", error=\"{}\"",
                self.error.code(),
                self.error
            );
        }

        let body = ErrorResponse::with_policy(&self.error, self.expose_credential_failure);
        (self.status(), Json(body)).into_response()
    }
}
