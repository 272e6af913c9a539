//! Axum handlers for the auth endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::IntoResponse;

use super::body::JsonOrForm;
use super::client_ip::ClientIp;
use super::error::AppError;
use super::routes::AppState;
use crate::api::{
    CsrfTokenResponse, HealthResponse, LoginRequest, RefreshTokenRequest, RegisterRequest,
    RegisterResponse, TokenResponse,
};
use crate::jwt::TokenSigner;
use crate::validators::{ValidationError, normalize_email, validate_email, validate_password};
use crate::{AuthError, RefreshTokenRepository, UserRepository};

/// POST /register
pub async fn register<U, R, S>(
    State(state): State<AppState<U, R, S>>,
    JsonOrForm(body): JsonOrForm<RegisterRequest>,
) -> Result<Json<RegisterResponse>, AppError>
where
    U: UserRepository + Clone + 'static,
    R: RefreshTokenRepository + Clone + 'static,
    S: TokenSigner + Clone + 'static,
{
    let user = state
        .signup_action()
        .execute(&body.name, &body.email, body.password.expose_secret())
        .await?;

    Ok(Json(RegisterResponse::from(user)))
}

/// POST /auth/login
pub async fn login<U, R, S>(
    State(state): State<AppState<U, R, S>>,
    JsonOrForm(body): JsonOrForm<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError>
where
    U: UserRepository + Clone + 'static,
    R: RefreshTokenRepository + Clone + 'static,
    S: TokenSigner + Clone + 'static,
{
    validate_email(&normalize_email(&body.email)).map_err(AuthError::from)?;
    validate_password(body.password.expose_secret()).map_err(AuthError::from)?;

    let pair = state
        .login_action()
        .execute(&body.email, body.password.expose_secret())
        .await
        .map_err(|e| {
            AppError::new(e).exposing_credential_failure(state.config.login.expose_credential_failure)
        })?;

    Ok(Json(TokenResponse::from(pair)))
}

/// POST /auth/refresh
pub async fn refresh<U, R, S>(
    State(state): State<AppState<U, R, S>>,
    ClientIp(ip): ClientIp,
    JsonOrForm(body): JsonOrForm<RefreshTokenRequest>,
) -> Result<Json<TokenResponse>, AppError>
where
    U: UserRepository + Clone + 'static,
    R: RefreshTokenRepository + Clone + 'static,
    S: TokenSigner + Clone + 'static,
{
    if body.refresh_token.is_empty() {
        return Err(AuthError::from(ValidationError::Required("refresh_token")).into());
    }

    let pair = state
        .refresh_action()
        .execute(body.refresh_token.expose_secret(), &ip)
        .await?;

    Ok(Json(TokenResponse::from(pair)))
}

/// GET /csrf/get
///
/// Returns a fresh token in the body and sets it as an `HttpOnly` cookie.
pub async fn csrf_token<U, R, S>(State(state): State<AppState<U, R, S>>) -> impl IntoResponse
where
    U: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
    S: Clone + Send + Sync + 'static,
{
    let token = state.csrf.issue();
    let csrf = state.csrf.config();
    let cookie = format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly",
        csrf.cookie_name,
        token,
        csrf.validity.num_seconds()
    );

    ([(SET_COOKIE, cookie)], Json(CsrfTokenResponse { csrf_token: token }))
}

/// GET /healthcheck
pub async fn healthcheck() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
