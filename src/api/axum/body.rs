use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::{Form, Json};
use serde::de::DeserializeOwned;

use super::error::AppError;
use crate::AuthError;

/// Request body accepted either as JSON or as an url-encoded form, chosen by
/// `Content-Type`. Anything that is not a form is parsed as JSON.
///
/// Extra form fields such as the CSRF `_token` are ignored.
#[derive(Debug, Clone)]
pub struct JsonOrForm<T>(pub T);

fn is_urlencoded_form(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"))
}

impl<T, S> FromRequest<S> for JsonOrForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_urlencoded_form(&req) {
            let Form(body) = Form::<T>::from_request(req, state)
                .await
                .map_err(|rejection| AppError::new(AuthError::Validation(rejection.body_text())))?;
            return Ok(Self(body));
        }

        let Json(body) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::new(AuthError::Validation(rejection.body_text())))?;
        Ok(Self(body))
    }
}
