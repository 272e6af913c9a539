use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::http::header::{CONTENT_TYPE, COOKIE};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::error::AppError;
use crate::AuthError;
use crate::csrf::{CsrfCandidates, CsrfGuard, cookie_value, is_exempt_method};

/// Largest url-encoded body buffered while looking for the form field.
const MAX_FORM_BYTES: usize = 64 * 1024;

fn is_urlencoded_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"))
}

/// Rejects non-GET/HEAD requests without a valid CSRF token.
///
/// Install with `axum::middleware::from_fn_with_state(guard, csrf_protect)`.
/// For url-encoded bodies the body is buffered to read the form field and
/// handed on to the inner service unchanged.
pub async fn csrf_protect(State(guard): State<CsrfGuard>, request: Request, next: Next) -> Response {
    if is_exempt_method(request.method().as_str()) {
        return next.run(request).await;
    }

    let (parts, body) = request.into_parts();
    let config = guard.config();

    let header = parts
        .headers
        .get(config.header_name.as_str())
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_owned);

    let cookie = parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| cookie_value(v, &config.cookie_name))
        .map(str::to_owned);

    let (body, form) = if header.is_none() && is_urlencoded_form(&parts.headers) {
        let bytes = match to_bytes(body, MAX_FORM_BYTES).await {
            Ok(bytes) => bytes,
            Err(_) => {
                return AppError::new(AuthError::Validation(
                    "request body too large".to_owned(),
                ))
                .into_response();
            }
        };
        let form = url::form_urlencoded::parse(&bytes)
            .find(|(key, _)| key == config.form_field.as_str())
            .map(|(_, value)| value.into_owned());
        (Body::from(bytes), form)
    } else {
        (body, None)
    };

    let candidates = CsrfCandidates {
        header: header.as_deref(),
        form: form.as_deref(),
        cookie: cookie.as_deref(),
    };

    if let Err(err) = guard.check(parts.method.as_str(), &candidates) {
        return AppError::new(err).into_response();
    }

    next.run(Request::from_parts(parts, body)).await
}
