//! Identity extraction from upstream authentication headers.
//!
//! Authentication itself belongs to the external identity provider; this
//! API trusts the headers its gateway injects after a successful login and
//! never checks credentials.

use axum::extract::Request;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use grievance_core::{AppError, UserIdentity};

use crate::error::ApiResult;

const SUBJECT_HEADER: &str = "x-auth-subject";
const EMAIL_HEADER: &str = "x-auth-email";
const EMAIL_VERIFIED_HEADER: &str = "x-auth-email-verified";
const DISPLAY_NAME_HEADER: &str = "x-auth-display-name";

pub async fn require_identity(mut request: Request, next: Next) -> ApiResult<Response> {
    let identity = identity_from_headers(request.headers())?;
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

fn identity_from_headers(headers: &HeaderMap) -> Result<UserIdentity, AppError> {
    let subject = header_value(headers, SUBJECT_HEADER)?;
    let email = header_value(headers, EMAIL_HEADER)?;
    let email_verified = headers
        .get(EMAIL_VERIFIED_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("true"));
    let display_name = headers
        .get(DISPLAY_NAME_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .map(str::to_owned);

    Ok(UserIdentity::new(subject, email, email_verified, display_name))
}

fn header_value(headers: &HeaderMap, name: &str) -> Result<String, AppError> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .map(str::to_owned)
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))
}
