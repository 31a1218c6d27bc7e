use crate::error::{AppError, AuthError};
use crate::AppState;
use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use std::future::{ready, Ready};

/// Identity resolved from a verified bearer token. Lives only for the
/// request it was extracted from; handlers that take it are guarded, all
/// others are public.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

/// Pulls the token out of an `Authorization` header value.
///
/// The header is trimmed once and split on the literal `"Bearer "`; exactly
/// two pieces must result. A raw token without the scheme, or a header
/// containing the scheme more than once, is malformed -- no further
/// trimming or repair is attempted.
pub fn extract_bearer(header: &str) -> Result<String, AuthError> {
    let parts: Vec<&str> = header.trim().split("Bearer ").collect();
    if parts.len() != 2 {
        return Err(AuthError::MalformedHeader);
    }

    let token = parts[1].trim();
    if token.is_empty() {
        return Err(AuthError::EmptyToken);
    }

    Ok(token.to_string())
}

fn authorize(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("application state not configured".into()))?;

    let header = match req.headers().get(header::AUTHORIZATION) {
        Some(value) => value
            .to_str()
            .map_err(|_| AuthError::MalformedHeader)?,
        None => return Err(AuthError::NoCredential.into()),
    };
    if header.is_empty() {
        return Err(AuthError::NoCredential.into());
    }

    let token = extract_bearer(header)?;
    let user_id = state.tokens.verify(&token)?;

    Ok(AuthenticatedUser { user_id })
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authorize(req))
    }
}
