use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External service error: {0}")]
    External(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Store(err.into())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

// The body shapes here are part of the public API contract: clients branch
// on the `code` field, so every variant must keep its exact JSON layout.
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Auth(e) => match e {
                AuthError::Expired => json!({
                    "error": e.to_string(),
                    "code": "token_expired",
                }),
                AuthError::InvalidToken(_) => json!({
                    "error": e.to_string(),
                    "code": "token_invalid",
                }),
                AuthError::MissingClaims => json!({
                    "error": e.to_string(),
                    "code": "token_invalid_claims",
                }),
                AuthError::RateLimited { retry_after } => json!({
                    "error": e.to_string(),
                    "retry_after": retry_after,
                }),
                _ => json!({ "error": e.to_string() }),
            },
            AppError::Validation(message) => json!({ "error": message }),
            AppError::Store(StoreError::NotFound) => json!({ "error": "Record not found" }),
            AppError::Store(StoreError::Duplicate) => {
                json!({ "error": "Database integrity error" })
            }
            AppError::Store(_) => json!({
                "error": "Database error",
                "code": "server_error",
            }),
            AppError::External(detail) => json!({
                "error": format!("Service error: {}", detail),
                "code": "server_error",
            }),
            other => json!({
                "error": other.to_string(),
                "code": "server_error",
            }),
        };

        HttpResponse::build(self.status_code()).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(e) => match e {
                AuthError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
                _ => StatusCode::UNAUTHORIZED,
            },
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
            AppError::Store(StoreError::Duplicate) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No token provided")]
    NoCredential,

    #[error("Invalid token format. Expected \"Bearer <token>\"")]
    MalformedHeader,

    #[error("Empty token provided")]
    EmptyToken,

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token payload missing required claims")]
    MissingClaims,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Rate limit exceeded")]
    RateLimited { retry_after: u64 },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Record not found")]
    NotFound,

    #[error("Duplicate record")]
    Duplicate,
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(e)
                if matches!(e.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
            {
                StoreError::Duplicate
            }
            other => StoreError::Query(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_of(err: &AppError) -> serde_json::Value {
        let bytes = to_bytes(err.error_response().into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Auth(AuthError::NoCredential).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Auth(AuthError::Expired).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Auth(AuthError::RateLimited { retry_after: 60 }).status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::Validation("bad input".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Store(StoreError::NotFound).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn test_auth_error_bodies() {
        let body = body_of(&AppError::Auth(AuthError::NoCredential)).await;
        assert_eq!(body["error"], "No token provided");
        assert!(body.get("code").is_none());

        let body = body_of(&AppError::Auth(AuthError::Expired)).await;
        assert_eq!(body["error"], "Token has expired");
        assert_eq!(body["code"], "token_expired");

        let body = body_of(&AppError::Auth(AuthError::InvalidToken("InvalidSignature".into()))).await;
        assert_eq!(body["error"], "Invalid token: InvalidSignature");
        assert_eq!(body["code"], "token_invalid");

        let body = body_of(&AppError::Auth(AuthError::MalformedHeader)).await;
        assert_eq!(body["error"], "Invalid token format. Expected \"Bearer <token>\"");
    }

    #[actix_web::test]
    async fn test_rate_limited_body_carries_retry_after() {
        let body = body_of(&AppError::Auth(AuthError::RateLimited { retry_after: 3600 })).await;
        assert_eq!(body["error"], "Rate limit exceeded");
        assert_eq!(body["retry_after"], 3600);
    }

    #[actix_web::test]
    async fn test_internal_errors_are_marked_server_error() {
        let body = body_of(&AppError::Internal("clock unavailable".into())).await;
        assert_eq!(body["code"], "server_error");

        let body = body_of(&AppError::External("connection refused".into())).await;
        assert_eq!(body["error"], "Service error: connection refused");
        assert_eq!(body["code"], "server_error");
    }

    #[test]
    fn test_sqlx_error_conversion() {
        let err: StoreError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, StoreError::NotFound));

        let app_err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(app_err, AppError::Store(StoreError::NotFound)));
    }
}
