use crate::error::{AppError, AuthError};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by an issued token. `user_id` deserializes as optional so
/// that a token missing the claim surfaces as `MissingClaims` instead of a
/// generic decode failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

/// Issues and verifies HS256-signed bearer tokens. Holds only the immutable
/// signing secret and lifetime, so it is safe to share across workers.
pub struct TokenService {
    secret: String,
    lifetime: Duration,
}

impl TokenService {
    pub fn new(secret: impl Into<String>, expiry_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            lifetime: Duration::hours(expiry_hours),
        }
    }

    /// Produces a signed token embedding `user_id` with expiry set to
    /// now + configured lifetime.
    pub fn issue(&self, user_id: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            user_id: Some(user_id.to_string()),
            exp: (now + self.lifetime).timestamp(),
            iat: Some(now.timestamp()),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("token signing failed: {}", e)))
    }

    /// Checks signature and expiry atomically and returns the embedded
    /// `user_id`. Only HS256 is accepted; a token signed with any other
    /// algorithm or secret is rejected.
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is final; no grace period.
        validation.leeway = 0;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::InvalidToken(e.to_string()),
        })?;

        data.claims.user_id.ok_or(AuthError::MissingClaims)
    }
}
