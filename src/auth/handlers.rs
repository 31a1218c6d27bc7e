use crate::auth::password::{hash_password, verify_password};
use crate::auth::AuthenticatedUser;
use crate::error::{AppError, AuthError};
use crate::store::NewUser;
use crate::AppState;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub gender: Option<String>,
    pub location: Option<String>,
    pub language: Option<String>,
    pub interests: Option<String>,
    pub avatar: Option<String>,
    pub title: Option<String>,
    pub badges: Option<String>,
    pub expertise: Option<String>,
}

struct ValidSignup {
    name: String,
    email: String,
    password: String,
}

/// Required-field and format checks run before any store access so a bad
/// payload produces a single validation error.
fn validate_signup(req: &SignupRequest) -> Result<ValidSignup, AppError> {
    let (name, email, password) = match (&req.name, &req.email, &req.password) {
        (Some(name), Some(email), Some(password))
            if !name.is_empty() && !email.is_empty() && !password.is_empty() =>
        {
            (name.clone(), email.clone(), password.clone())
        }
        _ => return Err(AppError::Validation("Missing required fields".into())),
    };

    if !email.contains('@') {
        return Err(AppError::Validation("Invalid email address".into()));
    }
    if password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".into(),
        ));
    }

    Ok(ValidSignup {
        name,
        email,
        password,
    })
}

pub async fn signup(
    req: web::Json<SignupRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let valid = validate_signup(&req)?;
    info!("Received signup request for email: {}", valid.email);

    if state.users.find_by_email(&valid.email).await?.is_some() {
        return Err(AppError::Validation("Email already registered".into()));
    }

    let user = state
        .users
        .insert_user(NewUser {
            uid: Uuid::new_v4().to_string(),
            name: valid.name,
            email: valid.email,
            password_hash: hash_password(&valid.password)?,
            gender: req.gender.clone(),
            location: req.location.clone(),
            language: req.language.clone(),
            interests: req.interests.clone(),
            avatar: Some(req.avatar.clone().unwrap_or_default()),
            title: Some(req.title.clone().unwrap_or_else(|| "Member".into())),
            badges: Some(req.badges.clone().unwrap_or_else(|| "New Member".into())),
            expertise: Some(req.expertise.clone().unwrap_or_default()),
        })
        .await?;

    let token = state.tokens.issue(&user.uid)?;
    info!("Signup successful for email: {}", user.email);

    Ok(HttpResponse::Created().json(json!({
        "message": "User created successfully",
        "token": token,
        "user": user.public(),
    })))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub async fn login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (email, password) = match (&req.email, &req.password) {
        (Some(email), Some(password)) => (email, password),
        _ => {
            return Err(AppError::Validation(
                "Email and password are required".into(),
            ))
        }
    };
    info!("Received login request for email: {}", email);

    let user = state.users.find_by_email(email).await?;
    match user {
        Some(user) if verify_password(password, &user.password_hash) => {
            let token = state.tokens.issue(&user.uid)?;
            info!("Login successful for email: {}", email);
            Ok(HttpResponse::Ok().json(json!({
                "message": "Login successful",
                "token": token,
                "user": user.public(),
            })))
        }
        _ => {
            error!("Login failed for email: {}", email);
            Err(AuthError::InvalidCredentials.into())
        }
    }
}

/// Confirms a presented token against the store; useful for clients
/// restoring a session.
pub async fn verify(
    auth: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    match state.users.find_by_uid(&auth.user_id).await? {
        Some(user) => Ok(HttpResponse::Ok().json(json!({
            "verified": true,
            "user": user.public(),
        }))),
        None => Ok(HttpResponse::NotFound().json(json!({
            "verified": false,
            "error": "User not found",
        }))),
    }
}

/// Tokens are stateless, so logout is advisory: clients drop the token and
/// it dies at expiry. The credential header is still required.
pub async fn logout(req: HttpRequest) -> Result<HttpResponse, AppError> {
    if req.headers().get("Authorization").is_none() {
        return Err(AppError::Validation("No token provided".into()));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Logout successful" })))
}

pub async fn profile(
    auth: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = match state.users.find_by_uid(&auth.user_id).await? {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({ "error": "User not found" })))
        }
    };

    let badges: Vec<String> = user
        .badges
        .as_deref()
        .map(|raw| raw.split(',').map(str::to_string).collect())
        .unwrap_or_default();
    let expertise: Vec<String> = user
        .expertise
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .map(|raw| raw.split(',').map(str::to_string).collect())
        .unwrap_or_default();

    Ok(HttpResponse::Ok().json(json!({
        "name": user.name,
        "avatar": user
            .avatar
            .as_deref()
            .filter(|a| !a.is_empty())
            .unwrap_or("https://example.com/default-avatar.jpg"),
        "title": user
            .title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or("Business Professional"),
        "badges": badges,
        "expertise": expertise,
        "initials": user.initials(),
    })))
}
