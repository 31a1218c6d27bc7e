pub mod advice;
pub mod auth;
pub mod config;
pub mod error;
pub mod resources;
pub mod store;

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use sqlx::postgres::PgPoolOptions;

pub use config::Settings;
pub use error::{AppError, AuthError, StoreError};
pub type Result<T> = std::result::Result<T, AppError>;

pub use advice::{AdviceProvider, OpenAiProvider};
pub use auth::{AuthenticatedUser, RateLimiter, ThrottleConfig, ThrottleDecision, TokenService};
pub use resources::CourseCatalog;
pub use store::{CredentialStore, MemoryStore, PgStore, ResourceStore};

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Application state shared across all workers. Stores and the advice
/// provider sit behind trait objects so tests can swap in in-memory and
/// canned implementations.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub users: Arc<dyn CredentialStore>,
    pub resources: Arc<dyn ResourceStore>,
    pub tokens: Arc<TokenService>,
    pub advice_limiter: Arc<RateLimiter>,
    pub advice: Arc<dyn AdviceProvider>,
    pub courses: Arc<CourseCatalog>,
}

impl AppState {
    pub async fn new(config: Settings) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect(&config.database.url)
            .await
            .map_err(|e| AppError::Store(StoreError::Connection(e.to_string())))?;

        sqlx::migrate!()
            .run(&pool)
            .await
            .map_err(|e| AppError::Store(StoreError::Query(e.to_string())))?;

        let store = Arc::new(PgStore::new(Arc::new(pool)));

        Ok(Self {
            users: store.clone(),
            resources: store,
            tokens: Arc::new(TokenService::new(
                config.auth.jwt_secret.clone(),
                config.auth.token_expiry_hours,
            )),
            advice_limiter: Arc::new(RateLimiter::new(ThrottleConfig {
                max_requests: config.throttle.max_requests,
                window_seconds: config.throttle.window_seconds,
            })),
            advice: Arc::new(OpenAiProvider::new(&config.advice)?),
            courses: Arc::new(CourseCatalog::new(config.courses.api_url.clone())),
            config: Arc::new(config),
        })
    }
}

/// Registers every route plus the JSON payload error handler. `main` and
/// the integration tests share this so the surfaces cannot drift apart.
pub fn routes(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        let detail = err.to_string();
        actix_web::error::InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(serde_json::json!({ "error": detail })),
        )
        .into()
    });

    cfg.app_data(json_config)
        .route("/health", web::get().to(health_check))
        .route("/api/auth/signup", web::post().to(auth::handlers::signup))
        .route("/api/auth/login", web::post().to(auth::handlers::login))
        .route("/api/auth/verify", web::get().to(auth::handlers::verify))
        .route("/api/auth/logout", web::post().to(auth::handlers::logout))
        .route("/api/user/profile", web::get().to(auth::handlers::profile))
        .route(
            "/api/resources",
            web::get().to(resources::handlers::list_resources),
        )
        .route(
            "/api/resources",
            web::post().to(resources::handlers::create_resource),
        )
        .route(
            "/recommendations/{user_id}",
            web::get().to(resources::handlers::recommendations),
        )
        .route("/search", web::get().to(resources::handlers::search))
        .route("/api/stats", web::get().to(resources::handlers::stats))
        .route(
            "/api/fetch-courses/{topic}",
            web::get().to(resources::handlers::fetch_courses),
        )
        .route(
            "/api/get-advice",
            web::post().to(advice::handlers::get_advice),
        );
}
