use crate::auth::ThrottleDecision;
use crate::error::{AppError, AuthError};
use crate::AppState;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

const VALID_CATEGORIES: [&str; 5] =
    ["business", "marketing", "finance", "strategy", "leadership"];

const MAX_QUERY_LENGTH: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct AdviceRequest {
    pub query: Option<String>,
    pub language: Option<String>,
    pub category: Option<String>,
}

struct ValidAdvice {
    query: String,
    language: String,
    category: String,
}

/// Schema check for the advice payload: required vs. optional fields are
/// settled here, before any provider call, yielding one structured error.
fn validate(req: &AdviceRequest) -> Result<ValidAdvice, AppError> {
    let query = req
        .query
        .clone()
        .ok_or_else(|| AppError::Validation("Missing required field: query".into()))?;

    if query.chars().count() > MAX_QUERY_LENGTH {
        return Err(AppError::Validation(
            "Query exceeds maximum length of 1000 characters".into(),
        ));
    }

    let category = req.category.clone().unwrap_or_else(|| "business".into());
    if !VALID_CATEGORIES.contains(&category.as_str()) {
        return Err(AppError::Validation(format!(
            "Invalid category. Must be one of: {}",
            VALID_CATEGORIES.join(", ")
        )));
    }

    Ok(ValidAdvice {
        query,
        language: req.language.clone().unwrap_or_else(|| "en".into()),
        category,
    })
}

fn client_key(req: &HttpRequest) -> String {
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Generates mentorship advice, translating the reply when a non-English
/// language is requested. Throttled per client address, independently of
/// authentication.
pub async fn get_advice(
    req: HttpRequest,
    body: web::Json<AdviceRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let key = client_key(&req);
    if let ThrottleDecision::Denied { retry_after } =
        state.advice_limiter.check_and_record(&key).await
    {
        info!("Rate limit exceeded for client: {}", key);
        return Err(AuthError::RateLimited { retry_after }.into());
    }

    let valid = validate(&body)?;
    info!(
        "Processing advice request - Category: {}, Language: {}",
        valid.category, valid.language
    );

    let mut advice = state
        .advice
        .advise(&valid.category, &valid.query)
        .await
        .map_err(|e| {
            error!("Advice provider error: {}", e);
            e
        })?;

    if valid.language != "en" {
        advice = state.advice.translate(&advice, &valid.language).await?;
    }

    Ok(HttpResponse::Ok().json(json!({
        "advice": advice,
        "category": valid.category,
        "language": valid.language,
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::provider::MockAdviceProvider;
    use crate::auth::{RateLimiter, ThrottleConfig, TokenService};
    use crate::resources::CourseCatalog;
    use crate::store::MemoryStore;
    use crate::Settings;
    use actix_web::{test, App};
    use std::sync::Arc;

    fn request(query: Option<&str>, language: Option<&str>, category: Option<&str>) -> AdviceRequest {
        AdviceRequest {
            query: query.map(Into::into),
            language: language.map(Into::into),
            category: category.map(Into::into),
        }
    }

    #[::core::prelude::v1::test]
    fn test_query_is_required() {
        let err = validate(&request(None, None, None)).err().unwrap();
        assert!(matches!(err, AppError::Validation(m) if m == "Missing required field: query"));
    }

    #[::core::prelude::v1::test]
    fn test_query_length_cap() {
        let long = "x".repeat(MAX_QUERY_LENGTH + 1);
        let err = validate(&request(Some(&long), None, None)).err().unwrap();
        assert!(matches!(err, AppError::Validation(m) if m.starts_with("Query exceeds")));

        let at_cap = "x".repeat(MAX_QUERY_LENGTH);
        assert!(validate(&request(Some(&at_cap), None, None)).is_ok());
    }

    #[::core::prelude::v1::test]
    fn test_category_must_be_known() {
        let err = validate(&request(Some("q"), None, Some("astrology")))
            .err()
            .unwrap();
        assert!(matches!(err, AppError::Validation(m) if m.starts_with("Invalid category")));
    }

    #[::core::prelude::v1::test]
    fn test_defaults_applied() {
        let valid = validate(&request(Some("q"), None, None)).unwrap();
        assert_eq!(valid.language, "en");
        assert_eq!(valid.category, "business");
    }

    fn mock_state(provider: MockAdviceProvider) -> actix_web::web::Data<AppState> {
        let store = Arc::new(MemoryStore::new());
        actix_web::web::Data::new(AppState {
            config: Arc::new(Settings::new_for_test().unwrap()),
            users: store.clone(),
            resources: store,
            tokens: Arc::new(TokenService::new("test_secret", 24)),
            advice_limiter: Arc::new(RateLimiter::new(ThrottleConfig {
                max_requests: 10,
                window_seconds: 60,
            })),
            advice: Arc::new(provider),
            courses: Arc::new(CourseCatalog::new("http://localhost:9091")),
        })
    }

    #[actix_web::test]
    async fn test_non_english_reply_is_translated() {
        let mut provider = MockAdviceProvider::new();
        provider
            .expect_advise()
            .returning(|_, _| Ok("start small".to_string()));
        provider
            .expect_translate()
            .withf(|text, language| text == "start small" && language == "fr")
            .returning(|_, _| Ok("commencez petit".to_string()));

        let app = test::init_service(
            App::new()
                .app_data(mock_state(provider))
                .route("/api/get-advice", actix_web::web::post().to(get_advice)),
        )
        .await;

        let response = test::TestRequest::post()
            .uri("/api/get-advice")
            .set_json(json!({ "query": "How do I price my product?", "language": "fr" }))
            .send_request(&app)
            .await;

        assert_eq!(response.status(), 200);
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["advice"], "commencez petit");
        assert_eq!(body["language"], "fr");
    }

    #[actix_web::test]
    async fn test_provider_failure_maps_to_service_error() {
        let mut provider = MockAdviceProvider::new();
        provider
            .expect_advise()
            .returning(|_, _| Err(AppError::External("upstream timed out".into())));

        let app = test::init_service(
            App::new()
                .app_data(mock_state(provider))
                .route("/api/get-advice", actix_web::web::post().to(get_advice)),
        )
        .await;

        let response = test::TestRequest::post()
            .uri("/api/get-advice")
            .set_json(json!({ "query": "help" }))
            .send_request(&app)
            .await;

        assert_eq!(response.status(), 500);
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["error"], "Service error: upstream timed out");
        assert_eq!(body["code"], "server_error");
    }
}
