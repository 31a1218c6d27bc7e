mod common;

use actix_web::{test, App};
use mentorhub_server::{routes, ThrottleConfig};
use serde_json::json;
use std::net::SocketAddr;

fn peer(last_octet: u8) -> SocketAddr {
    SocketAddr::from(([10, 0, 0, last_octet], 40000))
}

#[actix_web::test]
async fn test_advice_success() {
    let state = common::test_state();
    let app = test::init_service(App::new().app_data(state).configure(routes)).await;

    let response = test::TestRequest::post()
        .uri("/api/get-advice")
        .peer_addr(peer(1))
        .set_json(json!({ "query": "How do I find my first customers?" }))
        .send_request(&app)
        .await;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(
        body["advice"],
        "[business] advice for: How do I find my first customers?"
    );
    assert_eq!(body["category"], "business");
    assert_eq!(body["language"], "en");
    assert!(body["timestamp"].is_string());
}

#[actix_web::test]
async fn test_advice_is_translated_for_non_english_requests() {
    let state = common::test_state();
    let app = test::init_service(App::new().app_data(state).configure(routes)).await;

    let response = test::TestRequest::post()
        .uri("/api/get-advice")
        .peer_addr(peer(1))
        .set_json(json!({
            "query": "How do I price my product?",
            "language": "fr",
            "category": "marketing"
        }))
        .send_request(&app)
        .await;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(
        body["advice"],
        "[marketing] advice for: How do I price my product? (fr)"
    );
    assert_eq!(body["language"], "fr");
}

#[actix_web::test]
async fn test_advice_validation_messages() {
    let state = common::test_state();
    let app = test::init_service(App::new().app_data(state).configure(routes)).await;

    let response = test::TestRequest::post()
        .uri("/api/get-advice")
        .peer_addr(peer(1))
        .set_json(json!({ "language": "en" }))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["error"], "Missing required field: query");

    let response = test::TestRequest::post()
        .uri("/api/get-advice")
        .peer_addr(peer(1))
        .set_json(json!({ "query": "x".repeat(1001) }))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["error"], "Query exceeds maximum length of 1000 characters");

    let response = test::TestRequest::post()
        .uri("/api/get-advice")
        .peer_addr(peer(1))
        .set_json(json!({ "query": "q", "category": "astrology" }))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(
        body["error"],
        "Invalid category. Must be one of: business, marketing, finance, strategy, leadership"
    );
}

#[actix_web::test]
async fn test_advice_rate_limit() {
    let state = common::test_state_with(
        ThrottleConfig {
            max_requests: 3,
            window_seconds: 60,
        },
        "http://localhost:9091",
    );
    let app = test::init_service(App::new().app_data(state).configure(routes)).await;

    for _ in 0..3 {
        let response = test::TestRequest::post()
            .uri("/api/get-advice")
            .peer_addr(peer(1))
            .set_json(json!({ "query": "q" }))
            .send_request(&app)
            .await;
        assert_eq!(response.status(), 200);
    }

    let response = test::TestRequest::post()
        .uri("/api/get-advice")
        .peer_addr(peer(1))
        .set_json(json!({ "query": "q" }))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 429);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["error"], "Rate limit exceeded");
    assert_eq!(body["retry_after"], 60);

    // A different client address still gets through.
    let response = test::TestRequest::post()
        .uri("/api/get-advice")
        .peer_addr(peer(2))
        .set_json(json!({ "query": "q" }))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 200);
}

#[actix_web::test]
async fn test_throttle_applies_before_validation() {
    let state = common::test_state_with(
        ThrottleConfig {
            max_requests: 1,
            window_seconds: 60,
        },
        "http://localhost:9091",
    );
    let app = test::init_service(App::new().app_data(state).configure(routes)).await;

    let response = test::TestRequest::post()
        .uri("/api/get-advice")
        .peer_addr(peer(1))
        .set_json(json!({ "query": "q" }))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 200);

    // Even an invalid payload is counted and rejected by the throttle
    // first.
    let response = test::TestRequest::post()
        .uri("/api/get-advice")
        .peer_addr(peer(1))
        .set_json(json!({}))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 429);
}
