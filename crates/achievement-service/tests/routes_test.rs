//! HTTP 接口测试

use std::sync::Arc;

use achievement::{
    AppState, BadgeCatalog, BadgeEvaluator, BadgeQueryService, EvaluationDispatcher,
    InMemoryStore, routes::build_router,
};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::{TimeZone, Utc};
use serde_json::Value;
use tower::ServiceExt;

async fn setup() -> (Router, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let catalog = Arc::new(BadgeCatalog::bootstrap(&*store).await.unwrap());
    let evaluator = BadgeEvaluator::new(catalog.clone(), store.clone(), store.clone());
    let state = AppState::new(
        BadgeQueryService::new(catalog, store.clone()),
        EvaluationDispatcher::inline(evaluator),
    );
    (build_router(state), store)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let payload = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, payload)
}

async fn post_json(app: Router, uri: &str, body: &'static str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_health() {
    let (app, _) = setup().await;
    let (status, body) = get_json(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_list_badges() {
    let (app, _) = setup().await;
    let (status, body) = get_json(app, "/api/badges").await;
    assert_eq!(status, StatusCode::OK);

    let badges = body.as_array().unwrap();
    assert_eq!(badges.len(), 8);
    assert_eq!(badges[0]["name"], "first_post");
    assert!(badges[0]["icon"].as_str().unwrap().starts_with("https://"));
    assert!(badges[0]["id"].is_i64());
}

#[tokio::test]
async fn test_list_badges_trailing_slash() {
    let (app, _) = setup().await;
    let (status, body) = get_json(app, "/api/badges/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn test_unknown_user_has_no_badges() {
    let (app, _) = setup().await;
    let (status, body) = get_json(app, "/api/badges/users/999").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn test_invalid_user_id_rejected() {
    let (app, _) = setup().await;
    let (status, body) = get_json(app, "/api/badges/users/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["message"].as_str().unwrap().contains("abc"));
}

#[tokio::test]
async fn test_activity_event_grants_badges() {
    let (app, store) = setup().await;
    store.add_post(7, Utc.with_ymd_and_hms(2026, 5, 1, 2, 30, 0).unwrap());

    let (status, _) = post_json(
        app.clone(),
        "/internal/activity",
        r#"{"type":"POST_CREATED","authorId":7}"#,
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (status, body) = get_json(app, "/api/badges/users/7").await;
    assert_eq!(status, StatusCode::OK);

    let mut names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["badge"]["name"].as_str().unwrap().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["first_post", "night_owl"]);
    assert!(body[0]["awarded_at"].is_string());
}

#[tokio::test]
async fn test_activity_event_failure_still_accepted() {
    let (app, store) = setup().await;
    store.set_failing_queries(true);

    let (status, _) = post_json(
        app,
        "/internal/activity",
        r#"{"type":"COMMENT_CREATED","authorId":1}"#,
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(store.grant_count(), 0);
}

#[tokio::test]
async fn test_malformed_activity_event_rejected() {
    let (app, _) = setup().await;
    let (status, body) = post_json(app, "/internal/activity", r#"{"type":"FOLLOWED"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}
