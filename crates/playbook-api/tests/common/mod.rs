//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::TimeDelta;
use http_body_util::BodyExt;
use playbook_core::clock::Clock;
use playbook_event_store::in_memory::InMemoryEventRepository;
use playbook_narrative::application::perspective_engine::PerspectiveEngine;
use playbook_narrative::domain::generator::PerceptionGenerator;
use playbook_narrative::domain::rule_engine::RuleBasedGenerator;
use playbook_session::application::session_manager::SessionManager;
use playbook_story::application::loader::builtin_story;
use playbook_test_support::FixedClock;
use tower::ServiceExt;

use playbook_api::build_router;
use playbook_api::state::AppState;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Build the full app router over the built-in story, an in-memory event
/// store, and the rule-based generator.
pub fn build_test_app() -> Router {
    build_test_app_with(Arc::new(RuleBasedGenerator), fixed_clock())
}

/// Build the full app router with a custom generator and clock.
pub fn build_test_app_with(generator: Arc<dyn PerceptionGenerator>, clock: Arc<dyn Clock>) -> Router {
    let graph = Arc::new(builtin_story().unwrap());
    let sessions = Arc::new(SessionManager::new(
        Arc::clone(&graph),
        Arc::new(InMemoryEventRepository::new()),
        clock,
        TimeDelta::seconds(1800),
    ));
    let engine = Arc::new(PerspectiveEngine::new(
        graph,
        generator,
        Duration::from_millis(100),
    ));
    build_router(AppState::new(sessions, engine, Duration::from_millis(50)))
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Start a session as `character` (or the default) and return its id.
pub async fn start_session(app: &Router, character: Option<&str>) -> String {
    let body = match character {
        Some(c) => serde_json::json!({ "character": c }),
        None => serde_json::json!({}),
    };
    let (status, json) = post_json(app.clone(), "/api/v1/game/start", &body).await;
    assert_eq!(status, StatusCode::OK);
    json["session_id"].as_str().unwrap().to_owned()
}
