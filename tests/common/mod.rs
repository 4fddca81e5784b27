#![allow(dead_code)]

use http::Request;
use serde::de::DeserializeOwned;
use serde::Serialize;
use step_entry_ledger::app::{build_router, AppState};
use step_entry_ledger::config::environment::AppConfig;
use step_entry_ledger::module::participant::schema::{
    RegisterParticipantRequest, RegisterParticipantResponse,
};
use step_entry_ledger::module::step_entry::model::EntrySource;
use step_entry_ledger::module::step_entry::schema::{
    SubmitStepEntryRequest, SubmitStepEntryResponse,
};
use tower::util::ServiceExt;

pub fn test_config() -> AppConfig {
    AppConfig {
        rust_env: "test".to_string(),
        api_host: "127.0.0.1".to_string(),
        api_port: 0,
        redis_url: None,
        ocr_base_url: None,
        ocr_timeout_seconds: 5,
    }
}

pub fn test_app() -> axum::Router {
    build_router(AppState::new(test_config(), None))
}

pub async fn post_json<B: Serialize, R: DeserializeOwned>(
    app: axum::Router,
    uri: &str,
    req: &B,
) -> (http::StatusCode, R) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(req).expect("serialize request"),
        ))
        .expect("build request");
    send(app, request).await
}

pub async fn get_json<R: DeserializeOwned>(app: axum::Router, uri: &str) -> (http::StatusCode, R) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(axum::body::Body::empty())
        .expect("build request");
    send(app, request).await
}

pub async fn delete_json<R: DeserializeOwned>(
    app: axum::Router,
    uri: &str,
) -> (http::StatusCode, R) {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(axum::body::Body::empty())
        .expect("build request");
    send(app, request).await
}

async fn send<R: DeserializeOwned>(
    app: axum::Router,
    request: Request<axum::body::Body>,
) -> (http::StatusCode, R) {
    let response = app.oneshot(request).await.expect("request failed");
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let payload: R = serde_json::from_slice(&body).expect("deserialize response");
    (status, payload)
}

pub async fn register(app: axum::Router, name: &str, email: Option<&str>) -> String {
    let req = RegisterParticipantRequest {
        name: name.to_string(),
        email: email.map(ToOwned::to_owned),
        employee_id: None,
        auth_uid: None,
    };
    let (status, resp): (_, RegisterParticipantResponse) =
        post_json(app, "/v1/participants", &req).await;
    assert_eq!(status, http::StatusCode::OK, "register failed: {}", resp.reason);
    resp.participant.expect("participant").participant_id
}

pub async fn submit_counter_entry(
    app: axum::Router,
    participant_id: &str,
    steps: i64,
) -> (http::StatusCode, SubmitStepEntryResponse) {
    let req = SubmitStepEntryRequest {
        participant_id: participant_id.to_string(),
        steps,
        screenshot_base64: None,
        source: EntrySource::StepCounter,
    };
    post_json(app, "/v1/entries", &req).await
}

pub async fn submit_screenshot_entry(
    app: axum::Router,
    participant_id: &str,
    steps: i64,
    screenshot_base64: &str,
) -> (http::StatusCode, SubmitStepEntryResponse) {
    let req = SubmitStepEntryRequest {
        participant_id: participant_id.to_string(),
        steps,
        screenshot_base64: Some(screenshot_base64.to_string()),
        source: EntrySource::Screenshot,
    };
    post_json(app, "/v1/entries", &req).await
}
