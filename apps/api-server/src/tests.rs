//! HTTP-level tests over in-memory repositories.

use std::sync::Arc;

use actix_web::{App, http::StatusCode, http::header, test, web};
use chrono::{Duration, Utc};
use serde_json::{Value, json};

use justdo_infra::{
    Argon2PasswordService, InMemoryTaskRepository, InMemoryUserRepository, JwtConfig,
    JwtTokenService,
};

use crate::handlers;
use crate::middleware::logging::{MAX_BUFFERED_BODY, RequestLogger};
use crate::state::AppState;

const PASSWORD: &str = "password123";

/// Fresh state per test; the task store handle is returned for side-effect checks.
fn test_state() -> (AppState, Arc<InMemoryTaskRepository>) {
    let tasks = Arc::new(InMemoryTaskRepository::new());
    let tokens = Arc::new(JwtTokenService::new(JwtConfig {
        secret: "test-secret".to_string(),
        expiration_hours: 1,
        issuer: "justdo-api".to_string(),
    }));
    let state = AppState::new(
        Arc::new(InMemoryUserRepository::new()),
        tasks.clone(),
        tokens,
        Arc::new(Argon2PasswordService::insecure_fast()),
    );
    (state, tasks)
}

macro_rules! init_app {
    ($state:expr) => {{
        let state: AppState = $state;
        let tokens = state.tokens();
        test::init_service(
            App::new()
                .wrap(RequestLogger)
                .app_data(web::Data::new(state))
                .configure(move |cfg| handlers::configure_routes(cfg, tokens)),
        )
        .await
    }};
}

/// Register `$email` and return the issued token.
macro_rules! register {
    ($app:expr, $email:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({ "email": $email, "password": PASSWORD }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        body["token"].as_str().unwrap().to_string()
    }};
}

/// Create a task as `$token` and return its JSON.
macro_rules! create_task {
    ($app:expr, $token:expr, $body:expr) => {{
        let req = test::TestRequest::post()
            .uri("/v1/tasks")
            .insert_header(bearer(&$token))
            .set_json($body)
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        body
    }};
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

fn ids(list: &Value) -> Vec<String> {
    list["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap().to_string())
        .collect()
}

#[actix_web::test]
async fn test_health() {
    let (state, _) = test_state();
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn test_task_routes_require_valid_token() {
    let (state, tasks) = test_state();
    let app = init_app!(state);
    let payload = json!({ "title": "X", "deadline": "2099-01-01T00:00:00Z" });

    let cases = [
        (None, "missing token"),
        (Some("Token abc".to_string()), "malformed token"),
        (Some("Bearer ".to_string()), "missing token"),
        (Some("Bearer not.a.jwt".to_string()), "invalid token"),
    ];

    for (header_value, message) in cases {
        let mut req = test::TestRequest::post()
            .uri("/v1/tasks")
            .set_json(payload.clone());
        if let Some(value) = header_value {
            req = req.insert_header((header::AUTHORIZATION, value));
        }

        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Unauthorized");
        assert_eq!(body["message"], message);
    }

    // Handler never ran
    assert!(tasks.is_empty().await);

    let req = test::TestRequest::get().uri("/v1/tasks/today").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_token_from_other_issuer_rejected() {
    let (state, _) = test_state();
    let app = init_app!(state);

    let foreign = JwtTokenService::new(JwtConfig {
        secret: "test-secret".to_string(),
        expiration_hours: 1,
        issuer: "someone-else".to_string(),
    });
    let token = justdo_core::ports::TokenService::issue(&foreign, uuid::Uuid::new_v4()).unwrap();

    let req = test::TestRequest::get()
        .uri("/v1/tasks")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_register_twice_conflicts() {
    let (state, _) = test_state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "email": "alice@example.com", "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert!(body["user"].get("password_hash").is_none());

    // Same address, different case and padding
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "email": "  Alice@Example.com ", "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Conflict");
}

#[actix_web::test]
async fn test_register_validation() {
    let (state, _) = test_state();
    let app = init_app!(state);

    for payload in [
        json!({ "email": "not-an-email", "password": PASSWORD }),
        json!({ "email": "bob@example.com", "password": "short" }),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

#[actix_web::test]
async fn test_login_failures_are_indistinguishable() {
    let (state, _) = test_state();
    let app = init_app!(state);
    register!(app, "alice@example.com");

    let mut bodies = Vec::new();
    for payload in [
        json!({ "email": "alice@example.com", "password": "wrong-password" }),
        json!({ "email": "nobody@example.com", "password": PASSWORD }),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        bodies.push(body);
    }

    assert_eq!(bodies[0], bodies[1]);
    assert_eq!(bodies[0]["message"], "invalid email or password");

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "alice@example.com", "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["email"], "alice@example.com");
}

#[actix_web::test]
async fn test_other_users_tasks_are_not_found() {
    let (state, _) = test_state();
    let app = init_app!(state);
    let alice = register!(app, "alice@example.com");
    let bob = register!(app, "bob@example.com");

    let task = create_task!(app, alice, json!({ "title": "Secret", "deadline": "2099-01-01T00:00:00Z" }));
    let id = task["id"].as_str().unwrap();

    let attempts = [
        test::TestRequest::put()
            .uri(&format!("/v1/tasks/{id}"))
            .set_json(json!({ "title": "Hijacked", "deadline": "2099-01-01T00:00:00Z" })),
        test::TestRequest::patch().uri(&format!("/v1/tasks/{id}/toggle")),
        test::TestRequest::delete().uri(&format!("/v1/tasks/{id}")),
    ];
    for req in attempts {
        let resp = test::call_service(&app, req.insert_header(bearer(&bob)).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    // Bob sees nothing, Alice's task is untouched
    let req = test::TestRequest::get()
        .uri("/v1/tasks")
        .insert_header(bearer(&bob))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(ids(&body).is_empty());

    let req = test::TestRequest::get()
        .uri("/v1/tasks")
        .insert_header(bearer(&alice))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["tasks"][0]["title"], "Secret");
    assert_eq!(body["tasks"][0]["completed"], false);
}

#[actix_web::test]
async fn test_malformed_task_id_is_not_found() {
    let (state, _) = test_state();
    let app = init_app!(state);
    let token = register!(app, "alice@example.com");

    let req = test::TestRequest::patch()
        .uri("/v1/tasks/not-a-uuid/toggle")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Not Found");
}

#[actix_web::test]
async fn test_toggle_round_trip() {
    let (state, _) = test_state();
    let app = init_app!(state);
    let token = register!(app, "alice@example.com");

    let task = create_task!(app, token, json!({ "title": "X", "deadline": "2099-01-01T00:00:00Z" }));
    assert_eq!(task["completed"], false);
    let id = task["id"].as_str().unwrap().to_string();

    for expected in [true, false, true] {
        let req = test::TestRequest::patch()
            .uri(&format!("/v1/tasks/{id}/toggle"))
            .insert_header(bearer(&token))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["id"], id.as_str());
        assert_eq!(body["completed"], expected);
    }
}

#[actix_web::test]
async fn test_replace_and_delete() {
    let (state, tasks) = test_state();
    let app = init_app!(state);
    let token = register!(app, "alice@example.com");

    let task = create_task!(app, token, json!({ "title": "Draft", "deadline": "2099-01-01T00:00:00Z" }));
    let id = task["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::put()
        .uri(&format!("/v1/tasks/{id}"))
        .insert_header(bearer(&token))
        .set_json(json!({
            "title": "Final",
            "description": "ship it",
            "deadline": "2099-02-01T09:30:00Z"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["id"], id.as_str());
    assert_eq!(body["title"], "Final");
    assert_eq!(body["description"], "ship it");

    // Replacing with an empty title is rejected and leaves the task alone
    let req = test::TestRequest::put()
        .uri(&format!("/v1/tasks/{id}"))
        .insert_header(bearer(&token))
        .set_json(json!({ "title": " ", "deadline": "2099-02-01T09:30:00Z" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::delete()
        .uri(&format!("/v1/tasks/{id}"))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(tasks.is_empty().await);

    let req = test::TestRequest::delete()
        .uri(&format!("/v1/tasks/{id}"))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_today_and_backlog_filters() {
    let (state, _) = test_state();
    let app = init_app!(state);
    let token = register!(app, "alice@example.com");

    let today_noon = Utc::now()
        .date_naive()
        .and_hms_opt(12, 0, 0)
        .unwrap()
        .and_utc();
    let today = create_task!(app, token, json!({ "title": "today", "deadline": today_noon }));
    let tomorrow = create_task!(
        app,
        token,
        json!({ "title": "tomorrow", "deadline": today_noon + Duration::days(1) })
    );
    let overdue = create_task!(
        app,
        token,
        json!({ "title": "overdue", "deadline": Utc::now() - Duration::days(2) })
    );
    let done = create_task!(
        app,
        token,
        json!({ "title": "done", "deadline": Utc::now() - Duration::days(3) })
    );
    let done_id = done["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::patch()
        .uri(&format!("/v1/tasks/{done_id}/toggle"))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/v1/tasks/today")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(ids(&body), vec![today["id"].as_str().unwrap().to_string()]);

    let req = test::TestRequest::get()
        .uri("/v1/tasks/backlog")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let backlog = ids(&body);
    assert!(backlog.contains(&overdue["id"].as_str().unwrap().to_string()));
    assert!(!backlog.contains(&done_id));
    assert!(!backlog.contains(&tomorrow["id"].as_str().unwrap().to_string()));
}

#[actix_web::test]
async fn test_list_by_deadline_query() {
    let (state, _) = test_state();
    let app = init_app!(state);
    let token = register!(app, "alice@example.com");

    let wanted = create_task!(app, token, json!({ "title": "A", "deadline": "2099-01-01T23:00:00Z" }));
    create_task!(app, token, json!({ "title": "B", "deadline": "2099-01-02T00:00:00Z" }));

    let req = test::TestRequest::get()
        .uri("/v1/tasks?deadline=2099-01-01")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(ids(&body), vec![wanted["id"].as_str().unwrap().to_string()]);

    let req = test::TestRequest::get()
        .uri("/v1/tasks")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(ids(&body).len(), 2);

    let req = test::TestRequest::get()
        .uri("/v1/tasks?deadline=01/01/2099")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_invalid_task_is_not_persisted() {
    let (state, tasks) = test_state();
    let app = init_app!(state);
    let token = register!(app, "alice@example.com");

    for payload in [
        json!({ "title": "", "deadline": "2099-01-01T00:00:00Z" }),
        json!({ "title": "No deadline" }),
        json!({ "title": "Zero deadline", "deadline": "0001-01-01T00:00:00Z" }),
    ] {
        let req = test::TestRequest::post()
            .uri("/v1/tasks")
            .insert_header(bearer(&token))
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Bad Request");
    }

    assert!(tasks.is_empty().await);
}

#[actix_web::test]
async fn test_malformed_json_is_bad_request() {
    let (state, tasks) = test_state();
    let app = init_app!(state);
    let token = register!(app, "alice@example.com");

    let req = test::TestRequest::post()
        .uri("/v1/tasks")
        .insert_header(bearer(&token))
        .insert_header(header::ContentType::json())
        .set_payload("{\"title\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Bad Request");
    assert!(tasks.is_empty().await);
}

#[actix_web::test]
async fn test_oversized_body_is_refused() {
    let (state, tasks) = test_state();
    let app = init_app!(state);
    let token = register!(app, "alice@example.com");

    let req = test::TestRequest::post()
        .uri("/v1/tasks")
        .insert_header(bearer(&token))
        .set_json(json!({
            "title": "x".repeat(MAX_BUFFERED_BODY),
            "deadline": "2099-01-01T00:00:00Z"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Payload Too Large");
    assert!(tasks.is_empty().await);

    // Refused before authentication as well
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .insert_header(header::ContentType::json())
        .set_payload(vec![b' '; MAX_BUFFERED_BODY + 1])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
