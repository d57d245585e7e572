use std::sync::Arc;

use auction_backend::{app::build_app, clock::ManualClock, state::AppState};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

const T0: i64 = 1_700_000_000_000;

fn test_app() -> (Router, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(T0));
    let app = build_app(AppState::fake_at(clock.clone()));
    (app, clock)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let res = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn send_json(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, text) = send(app, method, uri, body).await;
    let value = serde_json::from_str(&text).unwrap_or(Value::Null);
    (status, value)
}

fn register_body(username: &str, email: &str) -> Value {
    json!({
        "username": username,
        "email": email,
        "password": "hunter2",
        "walletAddress": "0xabc"
    })
}

#[tokio::test]
async fn register_then_login_by_username_and_email() {
    let (app, _) = test_app();

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/users/register",
        Some(register_body("alice", "alice@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["username"], "alice");
    // Opaque profile fields come back; the password never does.
    assert_eq!(body["user"]["walletAddress"], "0xabc");
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("passwordHash").is_none());

    for identifier in ["alice", "alice@example.com"] {
        let (status, body) = send_json(
            &app,
            Method::POST,
            "/api/users/login",
            Some(json!({"username": identifier, "password": "hunter2"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true, "login with {identifier}");
        assert_eq!(body["message"], "Login successful");
    }

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/users/login",
        Some(json!({"username": "alice", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid credentials");
    assert!(body["user"].is_null());
}

#[tokio::test]
async fn mixed_case_email_round_trips_through_register_and_login() {
    let (app, _) = test_app();

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/users/register",
        Some(register_body("alice", "Alice@Example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    // Logging in with the email exactly as typed at registration must work.
    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/users/login",
        Some(json!({"username": "Alice@Example.com", "password": "hunter2"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["username"], "alice");
}

#[tokio::test]
async fn duplicate_username_registration_fails_in_the_envelope() {
    let (app, _) = test_app();

    send_json(
        &app,
        Method::POST,
        "/api/users/register",
        Some(register_body("alice", "alice@example.com")),
    )
    .await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/users/register",
        Some(register_body("alice", "other@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("already exists"));
    assert!(body["user"].is_null());
}

#[tokio::test]
async fn register_rejects_malformed_email_in_the_envelope() {
    let (app, _) = test_app();

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/users/register",
        Some(register_body("alice", "not-an-email")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid email");
}

#[tokio::test]
async fn unknown_user_is_a_404() {
    let (app, _) = test_app();
    let (status, _) = send(
        &app,
        Method::GET,
        "/api/users/00000000-0000-0000-0000-000000000000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn auction_create_bid_and_end_flow() {
    let (app, _) = test_app();

    let (status, auction) = send_json(
        &app,
        Method::POST,
        "/api/auctions",
        Some(json!({
            "title": "antique vase",
            "sellerAddress": "0xseller",
            "startingPrice": 100,
            "duration": 60
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(auction["status"], "active");
    assert_eq!(auction["currentBid"], 100);
    assert_eq!(auction["bidCount"], 0);
    assert_eq!(auction["category"], "Other");
    assert_eq!(auction["createdAt"], T0);
    let id = auction["id"].as_str().unwrap().to_string();

    let (status, listed) = send_json(&app, Method::GET, "/api/auctions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, text) = send(
        &app,
        Method::POST,
        &format!("/api/auctions/{id}/bid?bidAmount=250"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, format!("Bid of 250 placed on auction {id}"));

    let (_, fetched) = send_json(&app, Method::GET, &format!("/api/auctions/{id}"), None).await;
    assert_eq!(fetched["currentBid"], 250);
    assert_eq!(fetched["bidCount"], 1);

    let (status, text) = send(
        &app,
        Method::POST,
        &format!("/api/auctions/{id}/end"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, format!("Auction {id} ended."));

    let (_, fetched) = send_json(&app, Method::GET, &format!("/api/auctions/{id}"), None).await;
    assert_eq!(fetched["status"], "ended");
}

#[tokio::test]
async fn bid_on_missing_auction_still_confirms() {
    let (app, _) = test_app();
    let id = "11111111-1111-1111-1111-111111111111";

    let (status, text) = send(
        &app,
        Method::POST,
        &format!("/api/auctions/{id}/bid?bidAmount=50"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, format!("Bid of 50 placed on auction {id}"));

    // Nothing was created as a side effect.
    let (_, listed) = send_json(&app, Method::GET, "/api/auctions", None).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn expired_auction_flips_to_ended_on_list() {
    let (app, clock) = test_app();

    let (_, auction) = send_json(
        &app,
        Method::POST,
        "/api/auctions",
        Some(json!({"title": "vase", "startingPrice": 100, "duration": 60})),
    )
    .await;
    let id = auction["id"].as_str().unwrap().to_string();

    clock.advance(61_000);

    let (_, listed) = send_json(&app, Method::GET, "/api/auctions", None).await;
    assert_eq!(listed[0]["status"], "ended");

    // The flip is persisted, so the single-auction read agrees.
    let (_, fetched) = send_json(&app, Method::GET, &format!("/api/auctions/{id}"), None).await;
    assert_eq!(fetched["status"], "ended");
}

#[tokio::test]
async fn huge_duration_auction_lists_without_expiring() {
    let (app, clock) = test_app();

    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/auctions",
        Some(json!({"title": "vase", "startingPrice": 100, "duration": i64::MAX})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    clock.advance(61_000);
    let (status, listed) = send_json(&app, Method::GET, "/api/auctions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed[0]["status"], "active");
}

#[tokio::test]
async fn invalid_create_inputs_are_a_400() {
    let (app, _) = test_app();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auctions",
        Some(json!({"title": "vase", "startingPrice": -1, "duration": 60})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auctions",
        Some(json!({"title": "vase", "startingPrice": 100, "duration": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_auction_is_a_404() {
    let (app, _) = test_app();
    let (status, _) = send(
        &app,
        Method::GET,
        "/api/auctions/00000000-0000-0000-0000-000000000000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_endpoint_answers() {
    let (app, _) = test_app();
    let (status, text) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "ok");
}
