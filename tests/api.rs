use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use star_ledger::clock::FixedClock;
use star_ledger::crypto::generate_keypair;
use star_ledger::{router, AppState};
use tower::ServiceExt;

const T: i64 = 1_700_000_000;

fn app() -> (Router, Arc<FixedClock>) {
    let clock = FixedClock::new(T);
    (router(AppState::with_clock(clock.clone())), clock)
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let req = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(v) => req
            .header("content-type", "application/json")
            .body(Body::from(v.to_string())),
        None => req.body(Body::empty()),
    }
    .unwrap();

    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn health_and_genesis_are_served() {
    let (app, _) = app();

    let (status, body) = call(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["height"], 0);

    let (status, body) = call(&app, "GET", "/version", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "star-ledger-node");

    let (status, body) = call(&app, "GET", "/block/height/0", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["height"], 0);
    assert!(body["previous_fingerprint"].is_null());

    let (status, body) = call(&app, "GET", "/block/height/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn star_registration_round_trip() {
    let (app, _) = app();
    let wallet = generate_keypair();
    let address = wallet.address();

    let (status, challenge) = call(
        &app,
        "POST",
        "/requestValidation",
        Some(json!({ "address": address })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let message = challenge.as_str().unwrap().to_string();
    assert_eq!(message, format!("{address}:{T}:starRegistry"));

    let star = json!({"ra": "13h 03m 33.35sec", "dec": "-49° 31' 38.1\"", "story": "Found it"});
    let (status, block) = call(
        &app,
        "POST",
        "/submitstar",
        Some(json!({
            "address": address,
            "message": message,
            "signature": wallet.sign(&message),
            "star": star,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(block["height"], 1);
    let fingerprint = block["fingerprint"].as_str().unwrap().to_string();

    let (status, by_hash) = call(&app, "GET", &format!("/block/hash/{fingerprint}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_hash, block);

    let (status, stars) = call(&app, "GET", &format!("/blocks/{address}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stars, json!([{ "owner": address, "star": star }]));

    let (status, report) = call(&app, "GET", "/validate", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report, json!({ "ok": true, "height": 1, "faulty": [] }));
}

#[tokio::test]
async fn rejected_submissions_map_to_status_codes() {
    let (app, clock) = app();
    let wallet = generate_keypair();
    let address = wallet.address();
    let message = format!("{address}:{T}:starRegistry");

    let submit = |message: String, signature: String| {
        json!({
            "address": address,
            "message": message,
            "signature": signature,
            "star": "x",
        })
    };

    let (status, body) = call(
        &app,
        "POST",
        "/submitstar",
        Some(submit(message.clone(), generate_keypair().sign(&message))),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "BAD_SIGNATURE");

    let (status, body) = call(
        &app,
        "POST",
        "/submitstar",
        Some(submit("garbage".into(), wallet.sign("garbage"))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "MALFORMED_CHALLENGE");

    let (status, body) = call(
        &app,
        "POST",
        "/submitstar",
        Some(submit(
            format!("{address}:{}:starRegistry", i64::MIN),
            wallet.sign(&format!("{address}:{}:starRegistry", i64::MIN)),
        )),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "MALFORMED_CHALLENGE");

    clock.advance(301);
    let (status, body) = call(
        &app,
        "POST",
        "/submitstar",
        Some(submit(message.clone(), wallet.sign(&message))),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "CHALLENGE_EXPIRED");

    let (_, report) = call(&app, "GET", "/validate", None).await;
    assert_eq!(report["height"], 0);
}

#[tokio::test]
async fn unknown_owner_and_blank_address() {
    let (app, _) = app();

    let (status, _) = call(&app, "GET", "/blocks/deadbeef", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(
        &app,
        "POST",
        "/requestValidation",
        Some(json!({ "address": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");
}
