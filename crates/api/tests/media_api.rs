//! Integration tests for `/api/upload`, `/api/tts` and `/api/script`.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_bytes, body_json, body_text, post_json, FakeBlob, FakeSpeech, Providers};
use serde_json::json;
use tower::ServiceExt;

fn app_with_blob(blob: &Arc<FakeBlob>) -> axum::Router {
    common::build_test_app(Providers {
        blob: Some(Arc::clone(blob)),
        ..Providers::default()
    })
}

fn app_with_speech(speech: &Arc<FakeSpeech>) -> axum::Router {
    common::build_test_app(Providers {
        speech: Some(Arc::clone(speech)),
        ..Providers::default()
    })
}

fn raw_post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(body.into())
        .unwrap()
}

// ---------------------------------------------------------------------------
// Test: POST /api/upload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_stores_raw_body_under_given_name() {
    let blob = Arc::new(FakeBlob::default());

    let response = app_with_blob(&blob)
        .oneshot(raw_post(
            "/api/upload?filename=seed.png&contentType=image/png",
            vec![0x89u8, b'P', b'N', b'G'],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"url": "https://blob.test/seed.png"})
    );

    let uploads = blob.uploads.lock().unwrap();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].0, "seed.png");
    assert_eq!(uploads[0].1, "image/png");
    assert_eq!(&uploads[0].2[..], &[0x89u8, b'P', b'N', b'G'][..]);
}

#[tokio::test]
async fn upload_defaults_filename_and_content_type() {
    let blob = Arc::new(FakeBlob::default());

    let response = app_with_blob(&blob)
        .oneshot(raw_post("/api/upload", "hello"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let uploads = blob.uploads.lock().unwrap();
    assert!(uploads[0].0.starts_with("upload-"), "got {}", uploads[0].0);
    assert_eq!(uploads[0].1, "application/octet-stream");
}

#[tokio::test]
async fn upload_over_body_limit_returns_413() {
    let blob = Arc::new(FakeBlob::default());

    let response = app_with_blob(&blob)
        .oneshot(raw_post("/api/upload?filename=big.bin", vec![0u8; 4096]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(blob.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn upload_without_token_returns_500_naming_variable() {
    let response = common::build_unconfigured_app()
        .oneshot(raw_post("/api/upload", "hello"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await["error"],
        "Missing BLOB_READ_WRITE_TOKEN"
    );
}

// ---------------------------------------------------------------------------
// Test: POST /api/tts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn tts_returns_mp3_bytes() {
    let speech = Arc::new(FakeSpeech::default());

    let response = post_json(
        app_with_speech(&speech),
        "/api/tts",
        json!({"text": "Made for runners.", "voice": "nova"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "audio/mpeg");
    assert_eq!(&body_bytes(response).await[..], common::FAKE_AUDIO);

    let requests = speech.requests.lock().unwrap();
    assert_eq!(
        requests[0],
        ("Made for runners.".to_string(), "nova".to_string())
    );
}

#[tokio::test]
async fn tts_defaults_voice() {
    let speech = Arc::new(FakeSpeech::default());

    post_json(app_with_speech(&speech), "/api/tts", json!({"text": "hi"})).await;

    assert_eq!(speech.requests.lock().unwrap()[0].1, "alloy");
}

#[tokio::test]
async fn tts_without_text_returns_400() {
    let speech = Arc::new(FakeSpeech::default());

    let response = post_json(app_with_speech(&speech), "/api/tts", json!({"text": "  "})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Missing text");
    assert!(speech.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn tts_upstream_rejection_is_relayed() {
    let speech = Arc::new(FakeSpeech {
        reject: Some((429, "rate limited".to_string())),
        ..FakeSpeech::default()
    });

    let response = post_json(app_with_speech(&speech), "/api/tts", json!({"text": "hi"})).await;

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body_text(response).await, "rate limited");
}

// ---------------------------------------------------------------------------
// Test: POST /api/script
// ---------------------------------------------------------------------------

#[tokio::test]
async fn script_is_built_from_brief() {
    let response = post_json(
        common::build_unconfigured_app(),
        "/api/script",
        json!({
            "product": "Trail shoes that grip.",
            "audience": "weekend hikers",
            "goal": "Book a fitting.",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["script"],
        "Trail shoes that grip.\nMade for weekend hikers.\nBook a fitting.\nShop now!"
    );
}

#[tokio::test]
async fn script_with_empty_body_uses_defaults() {
    let response = common::send(
        common::build_unconfigured_app(),
        Method::POST,
        "/api/script",
        Body::empty(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["script"],
        "Amazing product for your day.\nShop now!"
    );
}
