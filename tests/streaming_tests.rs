//! Integration tests for the streaming path: NDJSON framing, ordering,
//! termination, and mid-stream failure behavior through the full router.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{no_rate_limit, test_app, ScriptedGenerator};
use prompt_relay::provider::GenerationEvent;

fn poem_request() -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/poem")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "Topic": "rain" }).to_string()))
        .unwrap()
}

fn token(text: &str) -> GenerationEvent {
    GenerationEvent::Token {
        text: text.to_string(),
    }
}

#[tokio::test]
async fn test_poem_streams_ordered_ndjson() {
    let generator = Arc::new(ScriptedGenerator {
        events: vec![
            token("Rain "),
            token("on "),
            token("glass"),
            GenerationEvent::Done,
        ],
        ..ScriptedGenerator::default()
    });
    let (app, _dir) = test_app(generator, no_rate_limit()).await;

    let response = app.oneshot(poem_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/ndjson"
    );
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(body.ends_with('\n'));

    let chunks: Vec<String> = body
        .lines()
        .map(|line| {
            let value: Value = serde_json::from_str(line).expect("each line is JSON");
            value["text"].as_str().expect("each line has text").to_string()
        })
        .collect();
    assert_eq!(chunks, vec!["Rain ", "on ", "glass"]);
}

#[tokio::test]
async fn test_poem_missing_topic_is_rejected_before_streaming() {
    let generator = Arc::new(ScriptedGenerator::default());
    let (app, _dir) = test_app(generator.clone(), no_rate_limit()).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/poem")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_midstream_failure_ends_with_error_line() {
    let generator = Arc::new(ScriptedGenerator {
        events: vec![
            token("half a poem"),
            GenerationEvent::Error("provider hung up".to_string()),
        ],
        ..ScriptedGenerator::default()
    });
    let (app, _dir) = test_app(generator, no_rate_limit()).await;

    let response = app.oneshot(poem_request()).await.unwrap();

    // Headers were already committed as a success; the failure is framed
    // as the final body line instead.
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 2);

    let last: Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(last["error"], "provider hung up");
}

#[tokio::test]
async fn test_disconnect_cancels_producer() {
    use prompt_relay::provider::TextGenerator;

    // A generator that would emit far more tokens than the channel holds.
    let generator = ScriptedGenerator {
        events: (0..1000).map(|i| token(&format!("t{i} "))).collect(),
        ..ScriptedGenerator::default()
    };

    let rx = generator.stream("a poem");
    let response = prompt_relay::server::streaming::ndjson_response(rx);

    // Client disconnect: hyper drops the body, which drops the receiver.
    drop(response);

    // Give the producer task a chance to observe the closed channel.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    // The producer stops at its first failed send; it must not have
    // drained anywhere near all 1000 events.
    assert!(
        generator.delivered() < 100,
        "producer kept generating after disconnect: {}",
        generator.delivered()
    );
}
