//! Streaming bridge: relays a token channel to an HTTP response as
//! newline-delimited JSON.
//!
//! Each [`GenerationEvent::Token`] becomes one `{"text": ...}` line, written
//! in arrival order with no batching. A mid-stream failure is framed as a
//! terminal `{"error": ...}` line. Client disconnect drops the body stream
//! and with it the channel receiver, so the producer's next send fails and
//! generation stops.

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::Response;
use bytes::Bytes;
use std::convert::Infallible;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use crate::provider::GenerationEvent;

/// Serialize one event into its NDJSON line, if it produces one.
fn event_line(event: GenerationEvent) -> Option<String> {
    let value = match event {
        GenerationEvent::Token { text } => serde_json::json!({ "text": text }),
        GenerationEvent::Error(message) => serde_json::json!({ "error": message }),
        // Completion closes the body; no trailing marker.
        GenerationEvent::Done => return None,
    };
    // Serializing a two-field object of strings cannot fail.
    serde_json::to_string(&value).ok().map(|mut line| {
        line.push('\n');
        line
    })
}

/// Wrap a token channel in a chunked NDJSON response.
pub fn ndjson_response(rx: mpsc::Receiver<GenerationEvent>) -> Response {
    let lines = ReceiverStream::new(rx)
        .filter_map(event_line)
        .map(|line| Ok::<_, Infallible>(Bytes::from(line)));

    // The builder only fails on malformed parts; all parts here are fixed.
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/ndjson")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .body(Body::from_stream(lines))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}
