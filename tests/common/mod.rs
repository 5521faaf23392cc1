//! Shared test fixtures: a scripted generator and router construction.
//!
//! Compiled into each integration test crate; not every crate uses every
//! helper.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use tokio::sync::mpsc;

use prompt_relay::config::RateLimitConfig;
use prompt_relay::error::GenerationError;
use prompt_relay::provider::{GenerationEvent, TextGenerator, STREAM_CHANNEL_CAPACITY};
use prompt_relay::registry::Registry;
use prompt_relay::server::access_log::AccessLog;
use prompt_relay::server::limit::RateLimiter;
use prompt_relay::server::routes::{app_state, build_router};

/// Generator with scripted replies; counts invocations so tests can assert
/// the execution path was (or was not) reached.
pub struct ScriptedGenerator {
    pub reply: String,
    pub events: Vec<GenerationEvent>,
    pub fail_with: Option<String>,
    pub calls: AtomicUsize,
    /// Events actually delivered to a consumer, across all streams.
    pub delivered: Arc<AtomicUsize>,
}

impl Default for ScriptedGenerator {
    fn default() -> Self {
        Self {
            reply: "generated text".to_string(),
            events: vec![GenerationEvent::Done],
            fail_with: None,
            calls: AtomicUsize::new(0),
            delivered: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl ScriptedGenerator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::SeqCst)
    }

    fn answer(&self) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(message) => Err(GenerationError::Provider {
                status: 502,
                message: message.clone(),
            }),
            None => Ok(self.reply.clone()),
        }
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(&self, _prompt: &str) -> Result<String, GenerationError> {
        self.answer()
    }

    async fn complete_chat(&self, _system: &str, _user: &str) -> Result<String, GenerationError> {
        self.answer()
    }

    fn stream(&self, _prompt: &str) -> mpsc::Receiver<GenerationEvent> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        let events = self.events.clone();
        let delivered = self.delivered.clone();
        tokio::spawn(async move {
            for event in events {
                if tx.send(event).await.is_err() {
                    return;
                }
                delivered.fetch_add(1, Ordering::SeqCst);
            }
        });
        rx
    }
}

/// Build a test router around `generator` with the given rate limit.
pub async fn test_app(
    generator: Arc<ScriptedGenerator>,
    rate_limit: RateLimitConfig,
) -> (Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let access_log = AccessLog::open(&dir.path().join("logs")).await.unwrap();
    let state = app_state(
        Registry::builtin(),
        generator,
        RateLimiter::new(rate_limit),
        access_log,
    );
    (build_router(state), dir)
}

/// A rate limit high enough to never interfere.
pub fn no_rate_limit() -> RateLimitConfig {
    RateLimitConfig {
        window_secs: 900,
        max_requests: u32::MAX,
    }
}
