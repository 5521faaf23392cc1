//! reqwest-based [`TextGenerator`] against an OpenAI-compatible API.
//!
//! Non-streaming calls go through `/completions` and `/chat/completions`
//! and are bounded by the configured request timeout. Streaming calls set
//! `stream: true` and decode the provider's SSE frames (`data: {...}` lines,
//! `[DONE]` sentinel) into [`GenerationEvent`]s pushed through a channel.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::ProviderConfig;
use crate::error::GenerationError;
use crate::provider::{GenerationEvent, TextGenerator, STREAM_CHANNEL_CAPACITY};

/// Client for an OpenAI-compatible generation API.
pub struct OpenAiClient {
    http: reqwest::Client,
    config: ProviderConfig,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    temperature: f64,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl OpenAiClient {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Issue a POST and fail on non-success status with the body as message.
    async fn post(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<reqwest::Response, GenerationError> {
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationError::Provider {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn with_timeout<T>(
        &self,
        fut: impl std::future::Future<Output = Result<T, GenerationError>>,
    ) -> Result<T, GenerationError> {
        let secs = self.config.request_timeout_secs;
        tokio::time::timeout(Duration::from_secs(secs), fut)
            .await
            .map_err(|_| GenerationError::Timeout(secs))?
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = CompletionRequest {
            model: &self.config.model,
            prompt,
            temperature: self.config.temperature,
            stream: false,
        };

        self.with_timeout(async {
            let response = self.post("/completions", &request).await?;
            let body: CompletionResponse = response.json().await?;
            body.choices
                .into_iter()
                .next()
                .map(|choice| choice.text)
                .ok_or_else(|| GenerationError::Malformed("response carried no choices".to_string()))
        })
        .await
    }

    async fn complete_chat(&self, system: &str, user: &str) -> Result<String, GenerationError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature: self.config.temperature,
        };

        self.with_timeout(async {
            let response = self.post("/chat/completions", &request).await?;
            let body: ChatResponse = response.json().await?;
            body.choices
                .into_iter()
                .next()
                .map(|choice| choice.message.content)
                .ok_or_else(|| GenerationError::Malformed("response carried no choices".to_string()))
        })
        .await
    }

    fn stream(&self, prompt: &str) -> mpsc::Receiver<GenerationEvent> {
        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);

        let http = self.http.clone();
        let config = self.config.clone();
        let url = self.url("/completions");
        let body = serde_json::json!({
            "model": config.model,
            "prompt": prompt,
            "temperature": config.temperature,
            "stream": true,
        });

        tokio::spawn(async move {
            let response = match http
                .post(&url)
                .bearer_auth(&config.api_key)
                .json(&body)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    let _ = tx.send(GenerationEvent::Error(e.to_string())).await;
                    return;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                let _ = tx
                    .send(GenerationEvent::Error(format!(
                        "provider returned {status}: {message}"
                    )))
                    .await;
                return;
            }

            let mut bytes = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        let _ = tx.send(GenerationEvent::Error(e.to_string())).await;
                        return;
                    }
                };
                buffer.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(pos) = buffer.find('\n') {
                    let line = buffer[..pos].trim().to_string();
                    buffer.drain(..pos + 1);

                    let Some(payload) = line.strip_prefix("data:") else {
                        continue;
                    };
                    let payload = payload.trim();

                    if payload == "[DONE]" {
                        let _ = tx.send(GenerationEvent::Done).await;
                        return;
                    }

                    match serde_json::from_str::<CompletionResponse>(payload) {
                        Ok(parsed) => {
                            let Some(choice) = parsed.choices.into_iter().next() else {
                                continue;
                            };
                            if choice.text.is_empty() {
                                continue;
                            }
                            if tx
                                .send(GenerationEvent::Token { text: choice.text })
                                .await
                                .is_err()
                            {
                                // Receiver dropped (client disconnect);
                                // dropping `bytes` aborts the upstream call.
                                debug!("stream consumer gone, aborting generation");
                                return;
                            }
                        }
                        Err(e) => {
                            warn!("skipping undecodable stream frame: {e}");
                        }
                    }
                }
            }

            // Provider closed the connection without a [DONE] frame.
            let _ = tx.send(GenerationEvent::Done).await;
        });

        rx
    }
}
