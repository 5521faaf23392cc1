//! Execution adapter: bridges registry operations to the generation provider.
//!
//! - [`TextGenerator`]: the single seam to the external provider. The real
//!   implementation lives in [`openai`]; tests substitute their own.
//! - [`execute`]: renders an operation's prompt against the request's input
//!   bundle and invokes the matching generator capability.
//! - [`GenerationEvent`]: the channel protocol between a streaming producer
//!   task and the response bridge.

pub mod openai;

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::GenerationError;
use crate::registry::{Execution, Operation};

/// Validated, per-request mapping of declared input names to values.
pub type InputBundle = BTreeMap<String, String>;

/// Channel capacity between a streaming producer and its consumer.
pub const STREAM_CHANNEL_CAPACITY: usize = 32;

/// A generated token event.
#[derive(Debug, Clone)]
pub enum GenerationEvent {
    /// A new chunk of generated text.
    Token { text: String },
    /// Generation is complete.
    Done,
    /// Generation failed after the stream was opened.
    Error(String),
}

/// Outcome of one operation invocation. Exactly one variant per call.
pub enum ExecutionResult {
    /// The complete generated text.
    Text(String),
    /// A live, single-consumer token stream.
    Stream(mpsc::Receiver<GenerationEvent>),
}

/// The call-and-optionally-stream capability of the generation provider.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// One-shot completion of `prompt`.
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError>;

    /// One-shot chat call with a system and a user message.
    async fn complete_chat(&self, system: &str, user: &str) -> Result<String, GenerationError>;

    /// Start a streaming completion of `prompt`.
    ///
    /// The receiver is handed back immediately; a spawned task performs the
    /// outbound call and pushes [`GenerationEvent`]s as tokens arrive, then
    /// closes the channel. Dropping the receiver stops the producer on its
    /// next send.
    fn stream(&self, prompt: &str) -> mpsc::Receiver<GenerationEvent>;
}

/// Run `operation` against `generator` with the request's input bundle.
pub async fn execute(
    operation: &Operation,
    input: &InputBundle,
    generator: &dyn TextGenerator,
) -> Result<ExecutionResult, GenerationError> {
    match &operation.execution {
        Execution::Completion { template } => {
            let prompt = template.render(input)?;
            let text = generator.complete(&prompt).await?;
            Ok(ExecutionResult::Text(text))
        }
        Execution::Chat { system, user } => {
            let system = system.render(input)?;
            let user = user.render(input)?;
            let text = generator.complete_chat(&system, &user).await?;
            Ok(ExecutionResult::Text(text))
        }
        Execution::StreamingCompletion { template } => {
            let prompt = template.render(input)?;
            Ok(ExecutionResult::Stream(generator.stream(&prompt)))
        }
    }
}
