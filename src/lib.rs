//! prompt-relay: declarative text-generation HTTP gateway.
//!
//! Exposes a registry of named text-generation operations (translation,
//! chat translation, streamed poem generation) as HTTP endpoints. Routes,
//! request validation, and OpenAPI documentation are all derived from the
//! same declarative operation list, and token-streamed output is relayed
//! to clients as newline-delimited JSON.

pub mod config;
pub mod error;
pub mod prompt;
pub mod provider;
pub mod registry;
pub mod server;
