//! HTTP server: router, streaming bridge, and request plumbing.
//!
//! - [`routes`]: per-operation routes, validation, dispatch
//! - [`streaming`]: NDJSON bridge for token-streamed responses
//! - [`openapi`]: OpenAPI document synthesis from the registry
//! - [`pages`]: landing page listing the operations
//! - [`limit`]: per-client rate limiting
//! - [`access_log`]: per-request access log file
//! - [`validate`]: declared-field validation and sanitization

pub mod access_log;
pub mod limit;
pub mod openapi;
pub mod pages;
pub mod routes;
pub mod streaming;
pub mod validate;
