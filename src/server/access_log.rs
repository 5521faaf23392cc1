//! Access logging: one line per request, appended to `logs/access.log`.
//!
//! The log directory is created at startup if absent. Lines follow the
//! Common Log Format with a trailing latency column:
//!
//! ```text
//! 203.0.113.7 - - [06/Aug/2026:14:02:11 +0000] "POST /translate HTTP/1.1" 200 12ms
//! ```

use std::net::SocketAddr;
use std::path::Path;
use std::time::Instant;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

/// Shared append-only handle to the access log file.
pub struct AccessLog {
    file: Mutex<tokio::fs::File>,
}

impl AccessLog {
    /// Create the log directory if needed and open `access.log` for append.
    pub async fn open(dir: &Path) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(dir).await?;
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("access.log"))
            .await?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    async fn append(&self, line: String) {
        let mut file = self.file.lock().await;
        if let Err(e) = file.write_all(line.as_bytes()).await {
            warn!("access log write failed: {e}");
        }
        if let Err(e) = file.flush().await {
            warn!("access log flush failed: {e}");
        }
    }
}

/// Middleware recording every request, whatever its outcome.
pub async fn log_request(
    State(log): State<std::sync::Arc<AccessLog>>,
    request: Request,
    next: Next,
) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "-".to_string());
    let method = request.method().clone();
    let uri = request.uri().clone();
    let version = format!("{:?}", request.version());
    let started = Instant::now();

    let response = next.run(request).await;

    let timestamp = chrono::Local::now().format("%d/%b/%Y:%H:%M:%S %z");
    let line = format!(
        "{client} - - [{timestamp}] \"{method} {uri} {version}\" {} {}ms\n",
        response.status().as_u16(),
        started.elapsed().as_millis(),
    );
    log.append(line).await;

    response
}
