//! Runtime configuration for prompt-relay.
//!
//! Configuration can be loaded from a JSON file or constructed programmatically.
//! Environment variables override the file for deployment-sensitive values:
//! `PORT` for the listen port, `OPENAI_API_KEY` / `OPENAI_BASE_URL` for the
//! generation provider.

use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

/// Command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "prompt-relay", about = "Declarative text-generation HTTP gateway")]
pub struct Cli {
    /// Path to configuration file (JSON).
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// HTTP listen address (overrides config and PORT).
    #[arg(long)]
    pub listen: Option<String>,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,

    /// Generation provider configuration.
    pub provider: ProviderConfig,

    /// Rate limiting.
    pub rate_limit: RateLimitConfig,

    /// Access logging.
    pub log: LogConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind (e.g. "0.0.0.0").
    pub host: String,

    /// Listen port. `PORT` in the environment takes precedence.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Generation provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,

    /// API key. `OPENAI_API_KEY` in the environment takes precedence;
    /// usually left empty in the file.
    pub api_key: String,

    /// Model identifier passed to the provider.
    pub model: String,

    /// Sampling temperature.
    pub temperature: f64,

    /// Timeout for a non-streaming generation call, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-3.5-turbo-instruct".to_string(),
            temperature: 0.0,
            request_timeout_secs: 300,
        }
    }
}

/// Per-client rate limiting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Window length in seconds.
    pub window_secs: u64,

    /// Maximum requests per client address per window.
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: 15 * 60,
            max_requests: 100,
        }
    }
}

/// Access logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Directory holding the access log, created at startup if absent.
    pub dir: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file, falling back to defaults for missing fields.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let data = std::fs::read_to_string(path)?;
            serde_json::from_str::<Config>(&data)?
        } else {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            Config::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env(&mut self) {
        if let Ok(port) = std::env::var("PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring unparseable PORT value {port:?}"),
            }
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.provider.api_key = key;
        }
        if let Ok(url) = std::env::var("OPENAI_BASE_URL") {
            self.provider.base_url = url;
        }
    }

    /// The socket address to bind, as "host:port".
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.rate_limit.max_requests, 100);
        assert_eq!(cfg.rate_limit.window_secs, 900);
        assert_eq!(cfg.provider.temperature, 0.0);
    }

    #[test]
    fn test_listen_addr() {
        let cfg = Config::default();
        assert_eq!(cfg.listen_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let cfg: Config = serde_json::from_str(r#"{"server": {"host": "127.0.0.1", "port": 8080}}"#)
            .expect("partial config should parse");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.rate_limit.max_requests, 100);
    }
}
