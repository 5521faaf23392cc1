//! Per-client-address rate limiting.
//!
//! Fixed-window counter: each client address gets `max_requests` per
//! `window_secs` window; a request over the bound is rejected immediately
//! with 429 rather than queued. Stale windows are pruned opportunistically
//! once the table grows large.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::config::RateLimitConfig;

/// Prune the window table once it holds this many clients.
const PRUNE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window request counter keyed by client address.
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Mutex<HashMap<IpAddr, Window>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record one request from `addr`. Returns whether it is within bounds.
    pub fn check(&self, addr: IpAddr) -> bool {
        self.check_at(addr, Instant::now())
    }

    fn window_len(&self) -> Duration {
        Duration::from_secs(self.config.window_secs)
    }

    fn check_at(&self, addr: IpAddr, now: Instant) -> bool {
        let window_len = self.window_len();
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());

        if windows.len() >= PRUNE_THRESHOLD {
            windows.retain(|_, w| now.duration_since(w.started) < window_len);
        }

        let window = windows.entry(addr).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= window_len {
            window.started = now;
            window.count = 0;
        }

        window.count += 1;
        window.count <= self.config.max_requests
    }
}
