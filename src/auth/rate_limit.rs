use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Sliding-window limit applied to one protected route.
#[derive(Debug, Clone)]
pub struct ThrottleConfig {
    pub max_requests: u32,
    pub window_seconds: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window_seconds: 3600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThrottleDecision {
    Allowed,
    Denied { retry_after: u64 },
}

#[derive(Debug)]
struct RequestWindow {
    timestamps: Vec<DateTime<Utc>>,
}

impl RequestWindow {
    fn new() -> Self {
        Self {
            timestamps: Vec::new(),
        }
    }

    fn prune(&mut self, window: Duration) {
        let cutoff = Utc::now() - window;
        self.timestamps.retain(|ts| *ts > cutoff);
    }

    fn record(&mut self) {
        self.timestamps.push(Utc::now());
    }

    fn request_count(&self) -> usize {
        self.timestamps.len()
    }
}

/// Per-client sliding-window throttle. State is process-local and
/// in-memory; it is lost on restart and not shared across instances.
pub struct RateLimiter {
    windows: RwLock<HashMap<String, RequestWindow>>,
    config: ThrottleConfig,
}

impl RateLimiter {
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            windows: RwLock::new(HashMap::new()),
            config,
        }
    }

    fn window(&self) -> Duration {
        Duration::seconds(self.config.window_seconds as i64)
    }

    /// Prunes entries older than the window, then either records the
    /// request or denies it. The whole check-then-record runs under the
    /// map's write lock, so a concurrent burst for one key admits exactly
    /// `max_requests`.
    ///
    /// `retry_after` on denial is always the full window length, not the
    /// time until the oldest recorded request ages out.
    pub async fn check_and_record(&self, client_key: &str) -> ThrottleDecision {
        let mut windows = self.windows.write().await;

        let window = windows
            .entry(client_key.to_string())
            .or_insert_with(RequestWindow::new);
        window.prune(self.window());

        if window.request_count() >= self.config.max_requests as usize {
            return ThrottleDecision::Denied {
                retry_after: self.config.window_seconds,
            };
        }

        window.record();
        ThrottleDecision::Allowed
    }

    /// Drops client records with no requests left in the window.
    pub async fn cleanup(&self) {
        let mut windows = self.windows.write().await;
        let window = self.window();

        windows.retain(|_, record| {
            record.prune(window);
            !record.timestamps.is_empty()
        });
    }
}
