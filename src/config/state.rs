// Application state module
// Everything a request handler may touch, built once by the composition root

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::types::Config;
use crate::http::rate_limit::ApiRateLimiter;
use crate::relay::Mailer;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Outgoing mail transport, injected so tests can substitute a recorder
    pub mailer: Arc<dyn Mailer>,
    /// Per-caller quota for `/api/*`
    pub limiter: ApiRateLimiter,
    started_at: Instant,
}

impl AppState {
    pub fn new(config: &Config, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            config: config.clone(),
            mailer,
            limiter: ApiRateLimiter::new(&config.rate_limit),
            started_at: Instant::now(),
        }
    }

    /// Time since the state was built, i.e. process uptime
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
