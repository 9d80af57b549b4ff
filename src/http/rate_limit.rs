//! Per-caller request quota for the API
//!
//! Fixed windows per peer IP: a caller's first request opens a window of
//! `window_ms`, at most `max` requests are accepted inside it, and the count
//! starts over once the window has elapsed.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::HeaderValue;
use hyper::Response;

use crate::config::RateLimitConfig;

/// Outcome of charging one request against a caller's quota
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { limit: u32, remaining: u32, reset_secs: u64 },
    Limited { limit: u32, retry_after_secs: u64 },
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    hits: u32,
}

pub struct ApiRateLimiter {
    windows: Mutex<HashMap<IpAddr, Window>>,
    limit: u32,
    window: Duration,
}

impl ApiRateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            limit: config.max.max(1),
            window: Duration::from_millis(config.window_ms.max(1)),
        }
    }

    /// Charge one request to `caller`
    pub fn check(&self, caller: IpAddr) -> RateDecision {
        self.check_at(caller, Instant::now())
    }

    fn check_at(&self, caller: IpAddr, now: Instant) -> RateDecision {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = windows.entry(caller).or_insert(Window {
            started: now,
            hits: 0,
        });
        if now.saturating_duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                hits: 0,
            };
        }
        let until_reset = self
            .window
            .saturating_sub(now.saturating_duration_since(entry.started));

        if entry.hits >= self.limit {
            return RateDecision::Limited {
                limit: self.limit,
                retry_after_secs: ceil_secs(until_reset).max(1),
            };
        }
        entry.hits += 1;
        RateDecision::Allowed {
            limit: self.limit,
            remaining: self.limit - entry.hits,
            reset_secs: ceil_secs(until_reset),
        }
    }

    /// Forget callers whose window has already closed
    pub fn retain_recent(&self) {
        self.retain_at(Instant::now());
    }

    fn retain_at(&self, now: Instant) {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        windows.retain(|_, w| now.saturating_duration_since(w.started) < self.window);
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.windows.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl RateDecision {
    /// Add the standard `RateLimit-*` headers to a response
    pub fn apply_headers(self, response: &mut Response<Full<Bytes>>) {
        let (limit, remaining, reset) = match self {
            Self::Allowed {
                limit,
                remaining,
                reset_secs,
            } => (limit, remaining, reset_secs),
            Self::Limited {
                limit,
                retry_after_secs,
            } => (limit, 0, retry_after_secs),
        };
        let headers = response.headers_mut();
        headers.insert("RateLimit-Limit", HeaderValue::from(limit));
        headers.insert("RateLimit-Remaining", HeaderValue::from(remaining));
        headers.insert("RateLimit-Reset", HeaderValue::from(reset));
    }
}

fn ceil_secs(duration: Duration) -> u64 {
    let secs = duration.as_secs();
    if duration.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn limiter(max: u32) -> ApiRateLimiter {
        ApiRateLimiter::new(&RateLimitConfig {
            window_ms: 60_000,
            max,
        })
    }

    #[test]
    fn test_request_past_quota_is_limited() {
        let limiter = limiter(3);
        let caller = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        for expected_remaining in [2, 1, 0] {
            match limiter.check(caller) {
                RateDecision::Allowed { remaining, .. } => assert_eq!(remaining, expected_remaining),
                RateDecision::Limited { .. } => panic!("request within quota was limited"),
            }
        }
        match limiter.check(caller) {
            RateDecision::Limited {
                limit,
                retry_after_secs,
            } => {
                assert_eq!(limit, 3);
                assert!(retry_after_secs >= 1);
            }
            RateDecision::Allowed { .. } => panic!("fourth request should be limited"),
        }
    }

    #[test]
    fn test_callers_are_counted_separately() {
        let limiter = limiter(1);
        let a = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let b = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));
        assert!(matches!(limiter.check(a), RateDecision::Allowed { .. }));
        assert!(matches!(limiter.check(a), RateDecision::Limited { .. }));
        assert!(matches!(limiter.check(b), RateDecision::Allowed { .. }));
    }

    #[test]
    fn test_window_caps_requests_until_it_ends() {
        let limiter = ApiRateLimiter::new(&RateLimitConfig {
            window_ms: 2000,
            max: 2,
        });
        let caller = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 3));
        let start = Instant::now();

        assert!(matches!(limiter.check_at(caller, start), RateDecision::Allowed { .. }));
        assert!(matches!(limiter.check_at(caller, start), RateDecision::Allowed { .. }));
        assert!(matches!(limiter.check_at(caller, start), RateDecision::Limited { .. }));

        // Still inside the first window: nothing has been refunded
        let mid = start + Duration::from_millis(1100);
        assert_eq!(
            limiter.check_at(caller, mid),
            RateDecision::Limited {
                limit: 2,
                retry_after_secs: 1
            }
        );
        let late = start + Duration::from_millis(1999);
        assert!(matches!(limiter.check_at(caller, late), RateDecision::Limited { .. }));

        let next = start + Duration::from_millis(2000);
        assert_eq!(
            limiter.check_at(caller, next),
            RateDecision::Allowed {
                limit: 2,
                remaining: 1,
                reset_secs: 2
            }
        );
    }

    #[test]
    fn test_reset_counts_down_to_window_end() {
        let limiter = limiter(5);
        let caller = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 4));
        let start = Instant::now();
        limiter.check_at(caller, start);
        match limiter.check_at(caller, start + Duration::from_millis(45_500)) {
            RateDecision::Allowed {
                remaining,
                reset_secs,
                ..
            } => {
                assert_eq!(remaining, 3);
                assert_eq!(reset_secs, 15);
            }
            RateDecision::Limited { .. } => panic!("second request was limited"),
        }
    }

    #[test]
    fn test_retain_drops_closed_windows() {
        let limiter = limiter(5);
        let start = Instant::now();
        limiter.check_at(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)), start);
        limiter.check_at(
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, 6)),
            start + Duration::from_secs(30),
        );
        limiter.retain_at(start + Duration::from_secs(61));
        assert_eq!(limiter.tracked(), 1);
    }

    #[test]
    fn test_headers_applied() {
        let mut response = crate::http::build_404_response();
        RateDecision::Allowed {
            limit: 10,
            remaining: 9,
            reset_secs: 6,
        }
        .apply_headers(&mut response);
        assert_eq!(response.headers().get("RateLimit-Limit").unwrap(), "10");
        assert_eq!(response.headers().get("RateLimit-Remaining").unwrap(), "9");
        assert_eq!(response.headers().get("RateLimit-Reset").unwrap(), "6");
    }
}
