use axum::extract::ConnectInfo;
use axum::extract::Request;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use dashmap::DashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Result of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Limited { retry_after: Duration },
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window per-IP rate limiter
#[derive(Clone)]
pub struct RateLimiter {
    windows: Arc<DashMap<IpAddr, Window>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    /// `max_requests_per_minute` requests per client per minute
    pub fn new(max_requests_per_minute: u32) -> Self {
        Self::with_window(max_requests_per_minute, DEFAULT_WINDOW)
    }

    pub fn with_window(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: Arc::new(DashMap::new()),
            max_requests,
            window,
        }
    }

    pub fn check(&self, ip: IpAddr) -> Decision {
        let now = Instant::now();
        let mut entry = self.windows.entry(ip).or_insert(Window {
            started: now,
            count: 0,
        });
        let state = entry.value_mut();

        let elapsed = now.duration_since(state.started);
        if elapsed >= self.window {
            *state = Window {
                started: now,
                count: 1,
            };
            return Decision::Allowed;
        }

        if state.count < self.max_requests {
            state.count += 1;
            Decision::Allowed
        } else {
            Decision::Limited {
                retry_after: self.window - elapsed,
            }
        }
    }

    /// Drop windows that have expired
    pub fn cleanup(&self) {
        let now = Instant::now();
        let window = self.window;
        self.windows
            .retain(|_, w| now.duration_since(w.started) < window);
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    rate_limiter: Arc<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    match rate_limiter.check(addr.ip()) {
        Decision::Allowed => next.run(request).await,
        Decision::Limited { retry_after } => {
            let secs = retry_after.as_secs().max(1).to_string();
            (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, secs)],
                "Rate limit exceeded",
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(last: u8) -> IpAddr {
        IpAddr::from([10, 0, 0, last])
    }

    #[tokio::test(start_paused = true)]
    async fn test_limits_per_client() {
        let limiter = RateLimiter::new(2);
        assert_eq!(limiter.check(ip(1)), Decision::Allowed);
        assert_eq!(limiter.check(ip(1)), Decision::Allowed);
        assert!(matches!(limiter.check(ip(1)), Decision::Limited { .. }));
        // Other clients are unaffected
        assert_eq!(limiter.check(ip(2)), Decision::Allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets() {
        let limiter = RateLimiter::with_window(1, Duration::from_secs(10));
        assert_eq!(limiter.check(ip(1)), Decision::Allowed);
        match limiter.check(ip(1)) {
            Decision::Limited { retry_after } => assert!(retry_after <= Duration::from_secs(10)),
            other => panic!("expected limit, got {:?}", other),
        }

        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(limiter.check(ip(1)), Decision::Allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_drops_expired_windows() {
        let limiter = RateLimiter::with_window(5, Duration::from_secs(10));
        limiter.check(ip(1));
        limiter.check(ip(2));
        assert_eq!(limiter.tracked_clients(), 2);

        tokio::time::advance(Duration::from_secs(11)).await;
        limiter.cleanup();
        assert_eq!(limiter.tracked_clients(), 0);
    }
}
