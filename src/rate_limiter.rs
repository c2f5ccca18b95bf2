//! Per-client rate limiting middleware.
//!
//! Each client IP gets a token bucket per limit class:
//! - Search: `/search/*` routes (default 30/minute)
//! - General: every other route (default 100/minute)

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Buckets untouched this long are full again and can be dropped.
const IDLE_EXPIRY: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitType {
    General,
    Search,
}

/// Token bucket refilled continuously at `capacity` tokens per minute
#[derive(Debug)]
pub struct TokenBucket {
    capacity: u32,
    tokens: f64,
    /// Tokens added per second
    refill_rate: f64,
    last_refill: Instant,
}

impl TokenBucket {
    pub fn per_minute(capacity: u32) -> Self {
        Self {
            capacity,
            tokens: capacity as f64,
            refill_rate: capacity as f64 / 60.0,
            last_refill: Instant::now(),
        }
    }

    /// Try to consume a token, returns true if allowed
    pub fn try_acquire(&mut self) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill);
        self.tokens = (self.tokens + elapsed.as_secs_f64() * self.refill_rate).min(self.capacity as f64);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Idle for at least [`IDLE_EXPIRY`] and refilled to capacity at `now`.
    pub fn is_idle(&self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_refill);
        elapsed >= IDLE_EXPIRY
            && self.tokens + elapsed.as_secs_f64() * self.refill_rate >= self.capacity as f64
    }

    pub fn time_until_available(&self) -> Duration {
        if self.tokens >= 1.0 || self.refill_rate <= 0.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64((1.0 - self.tokens) / self.refill_rate)
        }
    }
}

#[derive(Debug)]
pub struct RateLimiterState {
    general_per_minute: u32,
    search_per_minute: u32,
    buckets: Mutex<HashMap<(IpAddr, RateLimitType), TokenBucket>>,
    last_sweep: Mutex<Instant>,
}

impl RateLimiterState {
    pub fn new(general_per_minute: u32, search_per_minute: u32) -> Self {
        Self {
            general_per_minute,
            search_per_minute,
            buckets: Mutex::new(HashMap::new()),
            last_sweep: Mutex::new(Instant::now()),
        }
    }

    /// Returns `Err(wait)` when the client must back off.
    pub fn check(&self, client: IpAddr, rate_type: RateLimitType) -> Result<(), Duration> {
        let capacity = match rate_type {
            RateLimitType::General => self.general_per_minute,
            RateLimitType::Search => self.search_per_minute,
        };

        let mut buckets = self.buckets.lock();
        self.sweep_idle(&mut buckets, Instant::now());

        let bucket = buckets
            .entry((client, rate_type))
            .or_insert_with(|| TokenBucket::per_minute(capacity));

        if bucket.try_acquire() {
            Ok(())
        } else {
            Err(bucket.time_until_available())
        }
    }

    /// Drop idle buckets, at most once per [`IDLE_EXPIRY`].
    fn sweep_idle(&self, buckets: &mut HashMap<(IpAddr, RateLimitType), TokenBucket>, now: Instant) {
        let mut last_sweep = self.last_sweep.lock();
        if now.saturating_duration_since(*last_sweep) < IDLE_EXPIRY {
            return;
        }
        *last_sweep = now;

        let before = buckets.len();
        buckets.retain(|_, bucket| !bucket.is_idle(now));
        if buckets.len() < before {
            debug!("Dropped {} idle rate limit buckets", before - buckets.len());
        }
    }

    pub fn tracked_buckets(&self) -> usize {
        self.buckets.lock().len()
    }
}

pub fn get_rate_limit_type(path: &str) -> RateLimitType {
    if path.starts_with("/search/") {
        RateLimitType::Search
    } else {
        RateLimitType::General
    }
}

fn client_ip(request: &Request<Body>) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

pub async fn rate_limit_middleware(
    State(state): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let rate_type = get_rate_limit_type(&path);
    let client = client_ip(&request);

    if let Err(wait_time) = state.check(client, rate_type) {
        warn!(
            "Rate limit exceeded for {} ({:?}), path: {}, retry after {}ms",
            client,
            rate_type,
            path,
            wait_time.as_millis()
        );
        return rate_limit_response(wait_time);
    }

    next.run(request).await
}

fn rate_limit_response(retry_after: Duration) -> Response {
    let retry_seconds = retry_after.as_secs_f64().ceil().max(1.0) as u64;

    let body = Json(json!({
        "error": format!("Rate limit exceeded. Please retry after {} seconds.", retry_seconds),
        "retry_after_ms": retry_after.as_millis() as u64
    }));

    let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
    response
        .headers_mut()
        .insert("Retry-After", HeaderValue::from(retry_seconds));

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_bucket_basic() {
        let mut bucket = TokenBucket::per_minute(3);

        for _ in 0..3 {
            assert!(bucket.try_acquire());
        }
        assert!(!bucket.try_acquire());
        assert!(bucket.time_until_available() > Duration::ZERO);
    }

    #[test]
    fn test_token_bucket_refill() {
        let mut bucket = TokenBucket::per_minute(60);

        for _ in 0..60 {
            bucket.try_acquire();
        }
        assert!(!bucket.try_acquire());

        // 60/minute refills one token per second
        bucket.last_refill = Instant::now() - Duration::from_millis(2100);
        assert!(bucket.try_acquire());
        assert!(bucket.try_acquire());
        assert!(!bucket.try_acquire());
    }

    #[test]
    fn test_bucket_idle_only_when_refilled() {
        let mut bucket = TokenBucket::per_minute(2);
        bucket.try_acquire();
        bucket.try_acquire();

        let now = Instant::now();
        assert!(!bucket.is_idle(now));
        assert!(!bucket.is_idle(now + Duration::from_secs(30)));
        assert!(bucket.is_idle(now + Duration::from_secs(61)));
    }

    #[test]
    fn test_idle_buckets_are_swept() {
        let state = RateLimiterState::new(5, 5);
        for i in 0..100u8 {
            let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, i));
            assert!(state.check(ip, RateLimitType::Search).is_ok());
        }
        assert_eq!(state.tracked_buckets(), 100);

        let now = Instant::now();
        {
            let mut buckets = state.buckets.lock();

            // Not due yet: nothing is dropped
            state.sweep_idle(&mut buckets, now + Duration::from_secs(30));
            assert_eq!(buckets.len(), 100);

            state.sweep_idle(&mut buckets, now + Duration::from_secs(61));
            assert!(buckets.is_empty());
        }

        // A sweep that just ran is not repeated right away
        let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 1, 1));
        assert!(state.check(ip, RateLimitType::General).is_ok());
        assert_eq!(state.tracked_buckets(), 1);
    }

    #[test]
    fn test_recently_used_bucket_survives_sweep() {
        let state = RateLimiterState::new(5, 1);
        let busy: IpAddr = "10.0.0.8".parse().unwrap();
        let quiet: IpAddr = "10.0.0.9".parse().unwrap();
        assert!(state.check(busy, RateLimitType::Search).is_ok());
        assert!(state.check(quiet, RateLimitType::Search).is_ok());

        let sweep_at = Instant::now() + Duration::from_secs(61);
        let mut buckets = state.buckets.lock();
        if let Some(bucket) = buckets.get_mut(&(busy, RateLimitType::Search)) {
            bucket.last_refill = sweep_at - Duration::from_secs(1);
        }

        state.sweep_idle(&mut buckets, sweep_at);
        assert!(buckets.contains_key(&(busy, RateLimitType::Search)));
        assert!(!buckets.contains_key(&(quiet, RateLimitType::Search)));
    }

    #[test]
    fn test_rate_limit_type_detection() {
        assert_eq!(get_rate_limit_type("/search/sold"), RateLimitType::Search);
        assert_eq!(get_rate_limit_type("/search/compare"), RateLimitType::Search);
        assert_eq!(get_rate_limit_type("/health"), RateLimitType::General);
        assert_eq!(get_rate_limit_type("/"), RateLimitType::General);
    }

    #[test]
    fn test_buckets_are_per_client_and_class() {
        let state = RateLimiterState::new(5, 1);
        let alice: IpAddr = "10.0.0.1".parse().unwrap();
        let bob: IpAddr = "10.0.0.2".parse().unwrap();

        assert!(state.check(alice, RateLimitType::Search).is_ok());
        assert!(state.check(alice, RateLimitType::Search).is_err());
        assert!(state.check(alice, RateLimitType::General).is_ok());
        assert!(state.check(bob, RateLimitType::Search).is_ok());
    }
}
