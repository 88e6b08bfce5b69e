//! Per-route fixed-window rate limiting.
//!
//! Every (client key, route class) pair owns one bucket. A request either
//! opens a fresh window or increments the current one; requests beyond the
//! class maximum are rejected but still counted, so hammering a closed window
//! never reopens it early.

use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::state::AppState;

/// Buckets are swept for expired windows once the table reaches this size
const PURGE_THRESHOLD: usize = 10_000;

static RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
static RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
static RATELIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

/// Category of endpoint used to select a rate-limit policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteClass {
    General,
    CreatePost,
    CreateComment,
    Like,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatePolicy {
    pub window: Duration,
    pub max_requests: u32,
}

impl RouteClass {
    pub const ALL: [RouteClass; 4] = [
        RouteClass::General,
        RouteClass::CreatePost,
        RouteClass::CreateComment,
        RouteClass::Like,
    ];

    pub fn policy(self) -> RatePolicy {
        const MINUTE: u64 = 60;
        match self {
            RouteClass::General => RatePolicy {
                window: Duration::from_secs(15 * MINUTE),
                max_requests: 100,
            },
            RouteClass::CreatePost => RatePolicy {
                window: Duration::from_secs(60 * MINUTE),
                max_requests: 5,
            },
            RouteClass::CreateComment => RatePolicy {
                window: Duration::from_secs(60 * MINUTE),
                max_requests: 15,
            },
            RouteClass::Like => RatePolicy {
                window: Duration::from_secs(60 * MINUTE),
                max_requests: 30,
            },
        }
    }

    pub fn rejection_message(self) -> &'static str {
        match self {
            RouteClass::General => "Too many requests, please try again later.",
            RouteClass::CreatePost => "Too many posts created, please try again later.",
            RouteClass::CreateComment => "Too many comments created, please try again later.",
            RouteClass::Like => "Too many like actions, please try again later.",
        }
    }
}

/// Quota state after a check, rendered as `RateLimit-*` headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub limit: u32,
    pub remaining: u32,
    pub reset_after: Duration,
}

impl RateLimitStatus {
    /// Seconds until the window resets, rounded up
    pub fn reset_secs(&self) -> u64 {
        self.reset_after.as_secs() + u64::from(self.reset_after.subsec_nanos() > 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimited {
    pub class: RouteClass,
    pub status: RateLimitStatus,
}

impl fmt::Display for RateLimited {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class.rejection_message())
    }
}

impl std::error::Error for RateLimited {}

#[derive(Debug)]
struct Bucket {
    count: u32,
    window_start: Instant,
}

/// Lock-protected bucket table shared by all in-flight requests
pub struct RateLimiter {
    buckets: Mutex<HashMap<(String, RouteClass), Bucket>>,
    enabled: bool,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            enabled: true,
        }
    }

    /// A limiter that admits everything (API_ENABLE_RATE_LIMITING=false)
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new()
        }
    }

    pub fn check(&self, client_key: &str, class: RouteClass) -> Result<RateLimitStatus, RateLimited> {
        self.check_at(client_key, class, Instant::now())
    }

    /// Count one request at `now`. The whole read-modify-write happens under the table lock.
    pub fn check_at(&self, client_key: &str, class: RouteClass, now: Instant) -> Result<RateLimitStatus, RateLimited> {
        let policy = class.policy();
        if !self.enabled {
            return Ok(RateLimitStatus {
                limit: policy.max_requests,
                remaining: policy.max_requests,
                reset_after: policy.window,
            });
        }

        let mut buckets = self.lock();
        if buckets.len() >= PURGE_THRESHOLD {
            purge_expired(&mut buckets, now);
        }

        let bucket = buckets
            .entry((client_key.to_string(), class))
            .or_insert(Bucket {
                count: 0,
                window_start: now,
            });

        let window_end = bucket.window_start + policy.window;
        if bucket.count == 0 || now >= window_end {
            bucket.count = 1;
            bucket.window_start = now;
        } else {
            bucket.count = bucket.count.saturating_add(1);
        }

        let status = RateLimitStatus {
            limit: policy.max_requests,
            remaining: policy.max_requests.saturating_sub(bucket.count),
            reset_after: (bucket.window_start + policy.window).saturating_duration_since(now),
        };

        if bucket.count > policy.max_requests {
            Err(RateLimited { class, status })
        } else {
            Ok(status)
        }
    }

    /// Drop buckets whose window has closed
    pub fn purge_expired_at(&self, now: Instant) {
        purge_expired(&mut self.lock(), now);
    }

    pub fn bucket_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<(String, RouteClass), Bucket>> {
        // Bucket updates are single assignments, so a poisoned table is still consistent
        self.buckets.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn purge_expired(buckets: &mut HashMap<(String, RouteClass), Bucket>, now: Instant) {
    buckets.retain(|(_, class), bucket| now < bucket.window_start + class.policy().window);
}

/// Middleware state: which limiter and which policy guard this route
#[derive(Clone)]
pub struct RouteLimit {
    limiter: Arc<RateLimiter>,
    class: RouteClass,
    trust_forwarded_for: bool,
}

impl RouteLimit {
    pub fn new(state: &AppState, class: RouteClass) -> Self {
        Self {
            limiter: state.rate_limiter.clone(),
            class,
            trust_forwarded_for: state.settings.trust_forwarded_for,
        }
    }
}

/// Rate limiting runs before authentication so it bounds load from bad credentials too
pub async fn rate_limit_middleware(
    State(route): State<RouteLimit>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(&request, route.trust_forwarded_for);

    match route.limiter.check(&key, route.class) {
        Ok(status) => {
            let mut response = next.run(request).await;
            apply_headers(response.headers_mut(), &status);
            response
        }
        Err(limited) => {
            tracing::warn!(client = %key, class = ?limited.class, "Rate limit exceeded");
            let mut response = ApiError::too_many_requests(limited.to_string()).into_response();
            let headers = response.headers_mut();
            apply_headers(headers, &limited.status);
            headers.insert(header::RETRY_AFTER, HeaderValue::from(limited.status.reset_secs()));
            response
        }
    }
}

/// Stable per-caller key, independent of authentication state. With a trusted proxy the
/// rightmost `X-Forwarded-For` hop is used: earlier hops are whatever the client sent.
pub fn client_key(request: &Request, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = request
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.rsplit(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn apply_headers(headers: &mut HeaderMap, status: &RateLimitStatus) {
    headers.insert(RATELIMIT_LIMIT.clone(), HeaderValue::from(status.limit));
    headers.insert(RATELIMIT_REMAINING.clone(), HeaderValue::from(status.remaining));
    headers.insert(RATELIMIT_RESET.clone(), HeaderValue::from(status.reset_secs()));
}
