//! Per-client request limiting.
//!
//! Each [`RateLimiter`] keeps one GCRA bucket per client IP: `max_requests`
//! may arrive back to back, after which one request is admitted every
//! `window / max_requests`. Rejected requests get 429 with `Retry-After`.
//!
//! ```ignore
//! let login = Router::new()
//!     .route("/login", post(login))
//!     .layer(middleware::from_fn_with_state(
//!         RateLimiter::new(&RateLimitConfig::strict()),
//!         rate_limit,
//!     ));
//! ```

use crate::errors::{ErrorCode, error_response};
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};
use core_config::{ConfigError, FromEnv, env_parse_or, env_var};
use governor::clock::{Clock, DefaultClock};
use governor::{DefaultKeyedRateLimiter, Quota};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

/// Buckets kept before idle ones are pruned
const PRUNE_ABOVE: usize = 10_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_requests: u32,
    /// Message of the 429 body
    pub message: &'static str,
}

impl Default for RateLimitConfig {
    /// 100 requests per 15 minutes
    fn default() -> Self {
        Self {
            window: Duration::from_secs(15 * 60),
            max_requests: 100,
            message: "Too many requests from this IP, please try again later.",
        }
    }
}

impl RateLimitConfig {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            ..Self::default()
        }
    }

    /// 5 requests per 15 minutes, for credential endpoints
    pub fn strict() -> Self {
        Self {
            max_requests: 5,
            message: "Too many attempts, please try again later.",
            ..Self::default()
        }
    }

    fn quota(&self) -> Quota {
        let burst = NonZeroU32::new(self.max_requests).unwrap_or(NonZeroU32::MIN);
        let period = self.window / burst.get();
        Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst)
    }
}

/// | Variable | Default |
/// |---|---|
/// | `RATE_LIMIT_WINDOW_MS` | 900000 |
/// | `RATE_LIMIT_MAX_REQUESTS` (or `RATE_LIMIT_MAX`) | 100 |
impl FromEnv for RateLimitConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let window_ms = env_parse_or("RATE_LIMIT_WINDOW_MS", defaults.window.as_millis() as u64)?;
        let max_key = ["RATE_LIMIT_MAX_REQUESTS", "RATE_LIMIT_MAX"]
            .into_iter()
            .find(|key| env_var(key).is_some())
            .unwrap_or("RATE_LIMIT_MAX_REQUESTS");
        let max_requests: u32 = env_parse_or(max_key, defaults.max_requests)?;

        for (key, value) in [("RATE_LIMIT_WINDOW_MS", window_ms), (max_key, u64::from(max_requests))] {
            if value == 0 {
                return Err(ConfigError::ParseError {
                    key: key.to_string(),
                    details: "must be greater than zero".to_string(),
                });
            }
        }

        Ok(Self::new(Duration::from_millis(window_ms), max_requests))
    }
}

/// Shared bucket store; clones count against the same limits
#[derive(Clone)]
pub struct RateLimiter {
    buckets: Arc<DefaultKeyedRateLimiter<IpAddr>>,
    message: &'static str,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            buckets: Arc::new(governor::RateLimiter::keyed(config.quota())),
            message: config.message,
        }
    }

    /// `Err` holds how long the client should wait
    pub fn check(&self, client: IpAddr) -> Result<(), Duration> {
        let outcome = self
            .buckets
            .check_key(&client)
            .map_err(|denied| denied.wait_time_from(DefaultClock::default().now()));

        if self.buckets.len() > PRUNE_ABOVE {
            self.buckets.retain_recent();
        }
        outcome
    }
}

/// Peer address from `ConnectInfo`; requests without one share a bucket
fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Middleware for `axum::middleware::from_fn_with_state`
pub async fn rate_limit(State(limiter): State<RateLimiter>, request: Request, next: Next) -> Response {
    let client = client_ip(&request);
    match limiter.check(client) {
        Ok(()) => next.run(request).await,
        Err(wait) => {
            tracing::warn!(%client, path = %request.uri().path(), "Rate limit exceeded");
            let mut response = error_response(ErrorCode::TooManyRequests, limiter.message);
            let retry_after = wait.as_secs().max(1);
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
            response
        }
    }
}
