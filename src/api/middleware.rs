//! Operator authentication and rate limiting for the HTTP API.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use std::{
    collections::HashMap,
    net::{IpAddr, Ipv4Addr},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

/// Who may call operator routes, and how hard anyone may call the rest.
#[derive(Clone, Debug)]
pub struct SecurityConfig {
    /// Bearer key required on operator routes. `None` leaves them open (local use).
    pub api_key: Option<String>,
    /// Allowed CORS origins. `None` is permissive.
    pub cors_origins: Option<Vec<String>>,
    pub rate_limiter: Option<RateLimiter>,
}

impl SecurityConfig {
    /// Rate limiting is only enabled alongside an API key (remote deployment).
    pub fn new(api_key: Option<String>, cors_origins: Option<Vec<String>>, rate_limit: u32) -> Self {
        let rate_limiter = api_key
            .as_ref()
            .map(|_| RateLimiter::new(rate_limit, Duration::from_secs(60)));
        Self {
            api_key,
            cors_origins,
            rate_limiter,
        }
    }

    /// No authentication, no limits (local development and tests).
    pub fn disabled() -> Self {
        Self {
            api_key: None,
            cors_origins: None,
            rate_limiter: None,
        }
    }

    pub fn with_api_key(key: impl Into<String>) -> Self {
        Self {
            api_key: Some(key.into()),
            cors_origins: None,
            rate_limiter: None,
        }
    }

    pub fn with_rate_limit(max_requests: u32) -> Self {
        Self {
            api_key: None,
            cors_origins: None,
            rate_limiter: Some(RateLimiter::new(max_requests, Duration::from_secs(60))),
        }
    }
}

/// Sliding-window request counter per client IP.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    requests: Arc<Mutex<HashMap<IpAddr, Vec<Instant>>>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            requests: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record a request from `ip`; `false` when it is over the limit.
    pub fn check(&self, ip: IpAddr) -> bool {
        let now = Instant::now();
        let cutoff = now.checked_sub(self.window).unwrap_or(now);

        let mut requests = self.requests.lock().expect("rate limiter lock poisoned");

        // Drop idle clients so the map does not grow without bound.
        if requests.len() > 1024 {
            requests.retain(|_, timestamps| timestamps.iter().any(|&t| t > cutoff));
        }

        let entry = requests.entry(ip).or_default();
        entry.retain(|&t| t > cutoff);
        if entry.len() < self.max_requests as usize {
            entry.push(now);
            true
        } else {
            false
        }
    }
}

/// Require `Authorization: Bearer <key>` when an API key is configured.
pub async fn auth_middleware(
    State(config): State<SecurityConfig>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let expected_key = match &config.api_key {
        Some(key) => key,
        None => return Ok(next.run(request).await),
    };

    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) if token == expected_key => Ok(next.run(request).await),
        Some(_) => {
            tracing::warn!("Invalid API key on {}", request.uri().path());
            Err(StatusCode::UNAUTHORIZED)
        }
        None => {
            tracing::warn!("Missing bearer token on {}", request.uri().path());
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

pub async fn rate_limit_middleware(
    State(rate_limiter): State<RateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let ip = client_ip(&request);

    if rate_limiter.check(ip) {
        Ok(next.run(request).await)
    } else {
        tracing::warn!("Rate limit exceeded for {}", ip);
        Err(StatusCode::TOO_MANY_REQUESTS)
    }
}

/// Client address from proxy headers, defaulting to localhost.
fn client_ip(request: &Request<Body>) -> IpAddr {
    let header = |name: &str| request.headers().get(name).and_then(|v| v.to_str().ok());

    let parse = |v: &str| v.trim().parse::<IpAddr>().ok();

    header("X-Forwarded-For")
        .and_then(|v| v.split(',').next())
        .and_then(parse)
        .or_else(|| header("X-Real-IP").and_then(parse))
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}
