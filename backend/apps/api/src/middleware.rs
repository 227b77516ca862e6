//! Cross-cutting HTTP middleware

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use kernel::error::app_error::AppError;
use platform::client::client_key;
use platform::rate_limit::{MemoryRateLimitStore, RateLimitConfig, RateLimitStore};

/// Requests slower than this are logged at warn
const SLOW_REQUEST_MS: u128 = 500;

const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

#[derive(Clone)]
pub struct RateLimitState {
    pub store: Arc<MemoryRateLimitStore>,
    pub config: Arc<RateLimitConfig>,
}

impl RateLimitState {
    pub fn new(store: MemoryRateLimitStore, config: RateLimitConfig) -> Self {
        Self {
            store: Arc::new(store),
            config: Arc::new(config),
        }
    }
}

/// Fixed-window limit per client address
pub async fn rate_limit(State(state): State<RateLimitState>, req: Request, next: Next) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());
    let key = client_key(req.headers(), peer);

    let result = match state.store.check_and_increment(&key, &state.config).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "Rate limit check failed, allowing request");
            return next.run(req).await;
        }
    };

    if !result.allowed {
        let retry_after = result.retry_after_secs(state.store.now_ms());
        tracing::warn!(client = %key, retry_after, "Rate limit exceeded");

        let mut response =
            AppError::too_many_requests("Too many requests, please try again later")
                .into_response();
        let headers = response.headers_mut();
        headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
        headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(0u32));
        return response;
    }

    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert(RATE_LIMIT_REMAINING, HeaderValue::from(result.remaining));
    response
}

/// Logs every request and reports its duration in `X-Response-Time`
pub async fn response_time(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let mut response = next.run(req).await;

    let elapsed_ms = started.elapsed().as_millis();
    if let Ok(value) = HeaderValue::from_str(&format!("{elapsed_ms}ms")) {
        response.headers_mut().insert("x-response-time", value);
    }

    let status = response.status().as_u16();
    if elapsed_ms > SLOW_REQUEST_MS {
        tracing::warn!(%method, %path, status, elapsed_ms = elapsed_ms as u64, "Slow request");
    } else {
        tracing::info!(%method, %path, status, elapsed_ms = elapsed_ms as u64, "Request handled");
    }

    response
}

/// Anonymous successful GETs may be cached by browsers and proxies; writes never
pub async fn cache_headers(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let anonymous = !req.headers().contains_key(header::AUTHORIZATION)
        && !req.headers().contains_key(header::COOKIE);

    let mut response = next.run(req).await;
    if response.headers().contains_key(header::CACHE_CONTROL) {
        return response;
    }

    let value = match method {
        Method::GET if anonymous && response.status().is_success() => "public, max-age=300",
        Method::GET | Method::HEAD | Method::OPTIONS => return response,
        _ => "no-cache, no-store",
    };
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static(value));
    response
}

/// Fallback for unknown routes
pub async fn not_found(req: Request) -> Response {
    AppError::not_found(format!("Route {} {} not found", req.method(), req.uri().path()))
        .into_response()
}
