//! Router assembly

use auth::domain::repository::UserRepository;
use auth::{AuthAppState, auth_router, users_router};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue, header};
use axum::middleware::{from_fn, from_fn_with_state};
use catalog::domain::repository::{CategoryRepository, ProductRepository};
use catalog::{CatalogAppState, categories_router, products_router};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::middleware::{RateLimitState, cache_headers, not_found, rate_limit, response_time};

/// Largest request body accepted by any route
pub const MAX_BODY_BYTES: usize = 10 * 1024;

const SECURITY_HEADERS: [(HeaderName, &str); 3] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "SAMEORIGIN"),
    (header::REFERRER_POLICY, "no-referrer"),
];

/// Every `/api` route behind the rate limiter, plus timing, cache and
/// security headers and a body size cap
pub fn build_router<U, R>(
    auth: AuthAppState<U>,
    catalog: CatalogAppState<R, U>,
    limiter: RateLimitState,
) -> Router
where
    U: UserRepository + Send + Sync + 'static,
    R: CategoryRepository + ProductRepository + Send + Sync + 'static,
{
    let api = Router::new()
        .nest("/auth", auth_router(auth.clone()))
        .nest("/users", users_router(auth))
        .nest("/categories", categories_router(catalog.clone()))
        .nest("/products", products_router(catalog))
        .layer(from_fn_with_state(limiter, rate_limit));

    let mut router = Router::new()
        .nest("/api", api)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(from_fn(cache_headers));

    for (name, value) in SECURITY_HEADERS {
        router = router.layer(SetResponseHeaderLayer::if_not_present(
            name,
            HeaderValue::from_static(value),
        ));
    }

    router.layer(from_fn(response_time))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use auth::{AuthConfig, InMemoryUserRepository};
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use catalog::{CatalogConfig, InMemoryCatalogRepository};
    use kernel::clock::ManualClock;
    use platform::password::HashingCost;
    use platform::rate_limit::{MemoryRateLimitStore, RateLimitConfig};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    fn app(max_requests: u32) -> Router {
        let clock = Arc::new(ManualClock::starting_now());
        let auth = AuthAppState::new(
            InMemoryUserRepository::new(),
            AuthConfig {
                hashing_cost: HashingCost::fast(),
                ..AuthConfig::development()
            },
            clock.clone(),
        );
        let catalog = CatalogAppState::new(
            InMemoryCatalogRepository::new(),
            CatalogConfig::default(),
            auth.clone(),
        );
        let limiter = RateLimitState::new(
            MemoryRateLimitStore::new(clock),
            RateLimitConfig::new(max_requests, 60),
        );
        build_router(auth, catalog, limiter)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("x-forwarded-for", "203.0.113.7")
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found_envelope() {
        let response = app(10).oneshot(get("/nowhere")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_public_get_is_cacheable_and_timed() {
        let response = app(10).oneshot(get("/api/categories")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let headers = response.headers();
        assert_eq!(headers[header::CACHE_CONTROL], "public, max-age=300");
        assert!(headers["x-response-time"].to_str().unwrap().ends_with("ms"));
        assert_eq!(headers["x-ratelimit-remaining"], "9");
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[header::X_FRAME_OPTIONS], "SAMEORIGIN");
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let name = "a".repeat(MAX_BODY_BYTES + 1);
        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::json!({"name": name, "email": "a@b.com", "password": "secret1"})
                    .to_string(),
            ))
            .unwrap();

        let response = app(10).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_writes_are_not_cacheable() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/categories")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name":"Fogões"}"#))
            .unwrap();

        let response = app(10).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache, no-store");
    }

    #[tokio::test]
    async fn test_rate_limit_returns_429_with_retry_after() {
        let app = app(2);

        for _ in 0..2 {
            let response = app.clone().oneshot(get("/api/categories")).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app.clone().oneshot(get("/api/categories")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["x-ratelimit-remaining"], "0");
        let retry_after: u64 = response.headers()[header::RETRY_AFTER]
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        assert!((1..=60).contains(&retry_after));

        let body = body_json(response).await;
        assert_eq!(body["code"], "TOO_MANY_REQUESTS");

        // A different client has its own window
        let other = Request::builder()
            .uri("/api/categories")
            .header("x-forwarded-for", "198.51.100.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(app.oneshot(other).await.unwrap().status(), StatusCode::OK);
    }
}
