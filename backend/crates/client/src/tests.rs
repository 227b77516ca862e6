//! Client tests against a throwaway HTTP server

#[cfg(test)]
mod support {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode, header};
    use axum::response::{IntoResponse, Response};
    use axum::routing::{get, patch, post};
    use axum::{Json, Router};
    use chrono::{Duration, Utc};
    use kernel::clock::ManualClock;
    use serde_json::{Value, json};

    use crate::cache::test_tokens::token_expiring;
    use crate::config::ClientConfig;
    use crate::http::ApiClient;
    use crate::session::SessionManager;
    use crate::store::MemorySessionStore;

    pub const EMAIL: &str = "ana@example.com";
    pub const PASSWORD: &str = "secret1";

    pub struct FakeApi {
        pub token: String,
        pub rotated_token: String,
        pub me_hits: AtomicUsize,
        pub category_hits: AtomicUsize,
    }

    impl FakeApi {
        pub fn me_hits(&self) -> usize {
            self.me_hits.load(Ordering::SeqCst)
        }

        pub fn category_hits(&self) -> usize {
            self.category_hits.load(Ordering::SeqCst)
        }

        fn authorized(&self, headers: &HeaderMap) -> bool {
            let expected = [&self.token, &self.rotated_token].map(|t| format!("Bearer {t}"));
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| expected.iter().any(|e| e == v))
        }
    }

    pub fn user_json() -> Value {
        json!({
            "id": 7,
            "name": "Ana",
            "email": EMAIL,
            "role": "user",
            "isActive": true,
            "isSeller": true,
            "companyName": "Cozinhas Ana"
        })
    }

    fn unauthorized() -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "success": false,
                "message": "You are not logged in",
                "code": "UNAUTHENTICATED"
            })),
        )
            .into_response()
    }

    fn session(token: &str) -> Json<Value> {
        Json(json!({
            "success": true,
            "data": { "token": token, "expiresAt": Utc::now(), "user": user_json() }
        }))
    }

    async fn login(State(api): State<Arc<FakeApi>>, Json(body): Json<Value>) -> Response {
        if body["email"] == EMAIL && body["password"] == PASSWORD {
            session(&api.token).into_response()
        } else {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "success": false,
                    "message": "Invalid email or password",
                    "code": "UNAUTHENTICATED"
                })),
            )
                .into_response()
        }
    }

    async fn register(State(api): State<Arc<FakeApi>>) -> Response {
        (StatusCode::CREATED, session(&api.token)).into_response()
    }

    async fn logout() -> Json<Value> {
        Json(json!({ "success": true, "message": "Logged out successfully" }))
    }

    async fn me(State(api): State<Arc<FakeApi>>, headers: HeaderMap) -> Response {
        api.me_hits.fetch_add(1, Ordering::SeqCst);
        if !api.authorized(&headers) {
            return unauthorized();
        }
        Json(json!({ "success": true, "data": user_json() })).into_response()
    }

    async fn update_password(State(api): State<Arc<FakeApi>>, headers: HeaderMap) -> Response {
        if !api.authorized(&headers) {
            return unauthorized();
        }
        session(&api.rotated_token).into_response()
    }

    async fn list_categories(State(api): State<Arc<FakeApi>>) -> Json<Value> {
        api.category_hits.fetch_add(1, Ordering::SeqCst);
        Json(json!({ "success": true, "data": [{ "id": 1, "slug": "fogoes" }] }))
    }

    async fn create_category() -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "message": "Validation failed",
                "code": "VALIDATION",
                "errors": [{ "field": "name", "message": "Category name is required" }]
            })),
        )
            .into_response()
    }

    /// Serve the fake API on an ephemeral port; returns its base URL
    pub async fn spawn_api() -> (String, Arc<FakeApi>) {
        let api = Arc::new(FakeApi {
            token: token_expiring(Utc::now() + Duration::days(7)),
            rotated_token: token_expiring(Utc::now() + Duration::days(8)),
            me_hits: AtomicUsize::new(0),
            category_hits: AtomicUsize::new(0),
        });

        let router = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/register", post(register))
            .route("/api/auth/logout", post(logout))
            .route("/api/auth/me", get(me))
            .route("/api/auth/update-password", patch(update_password))
            .route("/api/categories", get(list_categories).post(create_category))
            .with_state(api.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        (format!("http://{addr}/api"), api)
    }

    /// Base URL of a port nothing listens on
    pub fn dead_api() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}/api")
    }

    pub struct Harness {
        pub manager: SessionManager<MemorySessionStore>,
        pub store: Arc<MemorySessionStore>,
        pub clock: Arc<ManualClock>,
    }

    pub fn harness(base_url: &str) -> Harness {
        let clock = Arc::new(ManualClock::starting_now());
        let config = ClientConfig {
            base_url: base_url.to_string(),
            ..ClientConfig::development()
        };
        let api = Arc::new(ApiClient::new(config, clock.clone()).unwrap());
        let store = Arc::new(MemorySessionStore::new());
        Harness {
            manager: SessionManager::new(api, store.clone(), clock.clone()),
            store,
            clock,
        }
    }
}

#[cfg(test)]
mod session_tests {
    use chrono::Duration;
    use kernel::clock::Clock;
    use kernel::id::UserId;

    use super::support::{EMAIL, PASSWORD, dead_api, harness, spawn_api, user_json};
    use crate::cache::test_tokens::token_expiring;
    use crate::session::{Identity, LOGIN_PATH};
    use crate::store::{SessionEntry, SessionStore};

    #[tokio::test]
    async fn test_login_then_cached_identity_needs_no_request() {
        let (url, api) = spawn_api().await;
        let h = harness(&url);

        let user = h.manager.login(EMAIL, PASSWORD).await.unwrap();
        assert_eq!(user.id, UserId::from_i64(7));
        assert_eq!(h.store.load().await.unwrap().unwrap().token, api.token);

        let identity = h.manager.current_user().await.unwrap();
        assert!(matches!(identity, Identity::Cached(ref u) if u.email == EMAIL));
        assert_eq!(api.me_hits(), 0);
    }

    #[tokio::test]
    async fn test_stale_entry_is_refreshed_from_server() {
        let (url, api) = spawn_api().await;
        let h = harness(&url);
        h.manager.login(EMAIL, PASSWORD).await.unwrap();

        h.clock.advance(Duration::hours(3) + Duration::seconds(1));
        let identity = h.manager.current_user().await.unwrap();
        assert!(matches!(identity, Identity::Fresh(_)));
        assert_eq!(api.me_hits(), 1);

        let stored = h.store.load().await.unwrap().unwrap();
        assert_eq!(stored.timestamp, h.clock.now());

        // Re-stamped entry is trusted again
        let identity = h.manager.current_user().await.unwrap();
        assert!(matches!(identity, Identity::Cached(_)));
        assert_eq!(api.me_hits(), 1);
    }

    #[tokio::test]
    async fn test_rejected_token_signs_out() {
        let (url, api) = spawn_api().await;
        let h = harness(&url);
        let expired = token_expiring(h.clock.now() - Duration::minutes(1));
        h.store
            .save(&SessionEntry {
                token: expired,
                user: serde_json::from_value(user_json()).unwrap(),
                timestamp: h.clock.now(),
            })
            .await
            .unwrap();

        let identity = h.manager.current_user().await.unwrap();
        assert_eq!(
            identity,
            Identity::SignedOut {
                redirect_to: LOGIN_PATH.to_string()
            }
        );
        assert_eq!(api.me_hits(), 1);
        assert!(h.store.load().await.unwrap().is_none());
        assert!(h.manager.api().token().await.is_none());
    }

    #[tokio::test]
    async fn test_network_failure_returns_stale_identity() {
        let h = harness(&dead_api());
        let token = token_expiring(h.clock.now() + Duration::days(7));
        let saved_at = h.clock.now() - Duration::hours(4);
        h.store
            .save(&SessionEntry {
                token: token.clone(),
                user: serde_json::from_value(user_json()).unwrap(),
                timestamp: saved_at,
            })
            .await
            .unwrap();

        // Repeated offline checks keep answering from the saved session
        for _ in 0..2 {
            match h.manager.current_user().await.unwrap() {
                Identity::Stale { user, warning } => {
                    assert_eq!(user.email, EMAIL);
                    assert!(!warning.is_empty());
                }
                other => panic!("expected stale identity, got {other:?}"),
            }

            let stored = h.store.load().await.unwrap().unwrap();
            assert_eq!(stored.token, token);
            assert_eq!(stored.timestamp, saved_at);
        }
    }

    #[tokio::test]
    async fn test_no_session_is_signed_out_without_request() {
        let (url, api) = spawn_api().await;
        let h = harness(&url);

        let identity = h.manager.current_user().await.unwrap();
        assert!(identity.user().is_none());
        assert_eq!(api.me_hits(), 0);
    }

    #[tokio::test]
    async fn test_bad_credentials_store_nothing() {
        let (url, _api) = spawn_api().await;
        let h = harness(&url);

        let err = h.manager.login(EMAIL, "wrong").await.unwrap_err();
        assert!(err.is_unauthorized());
        assert!(err.to_string().contains("Invalid email or password"));
        assert!(h.store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_register_and_password_change_rotate_token() {
        let (url, api) = spawn_api().await;
        let h = harness(&url);

        h.manager.register("Ana", EMAIL, PASSWORD).await.unwrap();
        assert_eq!(h.store.load().await.unwrap().unwrap().token, api.token);

        h.manager.update_password(PASSWORD, "secret2").await.unwrap();
        assert_eq!(h.store.load().await.unwrap().unwrap().token, api.rotated_token);
        assert_eq!(
            h.manager.api().token().await.as_deref(),
            Some(api.rotated_token.as_str())
        );
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_offline() {
        let h = harness(&dead_api());
        h.store
            .save(&SessionEntry {
                token: token_expiring(h.clock.now() + Duration::days(1)),
                user: serde_json::from_value(user_json()).unwrap(),
                timestamp: h.clock.now(),
            })
            .await
            .unwrap();

        h.manager.logout().await.unwrap();
        assert!(h.store.load().await.unwrap().is_none());
    }
}

#[cfg(test)]
mod api_client_tests {
    use chrono::Duration;
    use serde_json::{Value, json};

    use super::support::{dead_api, harness, spawn_api};
    use crate::error::ClientError;
    use crate::http::into_data;

    #[tokio::test]
    async fn test_get_responses_cached_until_ttl() {
        let (url, api) = spawn_api().await;
        let h = harness(&url);
        let client = h.manager.api();

        let first: Vec<Value> = into_data(client.get("/categories").await.unwrap()).unwrap();
        let second: Vec<Value> = into_data(client.get("/categories").await.unwrap()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0]["slug"], "fogoes");
        assert_eq!(api.category_hits(), 1);

        h.clock.advance(Duration::minutes(5));
        client.get::<Value>("/categories").await.unwrap();
        assert_eq!(api.category_hits(), 2);

        client.clear_cache("/categories").await;
        client.get::<Value>("/categories").await.unwrap();
        assert_eq!(api.category_hits(), 3);
    }

    #[tokio::test]
    async fn test_mutation_clears_cache_and_surfaces_field_errors() {
        let (url, api) = spawn_api().await;
        let h = harness(&url);
        let client = h.manager.api();

        client.get::<Value>("/categories").await.unwrap();
        assert_eq!(client.cached_responses().await, 1);

        let err = client
            .post::<_, Value>("/categories", &json!({ "name": "" }))
            .await
            .unwrap_err();
        match err {
            ClientError::Api {
                status,
                message,
                errors,
            } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Validation failed");
                assert_eq!(errors[0].field, "name");
            }
            other => panic!("expected api error, got {other:?}"),
        }

        assert_eq!(client.cached_responses().await, 0);
        client.get::<Value>("/categories").await.unwrap();
        assert_eq!(api.category_hits(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let h = harness(&dead_api());
        let err = h
            .manager
            .api()
            .get::<Value>("/categories")
            .await
            .unwrap_err();
        assert!(err.is_network());
        assert_eq!(h.manager.api().cached_responses().await, 0);
    }
}
