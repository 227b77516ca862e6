//! Use case and router tests for the auth crate

#[cfg(test)]
mod support {
    use std::sync::Arc;

    use kernel::clock::ManualClock;
    use platform::password::HashingCost;

    use crate::application::config::AuthConfig;
    use crate::infra::memory::InMemoryUserRepository;
    use crate::presentation::handlers::AuthAppState;

    pub fn config() -> AuthConfig {
        AuthConfig {
            hashing_cost: HashingCost::fast(),
            ..AuthConfig::development()
        }
    }

    pub fn state() -> (AuthAppState<InMemoryUserRepository>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let state = AuthAppState::new(InMemoryUserRepository::new(), config(), clock.clone());
        (state, clock)
    }
}

#[cfg(test)]
mod use_case_tests {
    use super::support::state;
    use crate::application::{
        AdminUserUpdate, AdminUsersUseCase, CheckSessionUseCase, ProfileUpdate, ProfileUseCase,
        SessionGrant, SignInInput, SignInUseCase, SignUpInput, SignUpUseCase,
        UpdatePasswordInput, UpdatePasswordUseCase,
    };
    use crate::domain::repository::UserRepository;
    use crate::domain::value_object::user_role::UserRole;
    use crate::error::AuthError;
    use crate::infra::memory::InMemoryUserRepository;
    use crate::presentation::handlers::AuthAppState;
    use platform::password::HashingCost;

    type State = AuthAppState<InMemoryUserRepository>;

    async fn register(state: &State, email: &str, password: &str) -> Result<SessionGrant, AuthError> {
        SignUpUseCase::new(
            state.repo.clone(),
            state.config.clone(),
            state.tokens.clone(),
            state.clock.clone(),
        )
        .execute(SignUpInput {
            name: "Ana Souza".to_string(),
            email: email.to_string(),
            password: password.to_string(),
        })
        .await
    }

    async fn login(state: &State, email: &str, password: &str) -> Result<SessionGrant, AuthError> {
        SignInUseCase::new(
            state.repo.clone(),
            state.config.clone(),
            state.tokens.clone(),
            state.clock.clone(),
        )
        .execute(SignInInput {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        })
        .await
    }

    fn gate(state: &State) -> CheckSessionUseCase<InMemoryUserRepository> {
        CheckSessionUseCase::new(state.repo.clone(), state.tokens.clone(), state.cache.clone())
    }

    async fn make_admin(state: &State, grant: &SessionGrant) -> crate::User {
        let mut user = state.repo.find_by_id(grant.user.id).await.unwrap().unwrap();
        user.role = UserRole::Admin;
        state.repo.update(&user).await.unwrap();
        user
    }

    #[tokio::test]
    async fn test_register_defaults_and_token() {
        let (state, _) = state();
        let grant = register(&state, "a@b.com", "secret1").await.unwrap();

        assert_eq!(grant.user.role, UserRole::User);
        assert!(grant.user.is_active);
        assert_eq!(grant.user.email.as_str(), "a@b.com");

        let user = gate(&state).execute(Some(&grant.token.token), false).await.unwrap();
        assert_eq!(user.id, grant.user.id);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let (state, _) = state();
        register(&state, "a@b.com", "secret1").await.unwrap();

        let err = register(&state, "A@B.com", "another1").await.unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));

        let app = err.into_app_error();
        assert_eq!(app.status_code(), 400);
        assert_eq!(app.message(), "Email already in use");
    }

    #[tokio::test]
    async fn test_register_collects_field_errors() {
        let (state, _) = state();
        let err = SignUpUseCase::new(
            state.repo.clone(),
            state.config.clone(),
            state.tokens.clone(),
            state.clock.clone(),
        )
        .execute(SignUpInput {
            name: " ".to_string(),
            email: "not-an-email".to_string(),
            password: "123".to_string(),
        })
        .await
        .unwrap_err();

        let errors = match err {
            AuthError::Validation(errors) => errors,
            other => panic!("expected validation error, got {other:?}"),
        };
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "email", "password"]);
        assert_eq!(state.repo.len().await, 0);
    }

    #[tokio::test]
    async fn test_login_round_trip() {
        let (state, _) = state();
        register(&state, "a@b.com", "secret1").await.unwrap();

        let grant = login(&state, "a@b.com", "secret1").await.unwrap();
        assert_eq!(grant.user.email.as_str(), "a@b.com");
    }

    #[tokio::test]
    async fn test_login_does_not_reveal_accounts() {
        let (state, _) = state();
        register(&state, "a@b.com", "secret1").await.unwrap();

        let wrong_password = login(&state, "a@b.com", "wrong-pw").await.unwrap_err();
        let unknown_email = login(&state, "nobody@b.com", "secret1").await.unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert_eq!(wrong_password.to_string(), "Incorrect email or password");
        assert_eq!(wrong_password.kind().status_code(), 401);
        assert_eq!(unknown_email.kind().status_code(), 401);
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let (state, _) = state();
        let use_case = SignInUseCase::new(
            state.repo.clone(),
            state.config.clone(),
            state.tokens.clone(),
            state.clock.clone(),
        );

        for (email, password) in [
            (None, Some("secret1")),
            (Some("a@b.com"), None),
            (Some(""), Some("secret1")),
        ] {
            let err = use_case
                .execute(SignInInput {
                    email: email.map(str::to_string),
                    password: password.map(str::to_string),
                })
                .await
                .unwrap_err();
            assert!(matches!(err, AuthError::MissingCredentials));
            assert_eq!(err.kind().status_code(), 400);
        }
    }

    #[tokio::test]
    async fn test_inactive_user_rejected_after_password_check() {
        let (state, _) = state();
        let grant = register(&state, "a@b.com", "secret1").await.unwrap();
        ProfileUseCase::new(state.repo.clone(), state.cache.clone(), state.clock.clone())
            .deactivate_me(grant.user.id)
            .await
            .unwrap();

        // Wrong password still gets the generic message
        let err = login(&state, "a@b.com", "wrong-pw").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        let err = login(&state, "a@b.com", "secret1").await.unwrap_err();
        assert!(matches!(err, AuthError::UserInactive));
        assert_eq!(err.to_string(), "This account has been disabled.");
    }

    #[tokio::test]
    async fn test_gate_rejections() {
        let (state, clock) = state();
        let grant = register(&state, "a@b.com", "secret1").await.unwrap();

        assert!(matches!(
            gate(&state).execute(None, false).await,
            Err(AuthError::MissingToken)
        ));
        assert!(matches!(
            gate(&state).execute(Some("garbage"), false).await,
            Err(AuthError::InvalidToken)
        ));

        clock.advance(chrono::Duration::days(7));
        assert!(matches!(
            gate(&state).execute(Some(&grant.token.token), false).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_gate_sees_deleted_user_on_fresh_load() {
        let (state, _) = state();
        let grant = register(&state, "a@b.com", "secret1").await.unwrap();
        let token = grant.token.token.clone();

        gate(&state).execute(Some(&token), false).await.unwrap();
        state.repo.delete(grant.user.id).await.unwrap();

        assert!(matches!(
            gate(&state).execute(Some(&token), true).await,
            Err(AuthError::TokenUserMissing)
        ));
    }

    #[tokio::test]
    async fn test_deactivation_invalidates_cache_immediately() {
        let (state, _) = state();
        let grant = register(&state, "a@b.com", "secret1").await.unwrap();
        let token = grant.token.token.clone();

        // Warm the cache
        gate(&state).execute(Some(&token), false).await.unwrap();
        assert_eq!(state.cache.len(), 1);

        ProfileUseCase::new(state.repo.clone(), state.cache.clone(), state.clock.clone())
            .deactivate_me(grant.user.id)
            .await
            .unwrap();

        // A safe request (cache allowed) still sees the deactivation
        assert!(matches!(
            gate(&state).execute(Some(&token), false).await,
            Err(AuthError::UserInactive)
        ));
    }

    #[tokio::test]
    async fn test_update_password_wrong_current_keeps_hash() {
        let (state, _) = state();
        let grant = register(&state, "a@b.com", "secret1").await.unwrap();
        let before = state.repo.find_by_id(grant.user.id).await.unwrap().unwrap();

        let err = UpdatePasswordUseCase::new(
            state.repo.clone(),
            state.config.clone(),
            state.tokens.clone(),
            state.cache.clone(),
            state.clock.clone(),
        )
        .execute(
            grant.user.id,
            UpdatePasswordInput {
                current_password: Some("not-it".to_string()),
                new_password: Some("brand-new-1".to_string()),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AuthError::IncorrectCurrentPassword));
        assert_eq!(err.kind().status_code(), 401);

        let after = state.repo.find_by_id(grant.user.id).await.unwrap().unwrap();
        assert_eq!(before.password.as_phc_string(), after.password.as_phc_string());
        assert_eq!(before.updated_at, after.updated_at);
    }

    #[tokio::test]
    async fn test_update_password_rotates() {
        let (state, clock) = state();
        let grant = register(&state, "a@b.com", "secret1").await.unwrap();
        clock.advance(chrono::Duration::seconds(5));

        let use_case = UpdatePasswordUseCase::new(
            state.repo.clone(),
            state.config.clone(),
            state.tokens.clone(),
            state.cache.clone(),
            state.clock.clone(),
        );

        let missing = use_case
            .execute(
                grant.user.id,
                UpdatePasswordInput {
                    current_password: Some("secret1".to_string()),
                    new_password: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(missing, AuthError::MissingPasswords));

        let rotated = use_case
            .execute(
                grant.user.id,
                UpdatePasswordInput {
                    current_password: Some("secret1".to_string()),
                    new_password: Some("brand-new-1".to_string()),
                },
            )
            .await
            .unwrap();
        assert_ne!(rotated.token.token, grant.token.token);

        assert!(login(&state, "a@b.com", "secret1").await.is_err());
        assert!(login(&state, "a@b.com", "brand-new-1").await.is_ok());
    }

    #[tokio::test]
    async fn test_login_upgrades_outdated_hash() {
        let (state, _) = state();
        let grant = register(&state, "a@b.com", "secret1").await.unwrap();
        let old_hash = grant.user.password.as_phc_string().to_string();

        let mut stronger = (*state.config).clone();
        stronger.hashing_cost = HashingCost {
            iterations: HashingCost::fast().iterations + 1,
            ..HashingCost::fast()
        };
        let use_case = SignInUseCase::new(
            state.repo.clone(),
            std::sync::Arc::new(stronger.clone()),
            state.tokens.clone(),
            state.clock.clone(),
        );
        use_case
            .execute(SignInInput {
                email: Some("a@b.com".to_string()),
                password: Some("secret1".to_string()),
            })
            .await
            .unwrap();

        let stored = state.repo.find_by_id(grant.user.id).await.unwrap().unwrap();
        assert_ne!(stored.password.as_phc_string(), old_hash);
        assert!(!stored.password.needs_rehash(&stronger.hashing_cost));
    }

    #[tokio::test]
    async fn test_update_me_rules() {
        let (state, _) = state();
        register(&state, "taken@b.com", "secret1").await.unwrap();
        let grant = register(&state, "a@b.com", "secret1").await.unwrap();
        let profile = ProfileUseCase::new(state.repo.clone(), state.cache.clone(), state.clock.clone());

        let err = profile
            .update_me(
                grant.user.id,
                ProfileUpdate {
                    includes_password: true,
                    ..ProfileUpdate::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::PasswordChangeNotAllowed));

        let err = profile
            .update_me(
                grant.user.id,
                ProfileUpdate {
                    email: Some("taken@b.com".to_string()),
                    ..ProfileUpdate::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));

        let updated = profile
            .update_me(
                grant.user.id,
                ProfileUpdate {
                    name: Some("Ana Cozinhas".to_string()),
                    email: Some("a@b.com".to_string()),
                    is_seller: Some(true),
                    ..ProfileUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name.as_str(), "Ana Cozinhas");
        assert!(updated.is_seller);
    }

    #[tokio::test]
    async fn test_admin_operations() {
        let (state, _) = state();
        let admin_grant = register(&state, "admin@b.com", "secret1").await.unwrap();
        let admin = make_admin(&state, &admin_grant).await;
        let member = register(&state, "member@b.com", "secret1").await.unwrap();

        let admin_users =
            AdminUsersUseCase::new(state.repo.clone(), state.cache.clone(), state.clock.clone());

        assert!(matches!(
            admin_users.list(&member.user).await,
            Err(AuthError::Forbidden)
        ));
        assert_eq!(admin_users.list(&admin).await.unwrap().len(), 2);

        let updated = admin_users
            .update(
                &admin,
                member.user.id,
                AdminUserUpdate {
                    is_active: Some(false),
                    ..AdminUserUpdate::default()
                },
            )
            .await
            .unwrap();
        assert!(!updated.is_active);

        admin_users.delete(&admin, member.user.id).await.unwrap();
        assert!(matches!(
            admin_users.get(&admin, member.user.id).await,
            Err(AuthError::UserNotFound)
        ));
        assert!(matches!(
            admin_users.delete(&admin, member.user.id).await,
            Err(AuthError::UserNotFound)
        ));
    }
}

#[cfg(test)]
mod router_tests {
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::support::state;
    use crate::domain::repository::UserRepository;
    use crate::domain::value_object::{email::Email, user_role::UserRole};
    use crate::infra::memory::InMemoryUserRepository;
    use crate::presentation::handlers::AuthAppState;
    use crate::presentation::router::{auth_router, users_router};

    fn app(state: &AuthAppState<InMemoryUserRepository>) -> Router {
        Router::new()
            .nest("/api/auth", auth_router(state.clone()))
            .nest("/api/users", users_router(state.clone()))
    }

    fn json_request(method: &str, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn register(app: &Router, email: &str) -> String {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/register",
                json!({"name": "Ana", "email": email, "password": "secret1"}),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        body["data"]["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_register_sets_cookie_and_hides_hash() {
        let (state, _) = state();
        let app = app(&state);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/register",
                json!({"name": "Ana", "email": "a@b.com", "password": "secret1"}),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
        assert!(cookie.starts_with("jwt="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=604800"));

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["user"]["email"], "a@b.com");
        assert!(!body.to_string().contains("argon2"));
    }

    #[tokio::test]
    async fn test_duplicate_register_envelope() {
        let (state, _) = state();
        let app = app(&state);
        register(&app, "a@b.com").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/register",
                json!({"name": "Bia", "email": "a@b.com", "password": "secret2"}),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Email already in use");
    }

    #[tokio::test]
    async fn test_me_requires_token() {
        let (state, _) = state();
        let app = app(&state);

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/api/auth/me", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["success"], false);
    }

    #[tokio::test]
    async fn test_me_with_bearer_and_cookie() {
        let (state, _) = state();
        let app = app(&state);
        let token = register(&app, "a@b.com").await;

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/api/auth/me", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"]["email"], "a@b.com");

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/users/me")
                    .header(header::COOKIE, format!("jwt={token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_login_failure_is_generic_401() {
        let (state, _) = state();
        let app = app(&state);
        register(&app, "a@b.com").await;

        for body in [
            json!({"email": "a@b.com", "password": "wrong-pw"}),
            json!({"email": "ghost@b.com", "password": "secret1"}),
        ] {
            let response = app
                .clone()
                .oneshot(json_request("POST", "/api/auth/login", body, None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(
                body_json(response).await["message"],
                "Incorrect email or password"
            );
        }
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        let (state, _) = state();
        let app = app(&state);

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/api/auth/logout", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_admin_routes_are_restricted() {
        let (state, _) = state();
        let app = app(&state);
        let member_token = register(&app, "member@b.com").await;
        let admin_token = register(&app, "admin@b.com").await;

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/api/users", Some(&member_token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let email = Email::new("admin@b.com").unwrap();
        let mut admin = state.repo.find_by_email(&email).await.unwrap().unwrap();
        admin.role = UserRole::Admin;
        state.repo.update(&admin).await.unwrap();
        state.cache.invalidate(admin.id);

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/api/users", Some(&admin_token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_me_rejects_password() {
        let (state, _) = state();
        let app = app(&state);
        let token = register(&app, "a@b.com").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "PATCH",
                "/api/users/update-me",
                json!({"name": "Ana", "password": "sneaky-1"}),
                Some(&token),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_me_then_token_is_rejected() {
        let (state, _) = state();
        let app = app(&state);
        let token = register(&app, "a@b.com").await;

        let response = app
            .clone()
            .oneshot(empty_request("DELETE", "/api/users/delete-me", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/api/auth/me", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await["message"],
            "This account has been disabled."
        );
    }

    #[tokio::test]
    async fn test_undecodable_input_is_validation_envelope() {
        let (state, _) = state();
        let app = app(&state);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/register",
                json!({"name": "Ana", "email": 42, "password": "secret1"}),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION");
        assert_eq!(body["errors"][0]["field"], "email");

        let plain = Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("email=a@b.com"))
            .unwrap();
        let response = app.clone().oneshot(plain).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["errors"][0]["field"], "body");

        let token = register(&app, "admin@b.com").await;
        let email = Email::new("admin@b.com").unwrap();
        let mut admin = state.repo.find_by_email(&email).await.unwrap().unwrap();
        admin.role = UserRole::Admin;
        state.repo.update(&admin).await.unwrap();
        state.cache.invalidate(admin.id);

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/api/users/seven", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], "VALIDATION");
        assert_eq!(body["errors"][0]["field"], "id");
    }
}
