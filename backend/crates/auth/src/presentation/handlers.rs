//! HTTP Handlers

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use kernel::clock::Clock;
use kernel::extract::{Json, Path};
use kernel::id::UserId;
use kernel::response::ApiResponse;
use platform::cookie::{delete_cookie_header, extract_session_token, set_cookie_header};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    AdminUserUpdate, AdminUsersUseCase, ProfileUpdate, ProfileUseCase, SessionGrant,
    SessionTokens, SignInInput, SignInUseCase, SignOutUseCase, SignUpInput, SignUpUseCase,
    UpdatePasswordInput, UpdatePasswordUseCase, UserCache,
};
use crate::domain::repository::UserRepository;
use crate::error::AuthResult;
use crate::presentation::dto::{
    AdminUpdateUserRequest, LoginRequest, RegisterRequest, SessionResponse, UpdateMeRequest,
    UpdatePasswordRequest, UserResponse,
};
use crate::presentation::extractor::CurrentUser;

/// Shared state for auth handlers and the request gate
pub struct AuthAppState<U> {
    pub repo: Arc<U>,
    pub config: Arc<AuthConfig>,
    pub tokens: SessionTokens,
    pub cache: UserCache,
    pub clock: Arc<dyn Clock>,
}

impl<U> Clone for AuthAppState<U> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
            tokens: self.tokens.clone(),
            cache: self.cache.clone(),
            clock: self.clock.clone(),
        }
    }
}

impl<U> AuthAppState<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(repo: U, config: AuthConfig, clock: Arc<dyn Clock>) -> Self {
        let tokens = SessionTokens::new(&config, clock.clone());
        let cache = UserCache::new(config.user_cache_ttl, clock.clone());
        Self {
            repo: Arc::new(repo),
            config: Arc::new(config),
            tokens,
            cache,
            clock,
        }
    }
}

/// Set-Cookie plus the token/user envelope
fn session_response(
    config: &AuthConfig,
    status: StatusCode,
    grant: SessionGrant,
) -> impl IntoResponse + use<> {
    let cookie = set_cookie_header(&config.cookie_config(), &grant.token.token);
    (
        status,
        [(header::SET_COOKIE, cookie)],
        Json(ApiResponse::ok(SessionResponse::from(grant))),
    )
}

// ============================================================================
// Register / Login / Logout
// ============================================================================

/// POST /api/auth/register
pub async fn register<U>(
    State(state): State<AuthAppState<U>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse>
where
    U: UserRepository + Send + Sync + 'static,
{
    let use_case = SignUpUseCase::new(
        state.repo.clone(),
        state.config.clone(),
        state.tokens.clone(),
        state.clock.clone(),
    );

    let grant = use_case
        .execute(SignUpInput {
            name: req.name,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(session_response(&state.config, StatusCode::CREATED, grant))
}

/// POST /api/auth/login
pub async fn login<U>(
    State(state): State<AuthAppState<U>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<impl IntoResponse>
where
    U: UserRepository + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(
        state.repo.clone(),
        state.config.clone(),
        state.tokens.clone(),
        state.clock.clone(),
    );

    let grant = use_case
        .execute(SignInInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(session_response(&state.config, StatusCode::OK, grant))
}

/// GET|POST /api/auth/logout
pub async fn logout<U>(
    State(state): State<AuthAppState<U>>,
    headers: HeaderMap,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
{
    let token = extract_session_token(&headers, &state.config.session_cookie_name);
    SignOutUseCase::new(state.tokens.clone(), state.cache.clone()).execute(token.as_deref());

    (
        StatusCode::OK,
        [(header::SET_COOKIE, delete_cookie_header(&state.config.cookie_config()))],
        Json(ApiResponse::message("Logged out successfully")),
    )
}

// ============================================================================
// Current user
// ============================================================================

/// GET /api/auth/me, GET /api/users/me
pub async fn me(CurrentUser(user): CurrentUser) -> Json<ApiResponse<UserResponse>> {
    Json(ApiResponse::ok(UserResponse::from(user)))
}

/// PATCH /api/auth/update-password, PATCH /api/users/update-password
pub async fn update_password<U>(
    State(state): State<AuthAppState<U>>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<UpdatePasswordRequest>,
) -> AuthResult<impl IntoResponse>
where
    U: UserRepository + Send + Sync + 'static,
{
    let use_case = UpdatePasswordUseCase::new(
        state.repo.clone(),
        state.config.clone(),
        state.tokens.clone(),
        state.cache.clone(),
        state.clock.clone(),
    );

    let grant = use_case
        .execute(
            user.id,
            UpdatePasswordInput {
                current_password: req.current_password,
                new_password: req.new_password,
            },
        )
        .await?;

    Ok(session_response(&state.config, StatusCode::OK, grant))
}

/// PATCH /api/users/update-me
pub async fn update_me<U>(
    State(state): State<AuthAppState<U>>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<UpdateMeRequest>,
) -> AuthResult<Json<ApiResponse<UserResponse>>>
where
    U: UserRepository + Send + Sync + 'static,
{
    let use_case = ProfileUseCase::new(state.repo.clone(), state.cache.clone(), state.clock.clone());

    let updated = use_case
        .update_me(
            user.id,
            ProfileUpdate {
                name: req.name,
                email: req.email,
                is_seller: req.is_seller,
                profile: req.profile,
                includes_password: req.password.is_some(),
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(UserResponse::from(updated))))
}

/// DELETE /api/users/delete-me
pub async fn delete_me<U>(
    State(state): State<AuthAppState<U>>,
    CurrentUser(user): CurrentUser,
) -> AuthResult<impl IntoResponse>
where
    U: UserRepository + Send + Sync + 'static,
{
    ProfileUseCase::new(state.repo.clone(), state.cache.clone(), state.clock.clone())
        .deactivate_me(user.id)
        .await?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, delete_cookie_header(&state.config.cookie_config()))],
        Json(ApiResponse::message("Account deactivated")),
    ))
}

// ============================================================================
// Admin
// ============================================================================

fn admin_use_case<U>(state: &AuthAppState<U>) -> AdminUsersUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    AdminUsersUseCase::new(state.repo.clone(), state.cache.clone(), state.clock.clone())
}

/// GET /api/users
pub async fn list_users<U>(
    State(state): State<AuthAppState<U>>,
    CurrentUser(actor): CurrentUser,
) -> AuthResult<Json<ApiResponse<Vec<UserResponse>>>>
where
    U: UserRepository + Send + Sync + 'static,
{
    let users = admin_use_case(&state).list(&actor).await?;
    Ok(Json(ApiResponse::ok(
        users.into_iter().map(UserResponse::from).collect(),
    )))
}

/// GET /api/users/{id}
pub async fn get_user<U>(
    State(state): State<AuthAppState<U>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<UserId>,
) -> AuthResult<Json<ApiResponse<UserResponse>>>
where
    U: UserRepository + Send + Sync + 'static,
{
    let user = admin_use_case(&state).get(&actor, id).await?;
    Ok(Json(ApiResponse::ok(UserResponse::from(user))))
}

/// PATCH /api/users/{id}
pub async fn update_user<U>(
    State(state): State<AuthAppState<U>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<UserId>,
    Json(req): Json<AdminUpdateUserRequest>,
) -> AuthResult<Json<ApiResponse<UserResponse>>>
where
    U: UserRepository + Send + Sync + 'static,
{
    let user = admin_use_case(&state)
        .update(
            &actor,
            id,
            AdminUserUpdate {
                name: req.name,
                email: req.email,
                role: req.role,
                is_active: req.is_active,
                is_seller: req.is_seller,
                profile: req.profile,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok(UserResponse::from(user))))
}

/// DELETE /api/users/{id}
pub async fn delete_user<U>(
    State(state): State<AuthAppState<U>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<UserId>,
) -> AuthResult<impl IntoResponse>
where
    U: UserRepository + Send + Sync + 'static,
{
    admin_use_case(&state).delete(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
