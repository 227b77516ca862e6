//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::domain::repository::UserRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{require_admin, require_auth};

/// Routes mounted under `/api/auth`
pub fn auth_router<U>(state: AuthAppState<U>) -> Router
where
    U: UserRepository + Send + Sync + 'static,
{
    let gated = Router::new()
        .route("/me", get(handlers::me))
        .route("/update-password", patch(handlers::update_password::<U>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth::<U>,
        ));

    Router::new()
        .route("/register", post(handlers::register::<U>))
        .route("/login", post(handlers::login::<U>))
        .route(
            "/logout",
            get(handlers::logout::<U>).post(handlers::logout::<U>),
        )
        .merge(gated)
        .with_state(state)
}

/// Routes mounted under `/api/users`; all of them require a session and
/// everything except the `/me` family requires an admin
pub fn users_router<U>(state: AuthAppState<U>) -> Router
where
    U: UserRepository + Send + Sync + 'static,
{
    let admin = Router::new()
        .route("/", get(handlers::list_users::<U>))
        .route(
            "/{id}",
            get(handlers::get_user::<U>)
                .patch(handlers::update_user::<U>)
                .delete(handlers::delete_user::<U>),
        )
        .route_layer(middleware::from_fn(require_admin));

    Router::new()
        .route("/me", get(handlers::me))
        .route("/update-me", patch(handlers::update_me::<U>))
        .route("/delete-me", axum::routing::delete(handlers::delete_me::<U>))
        .route("/update-password", patch(handlers::update_password::<U>))
        .merge(admin)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth::<U>,
        ))
        .with_state(state)
}
