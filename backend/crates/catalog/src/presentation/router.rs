//! Catalog Router

use auth::domain::repository::UserRepository;
use auth::require_auth;
use axum::handler::Handler;
use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::domain::repository::{CategoryRepository, ProductRepository};
use crate::presentation::handlers::{self, CatalogAppState};

/// Routes mounted under `/api/categories`. Reads are public; writes need
/// a session and the use case checks for an admin.
pub fn categories_router<R, U>(state: CatalogAppState<R, U>) -> Router
where
    R: CategoryRepository + ProductRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let gate = middleware::from_fn_with_state(state.auth.clone(), require_auth::<U>);

    Router::new()
        .route(
            "/",
            get(handlers::list_categories::<R, U>)
                .post(handlers::create_category::<R, U>.layer(gate.clone())),
        )
        .route("/id/{id}", get(handlers::get_category_by_id::<R, U>))
        .route("/slug/{slug}", get(handlers::get_category_by_slug::<R, U>))
        .route(
            "/{id}",
            put(handlers::update_category::<R, U>)
                .delete(handlers::delete_category::<R, U>)
                .route_layer(gate),
        )
        .with_state(state)
}

/// Routes mounted under `/api/products`. `/public` is the storefront;
/// everything else needs a session.
pub fn products_router<R, U>(state: CatalogAppState<R, U>) -> Router
where
    R: CategoryRepository + ProductRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let gated = Router::new()
        .route(
            "/",
            get(handlers::list_seller_products::<R, U>).post(handlers::create_product::<R, U>),
        )
        .route(
            "/{id}",
            get(handlers::get_product::<R, U>)
                .put(handlers::update_product::<R, U>)
                .delete(handlers::delete_product::<R, U>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            require_auth::<U>,
        ));

    Router::new()
        .route("/public", get(handlers::list_public_products::<R, U>))
        .route("/public/{id}", get(handlers::get_public_product::<R, U>))
        .merge(gated)
        .with_state(state)
}
