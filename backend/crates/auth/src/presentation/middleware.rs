//! Auth Middleware
//!
//! The request gate. Reads the token (bearer header first, then cookie),
//! resolves the user and stores it as a [`CurrentUser`] extension.
//!
//! ```text
//! no token            -> 401
//! bad/expired token   -> 401
//! user gone           -> 401
//! user inactive       -> 401
//! role not permitted  -> 403 (require_admin)
//! ```

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use platform::cookie::extract_session_token;

use crate::application::{CheckSessionUseCase, ensure_admin};
use crate::domain::repository::UserRepository;
use crate::error::AuthError;
use crate::presentation::extractor::CurrentUser;
use crate::presentation::handlers::AuthAppState;

/// Middleware that requires a valid session
pub async fn require_auth<U>(
    State(state): State<AuthAppState<U>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError>
where
    U: UserRepository + Send + Sync + 'static,
{
    let token = extract_session_token(req.headers(), &state.config.session_cookie_name);
    // Unsafe methods change state, so they never trust a cached identity
    let fresh = !req.method().is_safe();

    let use_case = CheckSessionUseCase::new(
        state.repo.clone(),
        state.tokens.clone(),
        state.cache.clone(),
    );
    let user = use_case.execute(token.as_deref(), fresh).await?;

    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

/// Must run after [`require_auth`]
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AuthError> {
    let current = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AuthError::MissingToken)?;
    ensure_admin(current.user())?;

    Ok(next.run(req).await)
}
