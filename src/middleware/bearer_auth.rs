//! Bearer-token authentication middleware.
//!
//! Extracts `Authorization: Bearer <token>`, verifies it against the shared
//! secret, and inserts the decoded [`Claims`] into request extensions so
//! handlers can read them with `Extension<Claims>`. Applied to the upload
//! routes only; the liveness endpoints stay public.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::{errors::AppError, models::claims::Claims, state::AppState};

/// Wrap `router` so every route requires a valid bearer token.
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, bearer_auth))
}

async fn bearer_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::unauthenticated("Token required"))?;

    let token = auth
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::unauthenticated("Token required"))?;

    let claims: Claims = match state.tokens.verify(token) {
        Ok(claims) => claims,
        Err(err) => {
            tracing::warn!(error = %err, "bearer token verification failed");
            return Err(AppError::forbidden("Invalid or expired token"));
        }
    };

    // middleware → handler hand-off
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
