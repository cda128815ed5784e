//! Defines routes for the upload service.
//!
//! ## Structure
//! - **Public endpoints**
//!   - `GET  /`        — plain-text liveness probe
//!   - `GET  /healthz` — liveness (JSON)
//!   - `GET  /readyz`  — readiness (upload-directory I/O check)
//!
//! - **Authenticated endpoints** (require `Authorization: Bearer <token>`)
//!   - `POST /upload`          — single file, multipart field `file`
//!   - `POST /upload-multiple` — up to 50 files, multipart field `files`
//!
//! The upload routes disable axum's default body limit; the per-file size cap
//! is enforced while streaming instead.

use crate::{
    handlers::{
        health_handlers::{healthz, readyz, root},
        upload_handlers::{upload, upload_multiple},
    },
    middleware::bearer_auth,
    state::AppState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

/// Build and return the router for all routes.
///
/// Bearer authentication is layered onto the upload routes only, so the
/// health probes answer regardless of credential state.
pub fn routes(state: AppState) -> Router {
    let uploads = Router::new()
        .route("/upload", post(upload))
        .route("/upload-multiple", post(upload_multiple))
        .layer(DefaultBodyLimit::disable());
    let uploads = bearer_auth::apply(uploads, state.clone());

    Router::new()
        // health endpoints (mounted at root)
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .merge(uploads)
        .with_state(state)
}
