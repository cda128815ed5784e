//! Liveness & readiness handlers.
//!
//! - GET /        -> plain-text liveness ("running")
//! - GET /healthz -> simple liveness (JSON "ok")
//! - GET /readyz  -> readiness that checks upload-directory I/O

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::collections::HashMap;
use tokio::fs;
use uuid::Uuid;

/// `GET /`
///
/// Minimal liveness probe, reachable without authentication.
pub async fn root() -> &'static str {
    "running"
}

/// `GET /healthz`
///
/// Very small liveness probe — always returns 200 OK with a plain JSON body.
/// This endpoint should be cheap and never perform I/O.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /readyz`
///
/// Readiness probe that performs a best-effort write/read/delete against the
/// upload directory. Returns JSON describing the check: HTTP 200 when it
/// passes, HTTP 503 when it fails.
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let tmp_path = state
        .storage
        .base_path
        .join(format!(".readyz-{}", Uuid::new_v4()));
    let disk_check = match fs::write(&tmp_path, b"readyz").await {
        Ok(_) => match fs::read(&tmp_path).await {
            Ok(bytes) => {
                if bytes == b"readyz" {
                    // try to remove the temp file; ignore removal error but report if it happens
                    match fs::remove_file(&tmp_path).await {
                        Ok(_) => (true, None::<String>),
                        Err(e) => (true, Some(format!("could not remove tmp file: {}", e))),
                    }
                } else {
                    // content mismatch
                    let _ = fs::remove_file(&tmp_path).await; // best-effort cleanup
                    (false, Some("file content mismatch".to_string()))
                }
            }
            Err(e) => {
                let _ = fs::remove_file(&tmp_path).await; // best-effort cleanup
                (false, Some(format!("could not read tmp file: {}", e)))
            }
        },
        Err(e) => (false, Some(format!("could not write tmp file: {}", e))),
    };

    let disk_ok = disk_check.0;

    let mut checks = HashMap::new();
    checks.insert(
        "disk",
        CheckStatus {
            ok: disk_ok,
            error: disk_check.1,
        },
    );

    let body = ReadyResponse {
        status: if disk_ok { "ok".into() } else { "error".into() },
        checks,
    };

    let status = if disk_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    checks: HashMap<&'static str, CheckStatus>,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    error: Option<String>,
}
