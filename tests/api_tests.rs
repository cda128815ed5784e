//! API integration tests for the upload endpoints and error handling.
//!
//! Tests verify:
//! - Bearer-token enforcement (missing, invalid, expired)
//! - Extension and size validation, with no partial files left on disk
//! - Filename sanitization (whitespace collapse, traversal confinement)
//! - HTTP response codes and JSON bodies

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header, encode};
use std::path::Path;
use tempfile::{TempDir, tempdir};
use tower::ServiceExt;

use axum::Router;
use chrono::Utc;
use upload_api::models::claims::Claims;
use upload_api::services::{storage_service::StorageService, token_service::TokenService};
use upload_api::{AppState, app};

const SECRET: &str = "test-secret";
const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

// =============================================================================
// Helpers
// =============================================================================

fn build_app(max_file_size: u64) -> (Router, TempDir, TokenService) {
    let dir = tempdir().unwrap();
    let tokens = TokenService::new(SECRET);
    let storage = StorageService::new(dir.path(), max_file_size);
    let router = app(AppState::new(storage, tokens.clone()));
    (router, dir, tokens)
}

fn valid_token(tokens: &TokenService) -> String {
    tokens.sign("martin", "uploader", 3600).unwrap()
}

/// Token signed with the right secret but already expired (past the default
/// validation leeway).
fn expired_token() -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: "martin".into(),
        role: "uploader".into(),
        iat: now - 7200,
        exp: now - 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

/// Assemble a multipart/form-data body with one part per `(filename, bytes)`
/// entry, all under the same field name.
fn multipart_body(field: &str, files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (filename, data) in files {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(uri: &str, token: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body)).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// =============================================================================
// Liveness
// =============================================================================

#[tokio::test]
async fn root_returns_running_without_auth() {
    let (router, _dir, _tokens) = build_app(1024);

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"running");
}

#[tokio::test]
async fn health_probes_respond_ok() {
    let (router, _dir, _tokens) = build_app(1024);

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/readyz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn upload_without_token_is_unauthorized() {
    let (router, dir, _tokens) = build_app(1024);

    let body = multipart_body("file", &[("index.html", b"<html></html>")]);
    let response = router
        .oneshot(upload_request("/upload", None, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Token required");
    assert!(dir_entries(dir.path()).is_empty(), "no file may be written");
}

#[tokio::test]
async fn upload_with_invalid_token_is_forbidden() {
    let (router, dir, _tokens) = build_app(1024);

    let body = multipart_body("file", &[("index.html", b"<html></html>")]);
    let response = router
        .oneshot(upload_request("/upload", Some("not-a-jwt"), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid or expired token");
    assert!(dir_entries(dir.path()).is_empty(), "no file may be written");
}

#[tokio::test]
async fn upload_with_expired_token_is_forbidden() {
    let (router, dir, _tokens) = build_app(1024);

    let body = multipart_body("file", &[("index.html", b"<html></html>")]);
    let response = router
        .oneshot(upload_request("/upload", Some(&expired_token()), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(dir_entries(dir.path()).is_empty(), "no file may be written");
}

// =============================================================================
// Single upload
// =============================================================================

#[tokio::test]
async fn upload_stores_file_and_reports_uploader() {
    let (router, dir, tokens) = build_app(1024);
    let token = valid_token(&tokens);

    let body = multipart_body("file", &[("index.html", b"<html></html>")]);
    let response = router
        .oneshot(upload_request("/upload", Some(&token), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Upload successful");
    assert_eq!(json["filename"], "index.html");
    assert_eq!(json["size"], 13);
    assert_eq!(json["uploadedBy"]["sub"], "martin");
    assert_eq!(json["uploadedBy"]["role"], "uploader");

    let on_disk = std::fs::read(dir.path().join("index.html")).unwrap();
    assert_eq!(on_disk, b"<html></html>");
}

#[tokio::test]
async fn upload_rejects_disallowed_extension() {
    let (router, dir, tokens) = build_app(1024);
    let token = valid_token(&tokens);

    let body = multipart_body("file", &[("shell.exe", b"payload")]);
    let response = router
        .oneshot(upload_request("/upload", Some(&token), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Only HTML files (.html, .htm, .png) are allowed");
    assert!(dir_entries(dir.path()).is_empty(), "no file may be written");
}

#[tokio::test]
async fn upload_rejects_oversized_file() {
    let (router, dir, tokens) = build_app(16);
    let token = valid_token(&tokens);

    let body = multipart_body("file", &[("big.png", &[0u8; 64])]);
    let response = router
        .oneshot(upload_request("/upload", Some(&token), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "File too large");
    // Neither a complete nor a partial file may survive.
    assert!(dir_entries(dir.path()).is_empty(), "upload dir must be empty");
}

#[tokio::test]
async fn upload_without_file_field_is_bad_request() {
    let (router, _dir, tokens) = build_app(1024);
    let token = valid_token(&tokens);

    let body = multipart_body("something-else", &[("index.html", b"<html></html>")]);
    let response = router
        .oneshot(upload_request("/upload", Some(&token), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "No file uploaded");
}

#[tokio::test]
async fn whitespace_variants_collide_and_overwrite() {
    let (router, dir, tokens) = build_app(1024);
    let token = valid_token(&tokens);

    let first = multipart_body("file", &[("my report.png", b"first-version")]);
    let response = router
        .clone()
        .oneshot(upload_request("/upload", Some(&token), first))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let second = multipart_body("file", &[("my  report.png", b"v2")]);
    let response = router
        .oneshot(upload_request("/upload", Some(&token), second))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["filename"], "my_report.png");

    // Last writer wins: only one file, holding the second payload.
    assert_eq!(dir_entries(dir.path()), vec!["my_report.png"]);
    let on_disk = std::fs::read(dir.path().join("my_report.png")).unwrap();
    assert_eq!(on_disk, b"v2");
}

#[tokio::test]
async fn traversal_filename_is_confined_to_upload_dir() {
    let (router, dir, tokens) = build_app(1024);
    let token = valid_token(&tokens);

    let body = multipart_body("file", &[("../../escape.png", b"outside")]);
    let response = router
        .oneshot(upload_request("/upload", Some(&token), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["filename"], "escape.png");

    assert_eq!(dir_entries(dir.path()), vec!["escape.png"]);
    assert!(!dir.path().parent().unwrap().join("escape.png").exists());
}

// =============================================================================
// Multi upload
// =============================================================================

#[tokio::test]
async fn upload_multiple_stores_each_file() {
    let (router, dir, tokens) = build_app(1024);
    let token = valid_token(&tokens);

    let body = multipart_body(
        "files",
        &[("page.html", b"<html></html>"), ("Logo.PNG", b"pngbytes")],
    );
    let response = router
        .oneshot(upload_request("/upload-multiple", Some(&token), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Upload successful");
    assert_eq!(json["uploadedBy"]["sub"], "martin");
    let files = json["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["filename"], "page.html");
    assert_eq!(files[1]["filename"], "Logo.PNG");

    assert_eq!(dir_entries(dir.path()), vec!["Logo.PNG", "page.html"]);
}

#[tokio::test]
async fn upload_multiple_with_no_files_is_bad_request() {
    let (router, _dir, tokens) = build_app(1024);
    let token = valid_token(&tokens);

    let body = multipart_body("something-else", &[("page.html", b"<html></html>")]);
    let response = router
        .oneshot(upload_request("/upload-multiple", Some(&token), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "No files uploaded");
}

#[tokio::test]
async fn upload_multiple_failure_mid_batch_keeps_earlier_files() {
    let (router, dir, tokens) = build_app(1024);
    let token = valid_token(&tokens);

    let body = multipart_body(
        "files",
        &[("kept.html", b"<html></html>"), ("shell.exe", b"payload")],
    );
    let response = router
        .oneshot(upload_request("/upload-multiple", Some(&token), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    // The batch is not atomic: the file written before the failure stays.
    assert_eq!(dir_entries(dir.path()), vec!["kept.html"]);
}
