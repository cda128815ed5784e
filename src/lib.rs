//! # upload-api
//!
//! A minimal authenticated file-upload service.
//!
//! Clients present a bearer token (HS256 JWT signed with a shared secret),
//! submit one or more files as multipart form data, and receive JSON metadata
//! describing what was stored. Files are validated by extension and size
//! while streaming and persisted to a flat directory on local disk.
//!
//! The library is organized into:
//!
//! - [`config`] - environment + CLI configuration
//! - [`errors`] - HTTP error responses
//! - [`middleware`] - bearer-token authentication
//! - [`models`] - token claims and response payloads
//! - [`handlers`] - HTTP handlers
//! - [`routes`] - router assembly
//! - [`services`] - token verification and disk storage

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use state::AppState;

use axum::Router;

/// Build the application router with all routes and middleware attached.
pub fn app(state: AppState) -> Router {
    routes::routes::routes(state)
}
