//! Core data models for the upload service.
//!
//! These entities represent the token claims attached to authenticated
//! requests and the JSON payloads returned by the upload endpoints. They
//! serialize naturally via `serde`.

pub mod claims;
pub mod upload;
