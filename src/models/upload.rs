//! Response payloads for the upload endpoints.

use serde::Serialize;

use crate::models::claims::Claims;

/// A file that was accepted and written to the upload directory.
#[derive(Serialize, Clone, Debug)]
pub struct StoredFile {
    /// Sanitized on-disk filename.
    pub filename: String,

    /// Bytes written.
    pub size: u64,
}

/// Body returned by `POST /upload`.
#[derive(Serialize, Debug)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
    pub size: u64,
    #[serde(rename = "uploadedBy")]
    pub uploaded_by: Claims,
}

/// Body returned by `POST /upload-multiple`.
#[derive(Serialize, Debug)]
pub struct MultiUploadResponse {
    pub message: String,
    pub files: Vec<StoredFile>,
    #[serde(rename = "uploadedBy")]
    pub uploaded_by: Claims,
}
