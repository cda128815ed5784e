//! HTTP handlers for the upload endpoints.
//! Streams each multipart file straight into `StorageService` so a file is
//! validated and written in one pass, never fully buffered in memory.

use axum::{
    Extension, Json,
    extract::{Multipart, State},
};
use futures::StreamExt;
use std::io;

use crate::{
    errors::AppError,
    models::{
        claims::Claims,
        upload::{MultiUploadResponse, StoredFile, UploadResponse},
    },
    state::AppState,
};

/// Maximum number of entries accepted in the `files` field.
const MAX_FILES: usize = 50;

/// `POST /upload` — accept a single file in the `file` field.
///
/// The first `file` entry carrying a filename is stored; the rest of the body
/// is ignored. Responds with the stored filename, its size, and the identity
/// claim of the uploader.
pub async fn upload(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(format!("Invalid multipart data: {}", err)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let Some(original_name) = field.file_name().map(str::to_owned) else {
            continue;
        };

        let stream = field.map(|chunk| chunk.map_err(|err| io::Error::new(io::ErrorKind::Other, err)));
        let stored = state.storage.store_stream(&original_name, stream).await?;

        return Ok(Json(UploadResponse {
            message: "Upload successful".into(),
            filename: stored.filename,
            size: stored.size,
            uploaded_by: claims,
        }));
    }

    Err(AppError::bad_request("No file uploaded"))
}

/// `POST /upload-multiple` — accept up to [`MAX_FILES`] files in the `files`
/// field.
///
/// Files are validated and written in submission order. The first rejected
/// file fails the whole request; files written before it stay on disk (the
/// batch is not atomic).
pub async fn upload_multiple(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<Json<MultiUploadResponse>, AppError> {
    let mut files: Vec<StoredFile> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(format!("Invalid multipart data: {}", err)))?
    {
        if field.name() != Some("files") {
            continue;
        }
        let Some(original_name) = field.file_name().map(str::to_owned) else {
            continue;
        };

        if files.len() >= MAX_FILES {
            return Err(AppError::bad_request("Too many files"));
        }

        let stream = field.map(|chunk| chunk.map_err(|err| io::Error::new(io::ErrorKind::Other, err)));
        let stored = state.storage.store_stream(&original_name, stream).await?;
        files.push(stored);
    }

    if files.is_empty() {
        return Err(AppError::bad_request("No files uploaded"));
    }

    Ok(Json(MultiUploadResponse {
        message: "Upload successful".into(),
        files,
        uploaded_by: claims,
    }))
}
