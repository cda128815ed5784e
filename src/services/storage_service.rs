//! src/services/storage_service.rs
//!
//! StorageService — validates uploaded files and writes them to local disk.
//! Each file is checked (extension allow-list, per-file size cap) and written
//! in a single streaming pass beneath `base_path/{sanitized filename}`. There
//! is no metadata store; the directory itself is the source of truth.

use bytes::Bytes;
use futures::{Stream, StreamExt, pin_mut};
use std::{
    ffi::OsStr,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};
use thiserror::Error;
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::debug;
use uuid::Uuid;

use crate::models::upload::StoredFile;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Only HTML files (.html, .htm, .png) are allowed")]
    InvalidFileType { extension: String },
    #[error("File too large")]
    FileTooLarge { max_bytes: u64 },
    #[error("Invalid filename")]
    InvalidFilename,
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Extensions accepted by the upload endpoints, compared case-insensitively.
const ALLOWED_EXTENSIONS: [&str; 3] = ["html", "htm", "png"];

/// StorageService provides the write path for uploaded files:
/// - Validate the original filename (extension allow-list)
/// - Stream bytes to a staging file while enforcing the size cap
/// - Rename the staging file over the final name (last writer wins)
///
/// This struct intentionally keeps a minimal surface area so it is easy to
/// test and reason about. Reads and deletes are out of scope; nothing ever
/// removes a stored file.
#[derive(Clone)]
pub struct StorageService {
    /// Flat directory on disk where accepted files land.
    pub base_path: PathBuf,

    /// Maximum accepted size per file, in bytes.
    pub max_file_size: u64,
}

impl StorageService {
    /// Create a new StorageService rooted at `base_path`, enforcing
    /// `max_file_size` bytes per uploaded file.
    pub fn new(base_path: impl Into<PathBuf>, max_file_size: u64) -> Self {
        Self {
            base_path: base_path.into(),
            max_file_size,
        }
    }

    /// Check the file extension of `original_name` against the allow-list.
    ///
    /// The extension is taken from the client-supplied name and compared
    /// case-insensitively, so `page.HTML` passes and `shell.exe` (or a name
    /// with no extension at all) is rejected.
    pub fn ensure_extension_allowed(&self, original_name: &str) -> StoreResult<()> {
        let extension = Path::new(original_name)
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            Ok(())
        } else {
            Err(StoreError::InvalidFileType { extension })
        }
    }

    /// Derive the on-disk filename from a client-supplied name.
    ///
    /// Only the final path component is kept (both `/` and `\` count as
    /// separators), then every run of whitespace collapses to a single `_`.
    /// Names that reduce to nothing, `.` or `..` are rejected rather than
    /// allowed to escape or alias the upload directory.
    pub fn sanitize_filename(original: &str) -> StoreResult<String> {
        let base = original
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(original);

        let mut sanitized = String::with_capacity(base.len());
        let mut in_whitespace = false;
        for ch in base.chars() {
            if ch.is_whitespace() {
                if !in_whitespace {
                    sanitized.push('_');
                }
                in_whitespace = true;
            } else {
                in_whitespace = false;
                sanitized.push(ch);
            }
        }

        if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
            return Err(StoreError::InvalidFilename);
        }

        Ok(sanitized)
    }

    /// Stream one uploaded file to disk.
    ///
    /// - Validates extension and filename up front, before any byte is read.
    /// - Writes chunks incrementally to a staging file, counting bytes; the
    ///   write aborts as soon as the count exceeds `max_file_size`.
    /// - Renames the staging file into its final location on success
    ///   (overwriting any previous file of the same name).
    ///
    /// Any failure removes the staging file, so a rejected upload leaves
    /// nothing behind.
    pub async fn store_stream<S>(&self, original_name: &str, stream: S) -> StoreResult<StoredFile>
    where
        S: Stream<Item = io::Result<Bytes>>,
    {
        self.ensure_extension_allowed(original_name)?;
        let filename = Self::sanitize_filename(original_name)?;

        fs::create_dir_all(&self.base_path).await?;
        let final_path = self.base_path.join(&filename);
        let tmp_path = self.base_path.join(format!(".tmp-{}", Uuid::new_v4()));
        let mut file = File::create(&tmp_path).await?;

        let mut size: u64 = 0;
        pin_mut!(stream);
        while let Some(chunk_res) = stream.next().await {
            let chunk = match chunk_res {
                Ok(chunk) => chunk,
                Err(err) => {
                    let _ = fs::remove_file(&tmp_path).await;
                    return Err(StoreError::Io(err));
                }
            };
            size += chunk.len() as u64;
            if size > self.max_file_size {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(StoreError::FileTooLarge {
                    max_bytes: self.max_file_size,
                });
            }
            if let Err(err) = file.write_all(&chunk).await {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(StoreError::Io(err));
            }
        }
        if let Err(err) = file.flush().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io(err));
        }
        if let Err(err) = file.sync_all().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io(err));
        }

        if let Err(err) = fs::rename(&tmp_path, &final_path).await {
            if err.kind() == ErrorKind::AlreadyExists {
                fs::remove_file(&final_path).await?;
                fs::rename(&tmp_path, &final_path).await?;
            } else {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(StoreError::Io(err));
            }
        }

        debug!(filename = %filename, size, "stored uploaded file");

        Ok(StoredFile { filename, size })
    }
}
