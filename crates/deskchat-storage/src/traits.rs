//! Storage abstraction trait
//!
//! This module defines the StorageClient trait that all storage backends
//! must implement, together with the error type shared between them.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use deskchat_core::models::{FileBlob, FileMetadata, FileScanRecord};

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Scan/view state of one stored object: where its content can be viewed
/// once the scan allows it, and the current scan record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewStatus {
    pub view_location: String,
    pub scan: FileScanRecord,
}

/// Storage provider contract.
///
/// The provider assigns opaque object ids on `create_object`; all later
/// operations address the object through its [`FileMetadata`] identity.
/// Scanning happens provider-side and asynchronously: `upload_document`
/// returns before any verdict exists, and `get_view_status` is polled until
/// the scan reaches a terminal state.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Fetch arbitrary content by URL (used to pull upload sources).
    async fn fetch_blob(&self, url: &str) -> StorageResult<Bytes>;

    /// Register a new object under `container_id` and return its id.
    async fn create_object(&self, container_id: &str, file: &FileBlob) -> StorageResult<String>;

    /// Upload the object's content. The provider starts scanning on receipt.
    async fn upload_document(&self, file_id: &str, file: &FileBlob) -> StorageResult<()>;

    /// Query the object's view location and current scan record.
    async fn get_view_status(&self, file: &FileMetadata) -> StorageResult<ViewStatus>;

    /// Fetch the object's content from the location a prior
    /// `get_view_status` returned.
    async fn get_view(&self, file: &FileMetadata, location: &str) -> StorageResult<Bytes>;
}
