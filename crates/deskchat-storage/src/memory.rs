//! In-process storage backend.
//!
//! Holds objects and scan verdicts in memory. Used by the engine's test
//! suites and for local development against a fake provider; scan statuses
//! are flipped explicitly through [`MemoryStorageClient::set_scan_status`].

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use deskchat_core::models::{FileBlob, FileMetadata, FileScanRecord, ScanStatus};

use crate::traits::{StorageClient, StorageError, StorageResult, ViewStatus};

#[derive(Debug)]
struct StoredObject {
    name: String,
    content_type: String,
    content: Option<Bytes>,
    scan: ScanStatus,
}

#[derive(Debug, Default)]
struct State {
    objects: HashMap<String, StoredObject>,
    /// Externally fetchable blobs, keyed by URL.
    blobs: HashMap<String, Bytes>,
}

#[derive(Debug, Default)]
pub struct MemoryStorageClient {
    state: Mutex<State>,
}

impl MemoryStorageClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers content fetchable through `fetch_blob`.
    pub fn insert_blob(&self, url: impl Into<String>, data: Bytes) {
        let mut state = self.state.lock().expect("memory storage state poisoned");
        state.blobs.insert(url.into(), data);
    }

    /// Flips an object's scan verdict, as the provider's scanner would.
    pub fn set_scan_status(&self, file_id: &str, status: ScanStatus) {
        let mut state = self.state.lock().expect("memory storage state poisoned");
        if let Some(object) = state.objects.get_mut(file_id) {
            object.scan = status;
        }
    }

    /// Returns the stored content for an object, if uploaded.
    pub fn object_content(&self, file_id: &str) -> Option<Bytes> {
        let state = self.state.lock().expect("memory storage state poisoned");
        state.objects.get(file_id).and_then(|o| o.content.clone())
    }

    fn view_location(file_id: &str) -> String {
        format!("memory://{}/view", file_id)
    }
}

#[async_trait]
impl StorageClient for MemoryStorageClient {
    async fn fetch_blob(&self, url: &str) -> StorageResult<Bytes> {
        let state = self.state.lock().expect("memory storage state poisoned");
        state
            .blobs
            .get(url)
            .cloned()
            .ok_or_else(|| StorageError::FetchFailed(format!("no blob at {}", url)))
    }

    async fn create_object(&self, _container_id: &str, file: &FileBlob) -> StorageResult<String> {
        let id = Uuid::new_v4().to_string();
        let mut state = self.state.lock().expect("memory storage state poisoned");
        state.objects.insert(
            id.clone(),
            StoredObject {
                name: file.name.clone(),
                content_type: file.content_type.clone(),
                content: None,
                scan: ScanStatus::InProgress,
            },
        );
        Ok(id)
    }

    async fn upload_document(&self, file_id: &str, file: &FileBlob) -> StorageResult<()> {
        let mut state = self.state.lock().expect("memory storage state poisoned");
        let object = state
            .objects
            .get_mut(file_id)
            .ok_or_else(|| StorageError::NotFound(file_id.to_string()))?;
        object.content = Some(file.data.clone());
        Ok(())
    }

    async fn get_view_status(&self, file: &FileMetadata) -> StorageResult<ViewStatus> {
        let state = self.state.lock().expect("memory storage state poisoned");
        let object = state
            .objects
            .get(&file.id)
            .ok_or_else(|| StorageError::NotFound(file.id.clone()))?;
        Ok(ViewStatus {
            view_location: Self::view_location(&file.id),
            scan: FileScanRecord {
                status: object.scan.clone(),
            },
        })
    }

    async fn get_view(&self, file: &FileMetadata, location: &str) -> StorageResult<Bytes> {
        let state = self.state.lock().expect("memory storage state poisoned");
        if location != Self::view_location(&file.id) {
            return Err(StorageError::DownloadFailed(format!(
                "unknown view location {}",
                location
            )));
        }
        state
            .objects
            .get(&file.id)
            .and_then(|o| o.content.clone())
            .ok_or_else(|| StorageError::NotFound(file.id.clone()))
    }
}
