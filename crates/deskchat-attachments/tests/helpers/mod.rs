#![allow(dead_code)]

//! Shared fixtures: a programmable storage client with call counters, a
//! counting continuation, and message builders.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Mutex as AsyncMutex;

use deskchat_attachments::{Continuation, DeliverMessage, SharedMessage};
use deskchat_core::models::{
    Attachment, ChatMessage, FileBlob, FileMetadata, FileScanRecord, ScanStatus,
};
use deskchat_storage::{StorageClient, StorageError, StorageResult, ViewStatus};

/// Storage client with programmable responses and per-operation counters.
#[derive(Default)]
pub struct MockStorage {
    blobs: Mutex<HashMap<String, Bytes>>,
    statuses: Mutex<HashMap<String, ViewStatus>>,
    views: Mutex<HashMap<String, Bytes>>,
    pub fetch_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub upload_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub view_calls: AtomicUsize,
    pub last_status_query: Mutex<Option<FileMetadata>>,
}

impl MockStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert_blob(&self, url: &str, data: Bytes) {
        self.blobs.lock().unwrap().insert(url.to_string(), data);
    }

    pub fn set_view_status(&self, file_id: &str, location: &str, status: ScanStatus) {
        self.statuses.lock().unwrap().insert(
            file_id.to_string(),
            ViewStatus {
                view_location: location.to_string(),
                scan: FileScanRecord { status },
            },
        );
    }

    pub fn set_view(&self, location: &str, data: Bytes) {
        self.views.lock().unwrap().insert(location.to_string(), data);
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorageClient for MockStorage {
    async fn fetch_blob(&self, url: &str) -> StorageResult<Bytes> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.blobs
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| StorageError::FetchFailed(format!("no blob at {}", url)))
    }

    async fn create_object(&self, _container_id: &str, _file: &FileBlob) -> StorageResult<String> {
        let n = self.create_calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("obj-{}", n))
    }

    async fn upload_document(&self, _file_id: &str, _file: &FileBlob) -> StorageResult<()> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get_view_status(&self, file: &FileMetadata) -> StorageResult<ViewStatus> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_status_query.lock().unwrap() = Some(file.clone());
        self.statuses
            .lock()
            .unwrap()
            .get(&file.id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(file.id.clone()))
    }

    async fn get_view(&self, file: &FileMetadata, location: &str) -> StorageResult<Bytes> {
        self.view_calls.fetch_add(1, Ordering::SeqCst);
        self.views
            .lock()
            .unwrap()
            .get(location)
            .cloned()
            .ok_or_else(|| StorageError::DownloadFailed(format!("{}: no view", file.id)))
    }
}

/// Continuation that counts deliveries and keeps the last message.
#[derive(Default)]
pub struct CountingContinuation {
    pub calls: AtomicUsize,
    pub last: AsyncMutex<Option<SharedMessage>>,
}

impl CountingContinuation {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeliverMessage for CountingContinuation {
    async fn deliver(&self, message: SharedMessage) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().await = Some(message);
    }
}

/// Coerces the counting continuation into the registered callback type.
pub fn as_continuation(continuation: &Arc<CountingContinuation>) -> Continuation {
    Arc::clone(continuation) as Continuation
}

pub fn file_metadata(id: &str, name: &str) -> FileMetadata {
    FileMetadata {
        id: id.to_string(),
        file_type: "png".to_string(),
        name: name.to_string(),
        size: 9,
    }
}

pub fn in_progress() -> FileScanRecord {
    FileScanRecord {
        status: ScanStatus::InProgress,
    }
}

/// Builds a shared message with the given `(name, content_type)` attachment
/// slots and metadata entries.
pub fn shared_message(
    attachments: &[(&str, &str)],
    metadata: HashMap<String, String>,
) -> SharedMessage {
    let message = ChatMessage {
        id: Some("message-1".to_string()),
        text: None,
        attachments: attachments
            .iter()
            .map(|(name, content_type)| Attachment {
                content_type: content_type.to_string(),
                name: name.to_string(),
                content_url: None,
                thumbnail_url: None,
            })
            .collect(),
        channel_data: deskchat_core::models::ChannelData {
            file_scan: attachments.iter().map(|_| in_progress()).collect(),
            attachment_sizes: attachments.iter().map(|_| 0).collect(),
            metadata,
        },
    };
    Arc::new(AsyncMutex::new(message))
}

pub fn reference_metadata(file_ids: &[&str]) -> HashMap<String, String> {
    let ids: Vec<String> = file_ids.iter().map(|s| s.to_string()).collect();
    let mut metadata = HashMap::new();
    metadata.insert(
        deskchat_core::constants::FILE_REFERENCES_KEY.to_string(),
        serde_json::to_string(&ids).unwrap(),
    );
    metadata
}
