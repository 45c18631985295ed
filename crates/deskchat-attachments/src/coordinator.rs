//! Scan coordinator: registry of per-file scan state plus the polling sweep
//! that detects terminal scan verdicts and pushes their consequences into
//! already-delivered messages.
//!
//! The registry is owned by the coordinator and mutated only through its
//! methods. Entries are created by whichever side observes a file first —
//! the upload path via [`ScanCoordinator::add_or_update_file`], or the
//! ingress pipeline via `add_next`/`add_activity` on an existing entry —
//! and live for the coordinator's lifetime (one chat session).
//!
//! Shutdown: [`ScanCoordinator::end`] signals the sweep to stop at the next
//! sleep boundary; an in-flight cycle still completes.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tokio::sync::{mpsc, Mutex};
use tokio::time::sleep;

use deskchat_core::config::ScanPollConfig;
use deskchat_core::models::{
    Attachment, ChatMessage, FileMetadata, FileScanRecord, ScanStatus,
};
use deskchat_core::references;
use deskchat_storage::StorageClient;

/// One chat message shared by reference between the pipeline and the
/// coordinator, so terminal transitions mutate the object the consumer
/// already holds.
pub type SharedMessage = Arc<Mutex<ChatMessage>>;

/// Re-injects an updated message into the delivery pipeline.
#[async_trait]
pub trait DeliverMessage: Send + Sync {
    async fn deliver(&self, message: SharedMessage);
}

pub type Continuation = Arc<dyn DeliverMessage>;

/// Adapter turning a plain closure into a [`DeliverMessage`].
pub struct DeliverFn<F>(pub F);

#[async_trait]
impl<F> DeliverMessage for DeliverFn<F>
where
    F: Fn(SharedMessage) + Send + Sync,
{
    async fn deliver(&self, message: SharedMessage) {
        (self.0)(message)
    }
}

/// Registry record tracking one fileId.
#[derive(Clone)]
pub struct FileScanEntry {
    pub file_metadata: FileMetadata,
    pub scan: FileScanRecord,
    /// Continuation registered by the ingress pipeline, once a message
    /// referencing this file has passed through it.
    pub next: Option<Continuation>,
    /// The message containing this file's attachment; shared across all
    /// fileIds of a multi-attachment message.
    pub host_message: Option<SharedMessage>,
}

#[derive(Clone)]
pub struct ScanCoordinator {
    inner: Arc<CoordinatorInner>,
    shutdown_tx: mpsc::Sender<()>,
}

struct CoordinatorInner {
    storage: Arc<dyn StorageClient>,
    registry: Mutex<HashMap<String, FileScanEntry>>,
}

impl ScanCoordinator {
    /// Creates the coordinator and starts its polling sweep immediately.
    pub fn new(storage: Arc<dyn StorageClient>, config: ScanPollConfig) -> Self {
        let inner = Arc::new(CoordinatorInner {
            storage,
            registry: Mutex::new(HashMap::new()),
        });

        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let sweep_inner = Arc::clone(&inner);
        let poll_interval = config.poll_interval();

        tokio::spawn(async move {
            CoordinatorInner::sweep_loop(sweep_inner, shutdown_rx, poll_interval).await;
        });

        Self { inner, shutdown_tx }
    }

    /// Pure lookup, no side effects.
    pub async fn retrieve_file_scan_result(&self, file_id: &str) -> Option<FileScanEntry> {
        let registry = self.inner.registry.lock().await;
        registry.get(file_id).cloned()
    }

    /// Merges `file_metadata` and `scan` into the entry, creating it if
    /// absent. An existing continuation or host message is preserved.
    pub async fn add_or_update_file(
        &self,
        file_id: &str,
        file_metadata: FileMetadata,
        scan: FileScanRecord,
    ) {
        CoordinatorInner::merge_scan(&self.inner, file_id, file_metadata, scan).await;
    }

    /// Attaches a continuation to an existing entry. Dropped with a log line
    /// when no entry exists yet; entry creation belongs to
    /// [`add_or_update_file`](Self::add_or_update_file).
    pub async fn add_next(&self, file_id: &str, next: Continuation) {
        let mut registry = self.inner.registry.lock().await;
        match registry.get_mut(file_id) {
            Some(entry) => entry.next = Some(next),
            None => {
                tracing::debug!(file_id = %file_id, "Dropped continuation for unknown file");
            }
        }
    }

    /// Attaches the host message reference to an existing entry.
    pub async fn add_activity(&self, file_id: &str, message: SharedMessage) {
        let mut registry = self.inner.registry.lock().await;
        match registry.get_mut(file_id) {
            Some(entry) => entry.host_message = Some(message),
            None => {
                tracing::debug!(file_id = %file_id, "Dropped host message for unknown file");
            }
        }
    }

    /// Runs the per-entry scan check for one file right now, outside the
    /// sweep schedule.
    pub async fn check_file(&self, file_id: &str) {
        CoordinatorInner::check_file(&self.inner, file_id).await;
    }

    /// Signals the sweep to stop after its current sleep interval elapses.
    /// Returns immediately; an in-flight cycle still completes.
    pub async fn end(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

impl CoordinatorInner {
    async fn sweep_loop(
        inner: Arc<Self>,
        mut shutdown_rx: mpsc::Receiver<()>,
        poll_interval: std::time::Duration,
    ) {
        tracing::info!(
            poll_interval_ms = poll_interval.as_millis() as u64,
            "Attachment scan sweep started"
        );

        loop {
            Self::sweep(&inner).await;

            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("Attachment scan sweep stopped");
                    break;
                }
                _ = sleep(poll_interval) => {}
            }
        }
    }

    /// Starts one check per in-progress entry. Checks are independent
    /// spawned units and are not joined: a hung provider call stalls only
    /// its own fileId, and may still be in flight when the next cycle
    /// begins.
    async fn sweep(inner: &Arc<Self>) {
        let pending: Vec<String> = {
            let registry = inner.registry.lock().await;
            registry
                .iter()
                .filter(|(_, entry)| entry.scan.status.is_in_progress())
                .map(|(file_id, _)| file_id.clone())
                .collect()
        };

        for file_id in pending {
            let inner = Arc::clone(inner);
            tokio::spawn(async move {
                Self::check_file(&inner, &file_id).await;
            });
        }
    }

    async fn check_file(inner: &Arc<Self>, file_id: &str) {
        let entry = {
            let registry = inner.registry.lock().await;
            registry.get(file_id).cloned()
        };

        let Some(entry) = entry else {
            return;
        };
        if !entry.scan.status.is_in_progress() {
            return;
        }

        let status = match inner.storage.get_view_status(&entry.file_metadata).await {
            Ok(status) => status,
            Err(e) => {
                // No transition this tick; retried on every subsequent sweep.
                tracing::warn!(file_id = %file_id, error = %e, "Scan status query failed");
                return;
            }
        };

        Self::merge_scan(
            inner,
            file_id,
            entry.file_metadata.clone(),
            status.scan.clone(),
        )
        .await;

        match status.scan.status {
            ScanStatus::Passed => {
                if let (Some(next), Some(message)) = (entry.next.clone(), entry.host_message.clone())
                {
                    Self::handle_passed(
                        inner,
                        file_id,
                        &entry.file_metadata,
                        &status.view_location,
                        next,
                        message,
                    )
                    .await;
                }
            }
            ScanStatus::Malware => {
                if let (Some(next), Some(message)) = (entry.next.clone(), entry.host_message.clone())
                {
                    Self::handle_malware(file_id, &entry.file_metadata, next, message).await;
                }
            }
            // Anything else stays in progress for the next sweep.
            _ => {}
        }
    }

    async fn merge_scan(
        inner: &Arc<Self>,
        file_id: &str,
        file_metadata: FileMetadata,
        scan: FileScanRecord,
    ) {
        let mut registry = inner.registry.lock().await;
        match registry.entry(file_id.to_string()) {
            Entry::Occupied(mut slot) => {
                let entry = slot.get_mut();
                entry.file_metadata = file_metadata;
                entry.scan = scan;
            }
            Entry::Vacant(slot) => {
                slot.insert(FileScanEntry {
                    file_metadata,
                    scan,
                    next: None,
                    host_message: None,
                });
            }
        }
    }

    async fn handle_passed(
        inner: &Arc<Self>,
        file_id: &str,
        file_metadata: &FileMetadata,
        view_location: &str,
        next: Continuation,
        message: SharedMessage,
    ) {
        let data = match inner.storage.get_view(file_metadata, view_location).await {
            Ok(data) => data,
            Err(e) => {
                // TODO: the registry already holds "passed" at this point, so
                // the in-progress sweep guard never retries this fetch and
                // the attachment stays pending forever; needs a distinct
                // fetch-pending status.
                tracing::warn!(file_id = %file_id, error = %e, "Content fetch failed after scan passed");
                return;
            }
        };

        let siblings = {
            let mut message = message.lock().await;

            let Some(index) = message
                .attachments
                .iter()
                .position(|a| a.name == file_metadata.name)
            else {
                tracing::warn!(
                    file_id = %file_id,
                    name = %file_metadata.name,
                    "No attachment slot matches scanned file"
                );
                return;
            };

            let content_type = message.attachments[index].content_type.clone();
            let content_url = format!("data:{};base64,{}", content_type, BASE64.encode(&data));
            let thumbnail_url = is_renderable_media(&content_type).then(|| content_url.clone());

            message.attachments[index] = Attachment {
                content_type,
                name: file_metadata.name.clone(),
                content_url: Some(content_url),
                thumbnail_url,
            };

            set_scan_slot(&mut message.channel_data.file_scan, index, ScanStatus::Passed);
            set_size_slot(
                &mut message.channel_data.attachment_sizes,
                index,
                data.len() as u64,
            );

            // Matching past slot zero signals a multi-attachment message:
            // share the mutated message with the sibling fileIds so their own
            // terminal transitions act on a consistent object.
            if index > 0 {
                references::file_ids(&message.channel_data.metadata)
            } else {
                None
            }
        };

        if let Some(sibling_ids) = siblings {
            Self::propagate_host_message(inner, file_id, &sibling_ids, &message).await;
        }

        tracing::info!(file_id = %file_id, "Scan passed; attachment content delivered");
        next.deliver(message).await;
    }

    async fn handle_malware(
        file_id: &str,
        file_metadata: &FileMetadata,
        next: Continuation,
        message: SharedMessage,
    ) {
        {
            let mut message = message.lock().await;

            let Some(index) = message
                .attachments
                .iter()
                .position(|a| a.name == file_metadata.name)
            else {
                tracing::warn!(
                    file_id = %file_id,
                    name = %file_metadata.name,
                    "No attachment slot matches scanned file"
                );
                return;
            };

            // The attachment stays blocked; only the scan record changes.
            set_scan_slot(&mut message.channel_data.file_scan, index, ScanStatus::Malware);
        }

        tracing::warn!(file_id = %file_id, "Scan detected malware; attachment blocked");
        next.deliver(message).await;
    }

    async fn propagate_host_message(
        inner: &Arc<Self>,
        file_id: &str,
        sibling_ids: &[String],
        message: &SharedMessage,
    ) {
        let mut registry = inner.registry.lock().await;
        for sibling_id in sibling_ids {
            if sibling_id == file_id {
                continue;
            }
            if let Some(entry) = registry.get_mut(sibling_id) {
                entry.host_message = Some(Arc::clone(message));
            }
        }
    }
}

fn is_renderable_media(content_type: &str) -> bool {
    content_type.starts_with("image/")
        || content_type.starts_with("video/")
        || content_type.starts_with("audio/")
}

fn set_scan_slot(file_scan: &mut Vec<FileScanRecord>, index: usize, status: ScanStatus) {
    if file_scan.len() <= index {
        file_scan.resize_with(index + 1, FileScanRecord::default);
    }
    file_scan[index] = FileScanRecord { status };
}

fn set_size_slot(sizes: &mut Vec<u64>, index: usize, size: u64) {
    if sizes.len() <= index {
        sizes.resize(index + 1, 0);
    }
    sizes[index] = size;
}
