//! Ingress pipeline stage.
//!
//! Invoked once per inbound message, ahead of delivery to the consumer.
//! Messages carrying attachment references are registered with the scan
//! coordinator so a later verdict can re-deliver them out-of-band; the
//! message itself is always forwarded on this call, never held back for a
//! scan.

use std::sync::Arc;

use deskchat_core::models::FileScanRecord;
use deskchat_core::references;

use crate::coordinator::{Continuation, ScanCoordinator, SharedMessage};

pub struct IngressMiddleware {
    coordinator: ScanCoordinator,
}

impl IngressMiddleware {
    pub fn new(coordinator: ScanCoordinator) -> Self {
        Self { coordinator }
    }

    pub async fn handle(&self, message: SharedMessage, next: Continuation) {
        let first_id = self.inspect(&message).await;

        if let Some(file_id) = first_id {
            self.coordinator.add_next(&file_id, next.clone()).await;
            self.coordinator
                .add_activity(&file_id, Arc::clone(&message))
                .await;
        }

        next.deliver(message).await;
    }

    /// Normalizes the reference metadata, stamps any known scan state onto
    /// the message, and returns the fileId that should drive registration.
    ///
    /// Only the first fileId in the reference list registers, even for
    /// multi-attachment messages (inherited limitation, see DESIGN.md).
    async fn inspect(&self, message: &SharedMessage) -> Option<String> {
        let mut msg = message.lock().await;
        if !msg.has_attachments() {
            return None;
        }

        references::normalize_reference_key(&mut msg.channel_data.metadata);

        let file_ids = references::file_ids(&msg.channel_data.metadata)?;
        let file_id = file_ids.first()?.clone();

        if let Some(entry) = self.coordinator.retrieve_file_scan_result(&file_id).await {
            // A message re-rendered before the next sweep already shows the
            // last known state.
            stamp_scan_state(&mut msg.channel_data.file_scan, entry.scan);
            tracing::debug!(file_id = %file_id, "Stamped known scan state onto inbound message");
        }

        Some(file_id)
    }
}

fn stamp_scan_state(file_scan: &mut Vec<FileScanRecord>, scan: FileScanRecord) {
    if file_scan.is_empty() {
        file_scan.push(scan);
    } else {
        file_scan[0] = scan;
    }
}
