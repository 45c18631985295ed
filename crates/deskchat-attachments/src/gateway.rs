//! File transfer gateway: upload and download attachment content through
//! the storage provider.
//!
//! Batches run concurrently and preserve input order. A failure on any
//! single file fails the whole batch; callers see one aggregate error
//! (inherited all-or-nothing semantics, recorded in DESIGN.md).

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::try_join_all;

use deskchat_core::constants::{FILE_METADATA_KEY, FILE_REFERENCES_KEY};
use deskchat_core::models::{
    content_subtype, FileBlob, FileMetadata, UploadRequest, UploadedFileMetadata,
    UploadedFileReference,
};
use deskchat_core::references;
use deskchat_storage::StorageClient;

pub struct FileTransferGateway {
    storage: Arc<dyn StorageClient>,
    container_id: String,
}

impl FileTransferGateway {
    pub fn new(storage: Arc<dyn StorageClient>, container_id: impl Into<String>) -> Self {
        Self {
            storage,
            container_id: container_id.into(),
        }
    }

    /// Uploads every request concurrently. The result vector corresponds to
    /// the input order.
    pub async fn upload_files(
        &self,
        requests: &[UploadRequest],
    ) -> Result<Vec<UploadedFileReference>> {
        try_join_all(requests.iter().map(|request| self.upload_file(request)))
            .await
            .context("Attachment batch upload failed")
    }

    async fn upload_file(&self, request: &UploadRequest) -> Result<UploadedFileReference> {
        let data = self
            .storage
            .fetch_blob(&request.content_url)
            .await
            .with_context(|| format!("Failed to fetch upload source {}", request.content_url))?;

        let blob = FileBlob::new(request.name.clone(), request.content_type.clone(), data);

        let file_id = self
            .storage
            .create_object(&self.container_id, &blob)
            .await
            .context("Failed to register storage object")?;

        self.storage
            .upload_document(&file_id, &blob)
            .await
            .with_context(|| format!("Failed to upload content for object {}", file_id))?;

        tracing::info!(
            file_id = %file_id,
            name = %request.name,
            size = blob.size(),
            "Attachment uploaded"
        );

        Ok(UploadedFileReference {
            file_id,
            metadata: UploadedFileMetadata {
                file_name: request.name.clone(),
                content_type: request.content_type.clone(),
            },
        })
    }

    /// Downloads every referenced file concurrently, in input order.
    pub async fn download_files(
        &self,
        files: &[UploadedFileReference],
    ) -> Result<Vec<FileBlob>> {
        try_join_all(files.iter().map(|file| self.download_file(file)))
            .await
            .context("Attachment batch download failed")
    }

    async fn download_file(&self, file: &UploadedFileReference) -> Result<FileBlob> {
        let metadata = FileMetadata {
            id: file.file_id.clone(),
            file_type: content_subtype(&file.metadata.content_type).to_string(),
            name: file.metadata.file_name.clone(),
            size: 0,
        };

        let status = self
            .storage
            .get_view_status(&metadata)
            .await
            .with_context(|| format!("Failed to query view status for {}", file.file_id))?;

        let data = self
            .storage
            .get_view(&metadata, &status.view_location)
            .await
            .with_context(|| format!("Failed to download content for {}", file.file_id))?;

        Ok(FileBlob::new(
            file.metadata.file_name.clone(),
            file.metadata.content_type.clone(),
            data,
        ))
    }

    /// Reserved extension point; the storage provider has no permission API.
    pub fn update_permissions(&self) -> Result<()> {
        anyhow::bail!("Attachment permission updates are not supported by the storage provider")
    }
}

/// Builds the message-metadata entries a sender embeds alongside the
/// uploaded attachments: the file-id list and the per-file metadata list,
/// both JSON-stringified under their wire keys.
pub fn reference_properties(references: &[UploadedFileReference]) -> HashMap<String, String> {
    let mut properties = HashMap::new();

    let ids: Vec<String> = references.iter().map(|r| r.file_id.clone()).collect();
    if let Some(encoded) = references::create_file_id_property(&ids) {
        properties.insert(FILE_REFERENCES_KEY.to_string(), encoded);
    }

    let metadata: Vec<UploadedFileMetadata> =
        references.iter().map(|r| r.metadata.clone()).collect();
    if let Some(encoded) = references::create_file_metadata_property(&metadata) {
        properties.insert(FILE_METADATA_KEY.to_string(), encoded);
    }

    properties
}
