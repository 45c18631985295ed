//! HTTP storage backend.
//!
//! Talks to the attachment-storage/scanning service over its REST surface
//! with optional bearer auth. Non-success responses are mapped into
//! [`StorageError`] with the provider's error text preserved.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;

use deskchat_core::config::StorageConfig;
use deskchat_core::models::{FileBlob, FileMetadata};

use crate::traits::{StorageClient, StorageError, StorageResult, ViewStatus};

const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Clone, Debug)]
pub struct HttpStorageClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateObjectResponse {
    id: String,
}

impl HttpStorageClient {
    pub fn new(config: &StorageConfig) -> StorageResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(StorageError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Resolves a view location: the provider may hand back an absolute URL
    /// or a path relative to its own base.
    fn resolve_location(&self, location: &str) -> String {
        if location.starts_with("http://") || location.starts_with("https://") {
            location.to_string()
        } else {
            self.build_url(location)
        }
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    async fn check_status(
        response: reqwest::Response,
        what: &str,
    ) -> StorageResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        if status == reqwest::StatusCode::NOT_FOUND {
            Err(StorageError::NotFound(format!("{}: {}", what, error_text)))
        } else {
            Err(StorageError::Backend(format!(
                "{} failed with status {}: {}",
                what, status, error_text
            )))
        }
    }
}

#[async_trait]
impl StorageClient for HttpStorageClient {
    async fn fetch_blob(&self, url: &str) -> StorageResult<Bytes> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| StorageError::FetchFailed(e.to_string()))?;
        let response = Self::check_status(response, "blob fetch").await?;
        response
            .bytes()
            .await
            .map_err(|e| StorageError::FetchFailed(e.to_string()))
    }

    async fn create_object(&self, container_id: &str, file: &FileBlob) -> StorageResult<String> {
        let url = self.build_url("/objects");
        let body = json!({
            "containerId": container_id,
            "name": file.name,
            "contentType": file.content_type,
        });

        let request = self.apply_auth(self.client.post(&url)).json(&body);
        let response = request
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
        let response = Self::check_status(response, "object creation").await?;

        let created: CreateObjectResponse = response
            .json()
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        tracing::debug!(file_id = %created.id, name = %file.name, "Storage object created");
        Ok(created.id)
    }

    async fn upload_document(&self, file_id: &str, file: &FileBlob) -> StorageResult<()> {
        let url = self.build_url(&format!("/objects/{}/content", file_id));
        let request = self
            .apply_auth(self.client.put(&url))
            .header("Content-Type", file.content_type.clone())
            .body(file.data.clone());

        let response = request
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
        Self::check_status(response, "document upload").await?;

        tracing::debug!(file_id = %file_id, size = file.size(), "Document uploaded");
        Ok(())
    }

    async fn get_view_status(&self, file: &FileMetadata) -> StorageResult<ViewStatus> {
        let url = self.build_url(&format!("/objects/{}/view/status", file.id));
        let response = self
            .apply_auth(self.client.get(&url))
            .send()
            .await
            .map_err(StorageError::Http)?;
        let response = Self::check_status(response, "view status query").await?;

        response
            .json::<ViewStatus>()
            .await
            .map_err(|e| StorageError::Backend(format!("Malformed view status: {}", e)))
    }

    async fn get_view(&self, file: &FileMetadata, location: &str) -> StorageResult<Bytes> {
        let url = self.resolve_location(location);
        let response = self
            .apply_auth(self.client.get(&url))
            .send()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;
        let response = Self::check_status(response, "view download").await?;

        let data = response
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        tracing::debug!(file_id = %file.id, size = data.len(), "View content fetched");
        Ok(data)
    }
}
