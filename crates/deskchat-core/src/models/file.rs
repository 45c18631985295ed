use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Identity of a stored file as the storage provider tracks it. Used to
/// query scan status and to locate the matching attachment slot by `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub id: String,
    /// Type tag derived from the content-type subtype (e.g. "png").
    #[serde(rename = "type")]
    pub file_type: String,
    pub name: String,
    pub size: u64,
}

/// One file the caller wants uploaded: where to fetch its content from,
/// and what to call it.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub content_url: String,
    pub name: String,
    pub content_type: String,
}

/// Result of a successful upload, embedded into outgoing message metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFileReference {
    pub file_id: String,
    pub metadata: UploadedFileMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFileMetadata {
    pub file_name: String,
    pub content_type: String,
}

/// A named, typed byte payload — the in-memory form of an attachment's
/// content on both the upload and download paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlob {
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl FileBlob {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Derives the type tag from a content type's subtype: `"image/png"` → `"png"`.
/// Falls back to the whole string when there is no slash.
pub fn content_subtype(content_type: &str) -> &str {
    content_type
        .split_once('/')
        .map(|(_, subtype)| subtype)
        .unwrap_or(content_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtype_derivation() {
        assert_eq!(content_subtype("image/png"), "png");
        assert_eq!(content_subtype("application/pdf"), "pdf");
        assert_eq!(content_subtype("weird"), "weird");
    }

    #[test]
    fn file_metadata_uses_type_key_on_the_wire() {
        let meta = FileMetadata {
            id: "file-1".to_string(),
            file_type: "png".to_string(),
            name: "cat.png".to_string(),
            size: 42,
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["type"], "png");
    }
}
