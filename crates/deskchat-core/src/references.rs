//! Codec for the attachment reference lists embedded in message metadata.
//!
//! The wire format is a JSON-stringified array stored as a plain string
//! value under the `amsReferences` / `amsMetadata` metadata keys. Decoding
//! is deliberately forgiving: malformed JSON yields "no references" rather
//! than an error, so a bad sender cannot break message delivery.

use std::collections::HashMap;

use crate::constants::{FILE_METADATA_KEY, FILE_REFERENCES_KEY, FILE_REFERENCES_KEY_LEGACY};
use crate::models::UploadedFileMetadata;

/// Encodes a list of file ids into the metadata string value.
pub fn create_file_id_property(file_ids: &[String]) -> Option<String> {
    serde_json::to_string(file_ids).ok()
}

/// Decodes the file-id list from message metadata, if present and well formed.
pub fn file_ids(metadata: &HashMap<String, String>) -> Option<Vec<String>> {
    let raw = metadata.get(FILE_REFERENCES_KEY)?;
    decode_list(raw, FILE_REFERENCES_KEY)
}

/// Encodes the per-file metadata list into the metadata string value.
pub fn create_file_metadata_property(files: &[UploadedFileMetadata]) -> Option<String> {
    serde_json::to_string(files).ok()
}

/// Decodes the per-file metadata list, if present and well formed.
pub fn file_metadata(metadata: &HashMap<String, String>) -> Option<Vec<UploadedFileMetadata>> {
    let raw = metadata.get(FILE_METADATA_KEY)?;
    decode_list(raw, FILE_METADATA_KEY)
}

fn decode_list<T: serde::de::DeserializeOwned>(raw: &str, key: &str) -> Option<Vec<T>> {
    match serde_json::from_str(raw) {
        Ok(list) => Some(list),
        Err(e) => {
            tracing::debug!(key = %key, error = %e, "Ignoring malformed reference metadata");
            None
        }
    }
}

/// Folds the legacy all-lowercase reference key into the canonical casing.
/// When both casings are present the canonical one wins.
pub fn normalize_reference_key(metadata: &mut HashMap<String, String>) {
    if let Some(value) = metadata.remove(FILE_REFERENCES_KEY_LEGACY) {
        metadata
            .entry(FILE_REFERENCES_KEY.to_string())
            .or_insert(value);
    }
}
