use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A chat message as seen by the ingress pipeline and the scan coordinator.
///
/// Only the fields the attachment engine reads or mutates are modeled;
/// unknown transport fields are preserved separately by the conversation
/// layer and are not this crate's concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub channel_data: ChannelData,
}

impl ChatMessage {
    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }
}

/// One attachment slot on a message. `content_url` is absent while the
/// file's scan is pending and becomes a data URL once the scan passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub content_type: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

/// Channel-specific side data carried next to the attachments. The
/// `file_scan` and `attachment_sizes` vectors are parallel to `attachments`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelData {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_scan: Vec<FileScanRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachment_sizes: Vec<u64>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

/// Last known scan state for one attachment slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileScanRecord {
    pub status: ScanStatus,
}

impl Default for FileScanRecord {
    fn default() -> Self {
        Self {
            status: ScanStatus::InProgress,
        }
    }
}

/// Malware-scan status reported by the storage provider.
///
/// Provider statuses outside the known set round-trip through `Other` and
/// are treated as still pending by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ScanStatus {
    InProgress,
    Passed,
    Malware,
    Other(String),
}

impl ScanStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ScanStatus::InProgress => "in progress",
            ScanStatus::Passed => "passed",
            ScanStatus::Malware => "malware",
            ScanStatus::Other(s) => s.as_str(),
        }
    }

    /// Passed and malware are terminal: no further polling is meaningful.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanStatus::Passed | ScanStatus::Malware)
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, ScanStatus::InProgress)
    }
}

impl From<String> for ScanStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "in progress" => ScanStatus::InProgress,
            "passed" => ScanStatus::Passed,
            "malware" => ScanStatus::Malware,
            _ => ScanStatus::Other(s),
        }
    }
}

impl From<ScanStatus> for String {
    fn from(status: ScanStatus) -> Self {
        status.as_str().to_string()
    }
}
