//! Deskchat Core Library
//!
//! This crate provides the domain models, message-metadata reference codec,
//! configuration, and constants shared across all Deskchat components.

pub mod config;
pub mod constants;
pub mod models;
pub mod references;

// Re-export commonly used types
pub use config::{ScanPollConfig, StorageConfig};
pub use models::{
    Attachment, ChannelData, ChatMessage, FileBlob, FileMetadata, FileScanRecord, ScanStatus,
    UploadRequest, UploadedFileMetadata, UploadedFileReference,
};
