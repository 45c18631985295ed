//! Storage provider client for Deskchat attachments.
//!
//! Defines the [`StorageClient`] trait every backend implements, plus two
//! backends: an HTTP client for the real attachment-storage/scanning
//! service, and an in-process backend for tests and local development.
//!
//! The provider contract is small: fetch arbitrary content by URL, register
//! and fill an object, and query/fetch the scanned view of an object.

pub mod http;
pub mod memory;
pub mod traits;

pub use http::HttpStorageClient;
pub use memory::MemoryStorageClient;
pub use traits::{StorageClient, StorageError, StorageResult, ViewStatus};
