//! Data models shared across the Deskchat SDK.
//!
//! Each sub-module covers one domain area: the chat message schema exchanged
//! with the pipeline, and the file identities exchanged with the storage
//! provider.

mod file;
mod message;

// Re-export all models for convenient imports
pub use file::*;
pub use message::*;
