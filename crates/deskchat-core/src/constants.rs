//! Shared constants for message metadata keys and scan polling.

/// Canonical metadata key holding the JSON-encoded list of attachment file ids.
pub const FILE_REFERENCES_KEY: &str = "amsReferences";

/// Legacy all-lowercase casing of [`FILE_REFERENCES_KEY`] still emitted by
/// older senders. Ingress normalizes it to the canonical key.
pub const FILE_REFERENCES_KEY_LEGACY: &str = "amsreferences";

/// Metadata key holding the JSON-encoded list of per-file metadata records.
pub const FILE_METADATA_KEY: &str = "amsMetadata";

/// Default interval between scan-status sweeps, in milliseconds.
pub const DEFAULT_SCAN_POLL_INTERVAL_MS: u64 = 5_000;
