//! Attachment transfer and malware-scan coordination engine.
//!
//! Three pieces wired around the storage provider:
//!
//! - [`FileTransferGateway`] uploads and downloads attachment content,
//!   producing the [`UploadedFileReference`](deskchat_core::UploadedFileReference)
//!   values senders embed into outgoing message metadata.
//! - [`ScanCoordinator`] tracks each file's asynchronous scan lifecycle and,
//!   when a verdict arrives, mutates the already-delivered message in place
//!   and re-delivers it through a registered continuation.
//! - [`IngressMiddleware`] sits in the inbound message pipeline, registers
//!   attachment-bearing messages with the coordinator, and always forwards
//!   the message immediately — delivery never waits for a scan.

pub mod coordinator;
pub mod gateway;
pub mod ingress;

pub use coordinator::{
    Continuation, DeliverFn, DeliverMessage, FileScanEntry, ScanCoordinator, SharedMessage,
};
pub use gateway::{reference_properties, FileTransferGateway};
pub use ingress::IngressMiddleware;
