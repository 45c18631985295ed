mod helpers;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use bytes::Bytes;

use deskchat_attachments::FileTransferGateway;
use deskchat_core::models::{ScanStatus, UploadRequest, UploadedFileMetadata, UploadedFileReference};
use deskchat_storage::StorageClient;

use helpers::MockStorage;

fn request(url: &str, name: &str, content_type: &str) -> UploadRequest {
    UploadRequest {
        content_url: url.to_string(),
        name: name.to_string(),
        content_type: content_type.to_string(),
    }
}

fn reference(file_id: &str, name: &str, content_type: &str) -> UploadedFileReference {
    UploadedFileReference {
        file_id: file_id.to_string(),
        metadata: UploadedFileMetadata {
            file_name: name.to_string(),
            content_type: content_type.to_string(),
        },
    }
}

#[tokio::test]
async fn upload_batch_preserves_input_order() {
    let storage = MockStorage::new();
    storage.insert_blob("blob:a", Bytes::from_static(b"aaa"));
    storage.insert_blob("blob:b", Bytes::from_static(b"bbbb"));
    let gateway = FileTransferGateway::new(Arc::clone(&storage) as Arc<dyn StorageClient>, "container-1");

    let refs = gateway
        .upload_files(&[
            request("blob:a", "a.png", "image/png"),
            request("blob:b", "b.pdf", "application/pdf"),
        ])
        .await
        .unwrap();

    assert_eq!(refs.len(), 2);
    assert_eq!(refs[0].metadata.file_name, "a.png");
    assert_eq!(refs[1].metadata.file_name, "b.pdf");
    assert_ne!(refs[0].file_id, refs[1].file_id);

    // Exactly one create + upload per request.
    assert_eq!(storage.create_calls.load(Ordering::SeqCst), 2);
    assert_eq!(storage.upload_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn one_failing_upload_fails_the_whole_batch() {
    let storage = MockStorage::new();
    storage.insert_blob("blob:a", Bytes::from_static(b"aaa"));
    // blob:b is missing, so its fetch fails.
    let gateway = FileTransferGateway::new(Arc::clone(&storage) as Arc<dyn StorageClient>, "container-1");

    let result = gateway
        .upload_files(&[
            request("blob:a", "a.png", "image/png"),
            request("blob:b", "b.pdf", "application/pdf"),
        ])
        .await;

    assert!(result.is_err(), "batch must be all-or-nothing");
}

#[tokio::test]
async fn download_wraps_content_as_named_typed_blob() {
    let storage = MockStorage::new();
    storage.set_view_status("obj-1", "loc-1", ScanStatus::Passed);
    storage.set_view("loc-1", Bytes::from_static(b"png-bytes"));
    let gateway = FileTransferGateway::new(Arc::clone(&storage) as Arc<dyn StorageClient>, "container-1");

    let blobs = gateway
        .download_files(&[reference("obj-1", "cat.png", "image/png")])
        .await
        .unwrap();

    assert_eq!(blobs.len(), 1);
    assert_eq!(blobs[0].name, "cat.png");
    assert_eq!(blobs[0].content_type, "image/png");
    assert_eq!(blobs[0].data, Bytes::from_static(b"png-bytes"));

    // The provider is queried with the subtype-derived type tag.
    let queried = storage.last_status_query.lock().unwrap().clone().unwrap();
    assert_eq!(queried.file_type, "png");
    assert_eq!(queried.name, "cat.png");
}

#[tokio::test]
async fn one_failing_download_fails_the_whole_batch() {
    let storage = MockStorage::new();
    storage.set_view_status("obj-1", "loc-1", ScanStatus::Passed);
    storage.set_view("loc-1", Bytes::from_static(b"png-bytes"));
    // obj-2 has no view status programmed.
    let gateway = FileTransferGateway::new(Arc::clone(&storage) as Arc<dyn StorageClient>, "container-1");

    let result = gateway
        .download_files(&[
            reference("obj-1", "cat.png", "image/png"),
            reference("obj-2", "dog.png", "image/png"),
        ])
        .await;

    assert!(result.is_err(), "batch must be all-or-nothing");
}

#[tokio::test]
async fn permission_updates_are_an_explicit_unsupported_capability() {
    let storage = MockStorage::new();
    let gateway = FileTransferGateway::new(storage, "container-1");

    let err = gateway.update_permissions().unwrap_err();
    assert!(err.to_string().contains("not supported"));
}
