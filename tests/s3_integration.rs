//! Integration tests for the storage client using MinIO via testcontainers
//!
//! These tests require Docker to be running and use the testcontainers crate
//! to spin up a MinIO instance for realistic S3 testing.
//!
//! Run with: cargo test --test s3_integration
//!
//! Note: Tests are conditionally skipped if Docker is not available.

use std::time::Duration;

use aws_sdk_s3::primitives::ByteStream;
use s3_console::s3::{
    stream_object, ClientConfig, Severity, StaticCredentials, StorageClient,
};
use testcontainers::{runners::AsyncRunner, ContainerAsync, ImageExt};
use testcontainers_modules::minio::MinIO;

/// MinIO default credentials
const MINIO_ACCESS_KEY: &str = "minioadmin";
const MINIO_SECRET_KEY: &str = "minioadmin";

/// Test helper to check if Docker is available
fn docker_available() -> bool {
    std::process::Command::new("docker")
        .arg("info")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Start MinIO and return the container (kept alive by the caller) plus a client
async fn start_minio() -> (ContainerAsync<MinIO>, StorageClient) {
    let container = MinIO::default()
        .with_env_var("MINIO_ROOT_USER", MINIO_ACCESS_KEY)
        .with_env_var("MINIO_ROOT_PASSWORD", MINIO_SECRET_KEY)
        .start()
        .await
        .expect("Failed to start MinIO container");

    let host = container.get_host().await.expect("Failed to get container host");
    let port = container
        .get_host_port_ipv4(9000)
        .await
        .expect("Failed to get MinIO port");

    // Wait for MinIO to be ready
    tokio::time::sleep(Duration::from_secs(2)).await;

    let config = ClientConfig {
        endpoint_url: Some(format!("http://{}:{}", host, port)),
        credentials: Some(StaticCredentials {
            access_key_id: MINIO_ACCESS_KEY.to_string(),
            secret_access_key: MINIO_SECRET_KEY.to_string(),
        }),
        force_path_style: true,
        ..Default::default()
    };
    let client = StorageClient::new(&config)
        .await
        .expect("Failed to create MinIO client");

    (container, client)
}

/// Upload through the raw SDK client; uploads are not part of the core
async fn upload(client: &StorageClient, bucket: &str, key: &str, data: &[u8]) {
    client
        .sdk_client()
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(data.to_vec()))
        .send()
        .await
        .expect("Failed to put object");
}

#[tokio::test]
async fn test_create_then_list_then_create_again() {
    if !docker_available() {
        eprintln!("Skipping test: Docker not available");
        return;
    }
    let (_container, client) = start_minio().await;

    client
        .create_bucket("fresh-bucket")
        .await
        .expect("Failed to create bucket");

    let buckets = client.list_buckets().await.expect("Failed to list buckets");
    assert!(buckets.iter().any(|b| b.name == "fresh-bucket"));
    assert!(buckets.iter().all(|b| b.creation_date.is_some()));

    let failure = client.create_bucket("fresh-bucket").await.unwrap_err();
    assert_eq!(failure.severity, Severity::Danger);
    assert!(
        failure.has_code("BucketAlreadyOwnedByYou") || failure.has_code("BucketAlreadyExists"),
        "unexpected failure: {:?}",
        failure
    );
}

#[tokio::test]
async fn test_invalid_bucket_name_fails() {
    if !docker_available() {
        eprintln!("Skipping test: Docker not available");
        return;
    }
    let (_container, client) = start_minio().await;

    let failure = client.create_bucket("Invalid_Name!").await.unwrap_err();
    assert_eq!(failure.severity, Severity::Danger);
    assert!(!failure.message.is_empty());
}

#[tokio::test]
async fn test_empty_bucket_lists_no_objects() {
    if !docker_available() {
        eprintln!("Skipping test: Docker not available");
        return;
    }
    let (_container, client) = start_minio().await;

    client.create_bucket("empty-bucket").await.unwrap();

    let objects = client
        .list_objects("empty-bucket")
        .await
        .expect("Empty bucket should list successfully");
    assert!(objects.is_empty());
}

#[tokio::test]
async fn test_missing_bucket_is_not_found() {
    if !docker_available() {
        eprintln!("Skipping test: Docker not available");
        return;
    }
    let (_container, client) = start_minio().await;

    let failure = client.list_objects("no-such-bucket").await.unwrap_err();
    assert!(failure.has_code("NoSuchBucket"), "{:?}", failure);

    let failure = client.delete_bucket("no-such-bucket").await.unwrap_err();
    assert!(failure.has_code("NoSuchBucket"), "{:?}", failure);

    let failure = client
        .get_object("no-such-bucket", "any-key")
        .await
        .unwrap_err();
    assert!(failure.has_code("NoSuchBucket"), "{:?}", failure);
}

#[tokio::test]
async fn test_missing_key_fails() {
    if !docker_available() {
        eprintln!("Skipping test: Docker not available");
        return;
    }
    let (_container, client) = start_minio().await;

    client.create_bucket("keys").await.unwrap();

    let failure = stream_object(&client, "keys", "missing.txt").await.unwrap_err();
    assert!(failure.has_code("NoSuchKey"), "{:?}", failure);
    assert_eq!(failure.severity, Severity::Danger);
}

#[tokio::test]
async fn test_download_round_trip() {
    if !docker_available() {
        eprintln!("Skipping test: Docker not available");
        return;
    }
    let (_container, client) = start_minio().await;

    client.create_bucket("data-bucket").await.unwrap();
    let content: Vec<u8> = (0..=255u8).cycle().take(3 * 1024 * 1024 + 17).collect();
    upload(&client, "data-bucket", "nested/dir/blob.bin", &content).await;

    let download = stream_object(&client, "data-bucket", "nested/dir/blob.bin")
        .await
        .expect("Failed to open download");
    assert_eq!(download.filename, "nested/dir/blob.bin");
    assert_eq!(download.content_length, Some(content.len() as u64));

    let downloaded = download.into_bytes().await.unwrap();
    assert_eq!(&downloaded[..], &content[..]);
}

#[tokio::test]
async fn test_list_objects_returns_summaries() {
    if !docker_available() {
        eprintln!("Skipping test: Docker not available");
        return;
    }
    let (_container, client) = start_minio().await;

    client.create_bucket("files-bucket").await.unwrap();
    upload(&client, "files-bucket", "docs/readme.md", b"# Readme").await;
    upload(&client, "files-bucket", "root.txt", b"root file").await;

    let objects = client.list_objects("files-bucket").await.unwrap();
    let keys: Vec<&str> = objects.iter().map(|o| o.key.as_str()).collect();
    assert_eq!(keys, vec!["docs/readme.md", "root.txt"]);

    let root = objects.iter().find(|o| o.key == "root.txt").unwrap();
    assert_eq!(root.size, 9);
    assert!(root.last_modified.is_some());
    assert!(root.etag.is_some());
}

#[tokio::test]
async fn test_delete_bucket_lifecycle() {
    if !docker_available() {
        eprintln!("Skipping test: Docker not available");
        return;
    }
    let (_container, client) = start_minio().await;

    client.create_bucket("full-bucket").await.unwrap();
    upload(&client, "full-bucket", "keep.txt", b"still here").await;

    let failure = client.delete_bucket("full-bucket").await.unwrap_err();
    assert!(failure.has_code("BucketNotEmpty"), "{:?}", failure);

    client.create_bucket("short-lived").await.unwrap();
    client
        .delete_bucket("short-lived")
        .await
        .expect("Failed to delete empty bucket");

    let names: Vec<String> = client
        .list_buckets()
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.name)
        .collect();
    assert!(!names.contains(&"short-lived".to_string()));
    assert!(names.contains(&"full-bucket".to_string()));

    let failure = client.delete_bucket("short-lived").await.unwrap_err();
    assert!(failure.has_code("NoSuchBucket"), "{:?}", failure);
}

#[tokio::test]
async fn test_shared_client_concurrent_calls() {
    if !docker_available() {
        eprintln!("Skipping test: Docker not available");
        return;
    }
    let (_container, client) = start_minio().await;

    let mut tasks = Vec::new();
    for i in 0..8 {
        let client = client.clone();
        tasks.push(tokio::spawn(async move {
            client.create_bucket(&format!("concurrent-{}", i)).await
        }));
    }
    for task in tasks {
        task.await.unwrap().expect("Concurrent create failed");
    }

    let buckets = client.list_buckets().await.unwrap();
    assert_eq!(
        buckets
            .iter()
            .filter(|b| b.name.starts_with("concurrent-"))
            .count(),
        8
    );
}
