//! File backend behavior: persistence, recovery, and the on-disk format.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use shortener::errors::ShortenerError;
use shortener::storages::{FileStorage, UrlStorage};

fn storage_path(dir: &TempDir) -> PathBuf {
    dir.path().join("urls.json")
}

#[tokio::test]
async fn store_and_get_round_trip() {
    let dir = TempDir::new().unwrap();
    let storage = FileStorage::new(storage_path(&dir));

    storage
        .store("abc123", "https://example.com", "u-1")
        .await
        .unwrap();
    assert_eq!(storage.get("abc123").await.unwrap(), "https://example.com");
}

#[tokio::test]
async fn data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = storage_path(&dir);

    let storage = FileStorage::new(&path);
    storage
        .store("abc123", "https://example.com", "u-1")
        .await
        .unwrap();
    storage.close().await.unwrap();

    let reopened = FileStorage::new(&path);
    assert_eq!(
        reopened.get("abc123").await.unwrap(),
        "https://example.com"
    );
}

#[tokio::test]
async fn missing_file_starts_empty() {
    let dir = TempDir::new().unwrap();
    let storage = FileStorage::new(storage_path(&dir));

    let err = storage.get("abc123").await.unwrap_err();
    assert!(matches!(err, ShortenerError::NotFound(_)));
}

#[tokio::test]
async fn corrupt_file_starts_empty_and_recovers() {
    let dir = TempDir::new().unwrap();
    let path = storage_path(&dir);
    fs::write(&path, "this is not json").unwrap();

    let storage = FileStorage::new(&path);
    assert!(matches!(
        storage.get("abc123").await.unwrap_err(),
        ShortenerError::NotFound(_)
    ));

    // The store is writable again after the bad file is overwritten.
    storage
        .store("abc123", "https://example.com", "u-1")
        .await
        .unwrap();
    let reopened = FileStorage::new(&path);
    assert_eq!(
        reopened.get("abc123").await.unwrap(),
        "https://example.com"
    );
}

#[tokio::test]
async fn on_disk_format_uses_expected_field_names() {
    let dir = TempDir::new().unwrap();
    let path = storage_path(&dir);

    let storage = FileStorage::new(&path);
    storage
        .store("abc123", "https://example.com", "u-1")
        .await
        .unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let records: serde_json::Value = serde_json::from_str(&content).unwrap();
    let record = &records.as_array().unwrap()[0];

    assert!(record.get("uuid").is_some());
    assert_eq!(record["short_url"], "abc123");
    assert_eq!(record["original_url"], "https://example.com");
}

#[tokio::test]
async fn list_and_delete_are_inert() {
    let dir = TempDir::new().unwrap();
    let storage = FileStorage::new(storage_path(&dir));

    storage
        .store("abc123", "https://keep.com", "u-1")
        .await
        .unwrap();

    assert!(matches!(
        storage.list_by_owner("u-1").await.unwrap_err(),
        ShortenerError::NotImplemented(_)
    ));

    storage.delete_batch("u-1", vec!["abc123".to_string()]);
    assert_eq!(storage.get("abc123").await.unwrap(), "https://keep.com");
}
