use api_scraper::asset_store::{AssetStore, LocalStore};
use bytes::Bytes;

#[tokio::test]
async fn test_local_store_put_creates_parents() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new();
    let path = dir.path().join("photos").join("92c952.jpg");

    store.put(&path, Bytes::from("jpeg bytes")).await.unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), b"jpeg bytes");
}

#[tokio::test]
async fn test_local_store_exists() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new();
    let path = dir.path().join("present.jpg");

    assert!(!store.exists(&path).await.unwrap());

    store.put(&path, Bytes::from("data")).await.unwrap();
    assert!(store.exists(&path).await.unwrap());
}

#[tokio::test]
async fn test_local_store_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new();
    let path = dir.path().join("asset.jpg");

    store.put(&path, Bytes::from("first, longer body")).await.unwrap();
    store.put(&path, Bytes::from("second")).await.unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), b"second");
}

#[tokio::test]
async fn test_local_store_put_into_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new();
    let blocker = dir.path().join("photos");
    std::fs::write(&blocker, "not a directory").unwrap();

    let result = store.put(&blocker.join("a.jpg"), Bytes::from("x")).await;
    assert!(result.is_err());
}
