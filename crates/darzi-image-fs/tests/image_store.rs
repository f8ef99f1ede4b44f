use bytes::Bytes;
use tempfile::TempDir;

use darzi_core::ImageStore;
use darzi_image_fs::FsImageStore;

fn store() -> (FsImageStore, TempDir) {
    let tempdir = TempDir::new().expect("failed to create tempdir");
    let store = FsImageStore::new(tempdir.path().to_str().unwrap()).unwrap();
    (store, tempdir)
}

#[tokio::test]
async fn put_returns_public_path_and_round_trips() {
    let (store, _dir) = store();
    let data = Bytes::from_static(b"fake-jpeg-bytes");

    let path = store
        .put_image("reference-images", "ref-1.jpg", data.clone())
        .await
        .unwrap();
    assert_eq!(path, "/uploads/reference-images/ref-1.jpg");

    let read_back = store
        .get_image("reference-images", "ref-1.jpg")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(read_back, data);
}

#[tokio::test]
async fn missing_image_reads_as_none() {
    let (store, _dir) = store();
    assert!(store.get_image("products", "nope.jpg").await.unwrap().is_none());
}

#[tokio::test]
async fn delete_tolerates_missing_files() {
    let (store, _dir) = store();
    store.delete_image("products", "nope.jpg").await.unwrap();

    store
        .put_image("products", "p.jpg", Bytes::from_static(b"x"))
        .await
        .unwrap();
    store.delete_image("products", "p.jpg").await.unwrap();
    assert!(store.get_image("products", "p.jpg").await.unwrap().is_none());
}

#[tokio::test]
async fn path_components_are_sanitized() {
    let (store, _dir) = store();
    let path = store
        .put_image("reference-images", "../../etc/passwd", Bytes::from_static(b"x"))
        .await
        .unwrap();
    assert!(!path.contains(".."));
}
