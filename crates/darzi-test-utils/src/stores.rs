use tempfile::TempDir;

use darzi_image_fs::FsImageStore;
use darzi_storage_sqlite::{
    SqliteAccountStore, SqliteCartStore, SqliteCatalogStore, SqliteOrderStore,
};

pub struct TestStores {
    pub account_store: SqliteAccountStore,
    pub catalog_store: SqliteCatalogStore,
    pub cart_store: SqliteCartStore,
    pub order_store: SqliteOrderStore,
    pub image_store: FsImageStore,
    pub db_url: String,
    pub uploads_path: String,
    /// Hold the TempDir to keep it alive for the test's duration.
    pub _tempdir: TempDir,
}

/// Create a fresh set of test stores backed by a tempdir.
///
/// All SQLite stores share the same file-backed database; the account store
/// connection runs the migrations. The image store writes to an `uploads/`
/// subdirectory inside the same tempdir.
pub async fn create_test_stores() -> TestStores {
    let tempdir = TempDir::new().expect("failed to create tempdir");
    let db_path = tempdir.path().join("test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let account_store = SqliteAccountStore::connect(&db_url)
        .await
        .expect("failed to connect account store");
    let catalog_store = SqliteCatalogStore::connect(&db_url)
        .await
        .expect("failed to connect catalog store");
    let cart_store = SqliteCartStore::connect(&db_url)
        .await
        .expect("failed to connect cart store");
    let order_store = SqliteOrderStore::connect(&db_url)
        .await
        .expect("failed to connect order store");

    let uploads_path = tempdir.path().join("uploads");
    let uploads_path = uploads_path.to_str().expect("tempdir path not utf-8").to_string();
    let image_store = FsImageStore::new(&uploads_path).expect("failed to create image store");

    TestStores {
        account_store,
        catalog_store,
        cart_store,
        order_store,
        image_store,
        db_url,
        uploads_path,
        _tempdir: tempdir,
    }
}
