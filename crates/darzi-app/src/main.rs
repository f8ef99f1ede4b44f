use std::sync::Arc;
use std::time::Duration;

use darzi_core::AccountStore;
use darzi_core::config::DarziConfig;
use darzi_image_fs::FsImageStore;
use darzi_server::{AppState, build_router};
use darzi_storage_sqlite::{
    SqliteAccountStore, SqliteCartStore, SqliteCatalogStore, SqliteOrderStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().pretty().init();

    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/darzi.toml".to_string());
    let config = DarziConfig::load(&config_path)?;

    // Ensure the data directory exists
    std::fs::create_dir_all("data")?;

    let account_store = SqliteAccountStore::connect(&config.database.url).await?;
    let catalog_store = SqliteCatalogStore::connect(&config.database.url).await?;
    let cart_store = SqliteCartStore::connect(&config.database.url).await?;
    let order_store = SqliteOrderStore::connect(&config.database.url).await?;
    let image_store = FsImageStore::new(&config.uploads.path)?;

    let addr = format!("0.0.0.0:{}", config.port);

    let state = AppState {
        account_store: Arc::new(account_store),
        catalog_store: Arc::new(catalog_store),
        cart_store: Arc::new(cart_store),
        order_store: Arc::new(order_store),
        image_store: Arc::new(image_store),
        config: Arc::new(config),
        http_client: reqwest::Client::new(),
    };

    // Retention sweep: revoked and stale refresh tokens are kept for a full
    // token lifetime (for replay detection), then dropped.
    tokio::spawn(purge_refresh_tokens(state.account_store.clone()));

    let router = build_router(state);

    tracing::info!("darzi listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

async fn purge_refresh_tokens(store: Arc<SqliteAccountStore>) {
    let mut interval = tokio::time::interval(Duration::from_secs(60 * 60));
    loop {
        interval.tick().await;
        let cutoff =
            chrono::Utc::now() - chrono::Duration::days(darzi_crypto::REFRESH_TOKEN_TTL_DAYS);
        match store.purge_refresh_tokens_created_before(cutoff).await {
            Ok(0) => {}
            Ok(purged) => tracing::info!("purged {purged} expired refresh tokens"),
            Err(e) => tracing::warn!("refresh token purge failed: {e}"),
        }
    }
}
