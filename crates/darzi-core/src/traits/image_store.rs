use async_trait::async_trait;
use bytes::Bytes;

use crate::error::DarziResult;

/// Local image storage backing the `/uploads` static route. Returns the
/// public path (`/uploads/<folder>/<name>`) for stored files.
#[async_trait]
pub trait ImageStore: Send + Sync + 'static {
    async fn put_image(&self, folder: &str, name: &str, data: Bytes) -> DarziResult<String>;
    async fn get_image(&self, folder: &str, name: &str) -> DarziResult<Option<Bytes>>;
    async fn delete_image(&self, folder: &str, name: &str) -> DarziResult<()>;
}
