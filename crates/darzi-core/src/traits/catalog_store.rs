use async_trait::async_trait;

use crate::error::DarziResult;
use crate::types::{NewProduct, Product, ProductFilter, ProductUpdate};

#[async_trait]
pub trait CatalogStore: Send + Sync + 'static {
    async fn create_product(&self, input: &NewProduct) -> DarziResult<Product>;
    async fn get_product(&self, id: &str) -> DarziResult<Option<Product>>;
    async fn list_products(&self, filter: &ProductFilter) -> DarziResult<Vec<Product>>;
    /// Merges the supplied fields; fails with `ProductNotFound` when absent.
    async fn update_product(&self, id: &str, update: &ProductUpdate) -> DarziResult<Product>;
    async fn delete_product(&self, id: &str) -> DarziResult<()>;
    async fn count_products(&self) -> DarziResult<i64>;
}
