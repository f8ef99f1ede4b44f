use std::sync::Arc;

use darzi_core::config::DarziConfig;
use darzi_core::traits::*;

#[derive(Clone)]
pub struct AppState<A, P, C, O, I>
where
    A: AccountStore,
    P: CatalogStore,
    C: CartStore,
    O: OrderStore,
    I: ImageStore,
{
    pub account_store: Arc<A>,
    pub catalog_store: Arc<P>,
    pub cart_store: Arc<C>,
    pub order_store: Arc<O>,
    pub image_store: Arc<I>,
    pub config: Arc<DarziConfig>,
    /// Shared client for external image-host uploads.
    pub http_client: reqwest::Client,
}
