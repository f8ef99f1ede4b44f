use async_trait::async_trait;

use crate::error::DarziResult;
use crate::types::{Cart, CartItemInput};

#[async_trait]
pub trait CartStore: Send + Sync + 'static {
    /// Lazily creates an empty cart on first read; at most one per account.
    async fn get_or_create_cart(&self, account_id: &str) -> DarziResult<Cart>;
    /// Appends a line. Never deduplicates: re-adding the same product and
    /// profile produces a second line.
    async fn add_item(&self, account_id: &str, item: &CartItemInput) -> DarziResult<Cart>;
    /// Removes the line with the given id. Returns `None` when the account
    /// has no cart; a missing item id is not an error.
    async fn remove_item(&self, account_id: &str, item_id: &str) -> DarziResult<Option<Cart>>;
    /// Drops every line whose product id is in `product_ids` AND whose
    /// profile tag equals `profile_tag`. Returns the number removed.
    async fn remove_matching_items(
        &self,
        account_id: &str,
        product_ids: &[String],
        profile_tag: &str,
    ) -> DarziResult<u64>;
}
