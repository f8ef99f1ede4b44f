use async_trait::async_trait;

use crate::error::DarziResult;
use crate::types::{NewOrder, Order, OrderStatus, OrderWithUser};

#[async_trait]
pub trait OrderStore: Send + Sync + 'static {
    /// Persists the order and its item snapshots atomically.
    async fn create_order(&self, input: &NewOrder) -> DarziResult<Order>;
    /// Newest first.
    async fn list_orders_for_account(&self, account_id: &str) -> DarziResult<Vec<Order>>;
    /// Newest first, with owning-account name/email/phone joined in.
    async fn list_all_orders(&self) -> DarziResult<Vec<OrderWithUser>>;
    /// The `limit` newest orders with owning-account name/email joined in.
    async fn recent_orders(&self, limit: usize) -> DarziResult<Vec<OrderWithUser>>;
    /// Sets the status field directly; transitions are not guarded.
    async fn update_order_status(&self, id: &str, status: OrderStatus) -> DarziResult<Order>;
    async fn count_orders(&self) -> DarziResult<i64>;
    /// Sum of `total_amount` over every order, regardless of status.
    async fn sum_order_totals(&self) -> DarziResult<i64>;
    async fn delete_orders_for_account(&self, account_id: &str) -> DarziResult<u64>;
    /// Removes the account's orders whose profile tag equals `tag` exactly.
    async fn delete_orders_by_profile_tag(&self, account_id: &str, tag: &str)
    -> DarziResult<u64>;
}
