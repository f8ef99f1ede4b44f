pub mod assertions;
pub mod server;
pub mod stores;

pub use assertions::{assert_api_fail, assert_api_ok};
pub use server::{
    TEST_JWT_SECRET, TEST_PASSWORD, create_test_app_state, create_test_router,
    create_test_router_and_stores, make_admin, multipart_body, send_request,
    send_request_with_cookie, signup_via_api,
};
pub use stores::{TestStores, create_test_stores};

#[cfg(test)]
mod tests {
    use super::*;
    use darzi_core::CartStore;

    #[tokio::test]
    async fn test_stores_are_usable() {
        let stores = create_test_stores().await;

        let cart = stores.cart_store.get_or_create_cart("acc-1").await.unwrap();
        assert!(cart.items.is_empty());
    }
}
