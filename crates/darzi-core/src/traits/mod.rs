pub mod account_store;
pub mod cart_store;
pub mod catalog_store;
pub mod image_store;
pub mod order_store;

pub use account_store::AccountStore;
pub use cart_store::CartStore;
pub use catalog_store::CatalogStore;
pub use image_store::ImageStore;
pub use order_store::OrderStore;
