pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::DarziConfig;
pub use error::{DarziError, DarziResult};
pub use traits::{AccountStore, CartStore, CatalogStore, ImageStore, OrderStore};
pub use types::{
    Account, AccountBrief, Address, Appointment, AppointmentAddress, Cart, CartItem, SELF_PROFILE_ID,
    CartItemInput, CreateAccountInput, Customization, DashboardStats, Gender, NewOrder,
    NewOrderItem, NewProduct, NewProfile, Order, OrderItem, OrderStatus, OrderWithUser, Product,
    ProductCategory, ProductFilter, ProductGender, ProductSnapshot, ProductUpdate, Profile,
    ProfileUpdate, ProfileView, RefreshTokenRecord, Role, SelfUpdate,
};
