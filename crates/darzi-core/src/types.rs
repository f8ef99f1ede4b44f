use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Tailor,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Tailor => "tailor",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            "tailor" => Some(Role::Tailor),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Male" => Some(Gender::Male),
            "Female" => Some(Gender::Female),
            "Other" => Some(Gender::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub gender: Gender,
    pub addresses: Vec<Address>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// City of the first address, used as the self profile's location.
    pub fn location(&self) -> Option<&str> {
        self.addresses.first().and_then(|a| a.city.as_deref())
    }
}

#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub role: Role,
    pub gender: Gender,
}

/// Fields of the account itself that the `"me"` profile path may mutate.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelfUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
}

// ---------------------------------------------------------------------------
// Measurement profiles
// ---------------------------------------------------------------------------

/// Reserved identifier of the synthesized self profile. Stored profiles are
/// always assigned a generated id, so this never collides.
pub const SELF_PROFILE_ID: &str = "me";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub location: Option<String>,
    pub measurements: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProfile {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub measurements: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    pub measurements: Option<String>,
}

/// A profile as listed to clients: stored profiles plus the synthesized
/// `"me"` entry, which mirrors the account's own contact fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    pub measurements: Option<String>,
    pub is_self: bool,
}

impl ProfileView {
    pub fn self_profile(account: &Account) -> Self {
        Self {
            id: SELF_PROFILE_ID.to_string(),
            name: account.name.clone(),
            phone: Some(account.phone.clone()),
            email: Some(account.email.clone()),
            location: account.location().map(str::to_string),
            measurements: None,
            is_self: true,
        }
    }
}

impl From<Profile> for ProfileView {
    fn from(p: Profile) -> Self {
        Self {
            id: p.id,
            name: p.name,
            phone: Some(p.phone),
            email: p.email,
            location: p.location,
            measurements: p.measurements,
            is_self: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductCategory {
    Shirt,
    Pant,
    Trouser,
    Blazer,
    Suit,
    Kurta,
    Sherwani,
    Other,
}

impl ProductCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductCategory::Shirt => "Shirt",
            ProductCategory::Pant => "Pant",
            ProductCategory::Trouser => "Trouser",
            ProductCategory::Blazer => "Blazer",
            ProductCategory::Suit => "Suit",
            ProductCategory::Kurta => "Kurta",
            ProductCategory::Sherwani => "Sherwani",
            ProductCategory::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Shirt" => Some(ProductCategory::Shirt),
            "Pant" => Some(ProductCategory::Pant),
            "Trouser" => Some(ProductCategory::Trouser),
            "Blazer" => Some(ProductCategory::Blazer),
            "Suit" => Some(ProductCategory::Suit),
            "Kurta" => Some(ProductCategory::Kurta),
            "Sherwani" => Some(ProductCategory::Sherwani),
            "Other" => Some(ProductCategory::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductGender {
    Male,
    Female,
    Unisex,
}

impl ProductGender {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductGender::Male => "Male",
            ProductGender::Female => "Female",
            ProductGender::Unisex => "Unisex",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Male" => Some(ProductGender::Male),
            "Female" => Some(ProductGender::Female),
            "Unisex" => Some(ProductGender::Unisex),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: ProductCategory,
    pub gender: ProductGender,
    pub base_price: i64,
    pub fabric_price: i64,
    pub image: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: ProductCategory,
    #[serde(default)]
    pub gender: Option<ProductGender>,
    pub base_price: i64,
    #[serde(default)]
    pub fabric_price: Option<i64>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<ProductCategory>,
    pub gender: Option<ProductGender>,
    pub base_price: Option<i64>,
    pub fabric_price: Option<i64>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<ProductCategory>,
    pub gender: Option<ProductGender>,
}

// ---------------------------------------------------------------------------
// Cart
// ---------------------------------------------------------------------------

/// Product fields denormalized into a cart line at add-time. Not a live
/// reference: later catalog edits do not touch existing cart entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub base_price: Option<i64>,
    #[serde(default)]
    pub fabric_price: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customization {
    #[serde(default)]
    pub fabric_type: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reference_image: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: String,
    pub product: ProductSnapshot,
    pub with_fabric: bool,
    #[serde(rename = "profileId")]
    pub profile_tag: String,
    pub quantity: i64,
    pub customization: Option<Customization>,
}

/// A cart line as submitted by a client; the store assigns the id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemInput {
    pub product: ProductSnapshot,
    #[serde(default, deserialize_with = "bool_or_string")]
    pub with_fabric: bool,
    #[serde(rename = "profileId", default = "default_profile_tag")]
    pub profile_tag: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub customization: Option<Customization>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(rename = "user")]
    pub account_id: String,
    pub items: Vec<CartItem>,
    pub updated_at: DateTime<Utc>,
}

fn default_profile_tag() -> String {
    SELF_PROFILE_ID.to_string()
}

fn default_quantity() -> i64 {
    1
}

/// Multipart clients send the fabric flag as the literal string `"true"`;
/// JSON clients send a real boolean. Accept both.
pub fn bool_or_string<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        Str(String),
    }

    Ok(match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => b,
        BoolOrString::Str(s) => s == "true",
    })
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    #[serde(rename = "Master Assigned")]
    MasterAssigned,
    #[serde(rename = "Measurements Taken")]
    MeasurementsTaken,
    #[serde(rename = "In Stitching")]
    InStitching,
    #[serde(rename = "Trial Ready")]
    TrialReady,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::MasterAssigned => "Master Assigned",
            OrderStatus::MeasurementsTaken => "Measurements Taken",
            OrderStatus::InStitching => "In Stitching",
            OrderStatus::TrialReady => "Trial Ready",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(OrderStatus::Pending),
            "Confirmed" => Some(OrderStatus::Confirmed),
            "Master Assigned" => Some(OrderStatus::MasterAssigned),
            "Measurements Taken" => Some(OrderStatus::MeasurementsTaken),
            "In Stitching" => Some(OrderStatus::InStitching),
            "Trial Ready" => Some(OrderStatus::TrialReady),
            "Delivered" => Some(OrderStatus::Delivered),
            "Cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentAddress {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub date: NaiveDate,
    pub time_slot: String,
    #[serde(default)]
    pub address: Option<AppointmentAddress>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
}

/// An ordered line, snapshotted at booking time. `product` is the opaque
/// product reference string the client submitted; name/image/price are
/// copies, never re-read from the catalog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub quantity: i64,
    pub with_fabric: bool,
    pub price: Option<i64>,
    pub customization: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    #[serde(rename = "user")]
    pub account_id: String,
    #[serde(rename = "profileId")]
    pub profile_tag: String,
    pub items: Vec<OrderItem>,
    pub total_amount: i64,
    pub status: OrderStatus,
    pub appointment: Appointment,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_ref: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub quantity: i64,
    pub with_fabric: bool,
    pub price: Option<i64>,
    pub customization: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub account_id: String,
    pub profile_tag: String,
    pub items: Vec<NewOrderItem>,
    pub total_amount: i64,
    pub status: OrderStatus,
    pub appointment: Appointment,
}

/// Owning-account fields joined into admin order listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBrief {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithUser {
    pub id: String,
    pub user: AccountBrief,
    #[serde(rename = "profileId")]
    pub profile_tag: String,
    pub items: Vec<OrderItem>,
    pub total_amount: i64,
    pub status: OrderStatus,
    pub appointment: Appointment,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub account_id: String,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub replaced_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Active = not revoked and not expired. Revoked tokens are kept around
    /// (not deleted) so replays can be recognized.
    pub fn is_active(&self) -> bool {
        self.revoked_at.is_none() && !self.is_expired()
    }
}

// ---------------------------------------------------------------------------
// Admin rollups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_orders: i64,
    pub total_products: i64,
    pub total_revenue: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn order_status_round_trips_display_strings() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::MasterAssigned,
            OrderStatus::MeasurementsTaken,
            OrderStatus::InStitching,
            OrderStatus::TrialReady,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("Shipped"), None);
    }

    #[test]
    fn order_status_serde_uses_spaced_names() {
        let json = serde_json::to_string(&OrderStatus::MasterAssigned).unwrap();
        assert_eq!(json, "\"Master Assigned\"");
        let back: OrderStatus = serde_json::from_str("\"In Stitching\"").unwrap();
        assert_eq!(back, OrderStatus::InStitching);
    }

    #[test]
    fn fabric_flag_accepts_bool_and_string() {
        let from_bool: CartItemInput =
            serde_json::from_str(r#"{"product":{"id":"p1"},"withFabric":true}"#).unwrap();
        assert!(from_bool.with_fabric);

        let from_string: CartItemInput =
            serde_json::from_str(r#"{"product":{"id":"p1"},"withFabric":"true"}"#).unwrap();
        assert!(from_string.with_fabric);

        let from_false_string: CartItemInput =
            serde_json::from_str(r#"{"product":{"id":"p1"},"withFabric":"false"}"#).unwrap();
        assert!(!from_false_string.with_fabric);
    }

    #[test]
    fn cart_item_input_defaults() {
        let item: CartItemInput = serde_json::from_str(r#"{"product":{"id":"p1"}}"#).unwrap();
        assert!(!item.with_fabric);
        assert_eq!(item.profile_tag, SELF_PROFILE_ID);
        assert_eq!(item.quantity, 1);
        assert!(item.customization.is_none());
    }

    #[test]
    fn refresh_token_active_states() {
        let now = Utc::now();
        let mut record = RefreshTokenRecord {
            token: "t".to_string(),
            account_id: "a".to_string(),
            expires_at: now + Duration::days(7),
            revoked_at: None,
            replaced_by: None,
            created_at: now,
        };
        assert!(record.is_active());

        record.revoked_at = Some(now);
        assert!(!record.is_active());

        record.revoked_at = None;
        record.expires_at = now - Duration::seconds(1);
        assert!(record.is_expired());
        assert!(!record.is_active());
    }

    #[test]
    fn self_profile_mirrors_account_fields() {
        let account = Account {
            id: "acc-1".to_string(),
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9999900000".to_string(),
            password_hash: "$argon2id$...".to_string(),
            role: Role::User,
            gender: Gender::Female,
            addresses: vec![Address {
                city: Some("Pune".to_string()),
                ..Address::default()
            }],
            created_at: Utc::now(),
        };

        let me = ProfileView::self_profile(&account);
        assert_eq!(me.id, SELF_PROFILE_ID);
        assert_eq!(me.name, "Asha");
        assert_eq!(me.location.as_deref(), Some("Pune"));
        assert!(me.is_self);
    }

    #[test]
    fn account_serialization_omits_password_hash() {
        let account = Account {
            id: "acc-1".to_string(),
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9999900000".to_string(),
            password_hash: "secret-hash".to_string(),
            role: Role::User,
            gender: Gender::Female,
            addresses: Vec::new(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&account).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "user");
    }
}
