use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

use darzi_core::traits::*;
use darzi_core::types::{Appointment, NewOrder, NewOrderItem, OrderStatus};
use darzi_core::{DarziError, SELF_PROFILE_ID};

use crate::auth::{AuthenticatedUser, require_account};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
    pub total_amount: i64,
    pub appointment: Appointment,
    #[serde(rename = "profileId", default = "default_profile_tag")]
    pub profile_tag: String,
}

/// An ordered line as clients submit it. `product` is deliberately loose:
/// a plain id string, a numeric id, or an embedded snapshot object all occur
/// in the wild.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product: Value,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub with_fabric: Option<bool>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub customization: Option<Value>,
}

fn default_profile_tag() -> String {
    SELF_PROFILE_ID.to_string()
}

pub async fn create_order<A, P, C, O, I>(
    State(state): State<AppState<A, P, C, O, I>>,
    user: AuthenticatedUser,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError>
where
    A: AccountStore,
    P: CatalogStore,
    C: CartStore,
    O: OrderStore,
    I: ImageStore,
{
    let account = require_account(state.account_store.as_ref(), &user).await?;

    if body.items.is_empty() {
        return Err(DarziError::EmptyOrder.into());
    }

    let items: Vec<NewOrderItem> = body.items.iter().map(new_order_item).collect();
    let order = state
        .order_store
        .create_order(&NewOrder {
            account_id: account.id.clone(),
            profile_tag: body.profile_tag.clone(),
            items,
            total_amount: body.total_amount,
            // A booking always starts at Pending, whatever the client sent.
            status: OrderStatus::Pending,
            appointment: body.appointment.clone(),
        })
        .await?;

    // Reconciliation: the ordered (product, profile) pairs leave the cart.
    // Sequential with the insert above; there is no cross-store transaction.
    let ordered_ids: Vec<String> = body
        .items
        .iter()
        .filter_map(|item| product_ref_id(&item.product))
        .collect();
    state
        .cart_store
        .remove_matching_items(&account.id, &ordered_ids, &body.profile_tag)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "data": { "order": order },
        })),
    ))
}

pub async fn my_orders<A, P, C, O, I>(
    State(state): State<AppState<A, P, C, O, I>>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, ApiError>
where
    A: AccountStore,
    P: CatalogStore,
    C: CartStore,
    O: OrderStore,
    I: ImageStore,
{
    let account = require_account(state.account_store.as_ref(), &user).await?;
    let orders = state
        .order_store
        .list_orders_for_account(&account.id)
        .await?;

    Ok(Json(json!({
        "status": "success",
        "results": orders.len(),
        "data": { "orders": orders },
    })))
}

/// Snapshot one submitted line: prefer the embedded product snapshot's
/// name/image, fall back to the item-level fields.
fn new_order_item(item: &OrderItemRequest) -> NewOrderItem {
    NewOrderItem {
        product_ref: product_ref_id(&item.product)
            .unwrap_or_else(|| item.product.to_string()),
        name: product_string_field(&item.product, "name").or_else(|| item.name.clone()),
        image: product_string_field(&item.product, "image").or_else(|| item.image.clone()),
        quantity: item.quantity.unwrap_or(1),
        with_fabric: item.with_fabric.unwrap_or(false),
        price: item.price,
        customization: item
            .customization
            .as_ref()
            .filter(|v| !v.is_null())
            .map(customization_text),
    }
}

/// Extract the product identifier from the loose `product` value, as a
/// string. Object snapshots are matched through their `id` field.
fn product_ref_id(product: &Value) -> Option<String> {
    match product {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => match map.get("id") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        },
        _ => None,
    }
}

fn product_string_field(product: &Value, key: &str) -> Option<String> {
    product.as_object()?.get(key)?.as_str().map(str::to_string)
}

fn customization_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
