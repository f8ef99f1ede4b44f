use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

use darzi_core::traits::*;
use darzi_core::types::{DashboardStats, OrderStatus, Role};
use darzi_core::DarziError;

use crate::auth::{AuthenticatedUser, require_admin};
use crate::error::ApiError;
use crate::state::AppState;

pub async fn dashboard_stats<A, P, C, O, I>(
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
    require_admin(state.account_store.as_ref(), &user).await?;

    let total_users = state.account_store.count_accounts_by_role(Role::User).await?;
    let total_orders = state.order_store.count_orders().await?;
    let total_products = state.catalog_store.count_products().await?;
    // Revenue counts every order, Cancelled included.
    let total_revenue = state.order_store.sum_order_totals().await?;
    let recent_orders = state.order_store.recent_orders(10).await?;

    Ok(Json(json!({
        "status": "success",
        "data": {
            "stats": DashboardStats {
                total_users,
                total_orders,
                total_products,
                total_revenue,
            },
            "recentOrders": recent_orders,
        },
    })))
}

pub async fn list_users<A, P, C, O, I>(
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
    require_admin(state.account_store.as_ref(), &user).await?;

    let users = state.account_store.list_accounts_by_role(Role::User).await?;
    Ok(Json(json!({
        "status": "success",
        "results": users.len(),
        "data": { "users": users },
    })))
}

pub async fn user_details<A, P, C, O, I>(
    State(state): State<AppState<A, P, C, O, I>>,
    user: AuthenticatedUser,
    Path(account_id): Path<String>,
) -> Result<Json<Value>, ApiError>
where
    A: AccountStore,
    P: CatalogStore,
    C: CartStore,
    O: OrderStore,
    I: ImageStore,
{
    require_admin(state.account_store.as_ref(), &user).await?;

    let account = state
        .account_store
        .get_account_by_id(&account_id)
        .await?
        .ok_or(DarziError::AccountNotFound)?;
    let orders = state
        .order_store
        .list_orders_for_account(&account_id)
        .await?;

    Ok(Json(json!({
        "status": "success",
        "data": { "user": account, "orders": orders },
    })))
}

pub async fn delete_user<A, P, C, O, I>(
    State(state): State<AppState<A, P, C, O, I>>,
    user: AuthenticatedUser,
    Path(account_id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    A: AccountStore,
    P: CatalogStore,
    C: CartStore,
    O: OrderStore,
    I: ImageStore,
{
    require_admin(state.account_store.as_ref(), &user).await?;

    state
        .account_store
        .get_account_by_id(&account_id)
        .await?
        .ok_or(DarziError::AccountNotFound)?;

    // Orders go with the account; the cart is left behind. Sequential
    // steps, no cross-store transaction.
    state.order_store.delete_orders_for_account(&account_id).await?;
    state.account_store.delete_account(&account_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn all_orders<A, P, C, O, I>(
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
    require_admin(state.account_store.as_ref(), &user).await?;

    let orders = state.order_store.list_all_orders().await?;
    Ok(Json(json!({
        "status": "success",
        "results": orders.len(),
        "data": { "orders": orders },
    })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

pub async fn update_order_status<A, P, C, O, I>(
    State(state): State<AppState<A, P, C, O, I>>,
    user: AuthenticatedUser,
    Path(order_id): Path<String>,
    Json(body): Json<UpdateOrderStatusRequest>,
) -> Result<Json<Value>, ApiError>
where
    A: AccountStore,
    P: CatalogStore,
    C: CartStore,
    O: OrderStore,
    I: ImageStore,
{
    require_admin(state.account_store.as_ref(), &user).await?;

    // Any value of the enumeration is accepted at any time; there is no
    // transition guard.
    let order = state
        .order_store
        .update_order_status(&order_id, body.status)
        .await?;

    Ok(Json(json!({
        "status": "success",
        "data": { "order": order },
    })))
}
