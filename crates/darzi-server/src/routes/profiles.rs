use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::{Value, json};

use darzi_core::traits::*;
use darzi_core::types::{Account, NewProfile, Profile, ProfileUpdate, ProfileView, SelfUpdate};
use darzi_core::{DarziError, SELF_PROFILE_ID};

use crate::auth::{AuthenticatedUser, require_account};
use crate::error::ApiError;
use crate::state::AppState;

/// The synthesized `"me"` profile is always present and always first.
fn with_self_first(account: &Account, stored: Vec<Profile>) -> Vec<ProfileView> {
    let mut views = Vec::with_capacity(stored.len() + 1);
    views.push(ProfileView::self_profile(account));
    views.extend(stored.into_iter().map(ProfileView::from));
    views
}

pub async fn list_profiles<A, P, C, O, I>(
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
    let stored = state.account_store.list_profiles(&account.id).await?;

    Ok(Json(json!({
        "status": "success",
        "data": { "profiles": with_self_first(&account, stored) },
    })))
}

pub async fn add_profile<A, P, C, O, I>(
    State(state): State<AppState<A, P, C, O, I>>,
    user: AuthenticatedUser,
    Json(body): Json<NewProfile>,
) -> Result<(StatusCode, Json<Value>), ApiError>
where
    A: AccountStore,
    P: CatalogStore,
    C: CartStore,
    O: OrderStore,
    I: ImageStore,
{
    let account = require_account(state.account_store.as_ref(), &user).await?;
    let profile = state.account_store.add_profile(&account.id, &body).await?;
    let stored = state.account_store.list_profiles(&account.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "data": {
                "profile": ProfileView::from(profile),
                "profiles": with_self_first(&account, stored),
            },
        })),
    ))
}

pub async fn update_profile<A, P, C, O, I>(
    State(state): State<AppState<A, P, C, O, I>>,
    user: AuthenticatedUser,
    Path(profile_id): Path<String>,
    Json(body): Json<ProfileUpdate>,
) -> Result<Json<Value>, ApiError>
where
    A: AccountStore,
    P: CatalogStore,
    C: CartStore,
    O: OrderStore,
    I: ImageStore,
{
    let account = require_account(state.account_store.as_ref(), &user).await?;

    // Updating "me" mutates the account itself, not any stored profile.
    if profile_id == SELF_PROFILE_ID {
        let update = SelfUpdate {
            name: body.name,
            phone: body.phone,
            email: body.email,
            location: body.location,
        };
        let account = state
            .account_store
            .update_account_self(&account.id, &update)
            .await?;
        let stored = state.account_store.list_profiles(&account.id).await?;

        return Ok(Json(json!({
            "status": "success",
            "data": {
                "profile": ProfileView::self_profile(&account),
                "profiles": with_self_first(&account, stored),
            },
        })));
    }

    let profile = state
        .account_store
        .update_profile(&account.id, &profile_id, &body)
        .await?;
    let stored = state.account_store.list_profiles(&account.id).await?;

    Ok(Json(json!({
        "status": "success",
        "data": {
            "profile": ProfileView::from(profile),
            "profiles": with_self_first(&account, stored),
        },
    })))
}

pub async fn delete_profile<A, P, C, O, I>(
    State(state): State<AppState<A, P, C, O, I>>,
    user: AuthenticatedUser,
    Path(profile_id): Path<String>,
) -> Result<Json<Value>, ApiError>
where
    A: AccountStore,
    P: CatalogStore,
    C: CartStore,
    O: OrderStore,
    I: ImageStore,
{
    let account = require_account(state.account_store.as_ref(), &user).await?;

    // "me" is synthesized and cannot be deleted; it is never found here.
    let profile = state
        .account_store
        .get_profile(&account.id, &profile_id)
        .await?
        .ok_or(DarziError::ProfileNotFound)?;

    // Cascade: orders tagged with the profile's display name, then any
    // tagged with the raw id. Order history for this profile is gone for
    // good after this.
    state
        .order_store
        .delete_orders_by_profile_tag(&account.id, &profile.name)
        .await?;
    state
        .order_store
        .delete_orders_by_profile_tag(&account.id, &profile.id)
        .await?;
    state
        .account_store
        .delete_profile(&account.id, &profile.id)
        .await?;

    let stored = state.account_store.list_profiles(&account.id).await?;
    Ok(Json(json!({
        "status": "success",
        "data": { "profiles": with_self_first(&account, stored) },
    })))
}
