use axum::Json;
use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::StatusCode;
use bytes::Bytes;
use serde_json::{Value, json};

use darzi_core::traits::*;
use darzi_core::types::{CartItemInput, Customization, ProductSnapshot};
use darzi_core::SELF_PROFILE_ID;

use crate::auth::{AuthenticatedUser, require_account};
use crate::error::ApiError;
use crate::state::AppState;
use crate::uploads;

pub async fn get_cart<A, P, C, O, I>(
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
    let cart = state.cart_store.get_or_create_cart(&account.id).await?;

    Ok(Json(json!({
        "status": "success",
        "data": { "cart": cart },
    })))
}

/// Add a line to the cart. JSON for plain items; multipart form data when a
/// reference image is attached (the `product` and `customization` fields
/// then arrive as JSON strings).
pub async fn add_to_cart<A, P, C, O, I>(
    State(state): State<AppState<A, P, C, O, I>>,
    user: AuthenticatedUser,
    request: Request,
) -> Result<Json<Value>, ApiError>
where
    A: AccountStore,
    P: CatalogStore,
    C: CartStore,
    O: OrderStore,
    I: ImageStore,
{
    let account = require_account(state.account_store.as_ref(), &user).await?;

    let content_type = request
        .headers()
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let (mut input, file) = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;
        parse_multipart_item(multipart).await?
    } else {
        let Json(input) = Json::<CartItemInput>::from_request(request, &())
            .await
            .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;
        (input, None)
    };

    if let Some((filename, data)) = file {
        let url = uploads::store_reference_image(&state, filename.as_deref(), data).await?;
        match input.customization.as_mut() {
            Some(customization) => customization.reference_image = Some(url),
            None => {
                input.customization = Some(Customization {
                    fabric_type: None,
                    color: None,
                    description: None,
                    reference_image: Some(url),
                });
            }
        }
    }

    let cart = state.cart_store.add_item(&account.id, &input).await?;
    Ok(Json(json!({
        "status": "success",
        "message": "Item added to cart",
        "data": { "cart": cart },
    })))
}

pub async fn remove_from_cart<A, P, C, O, I>(
    State(state): State<AppState<A, P, C, O, I>>,
    user: AuthenticatedUser,
    Path(item_id): Path<String>,
) -> Result<Json<Value>, ApiError>
where
    A: AccountStore,
    P: CatalogStore,
    C: CartStore,
    O: OrderStore,
    I: ImageStore,
{
    let account = require_account(state.account_store.as_ref(), &user).await?;

    // Absent carts and unknown item ids are not errors.
    let cart = state.cart_store.remove_item(&account.id, &item_id).await?;
    Ok(Json(json!({
        "status": "success",
        "data": { "cart": cart },
    })))
}

async fn parse_multipart_item(
    mut multipart: Multipart,
) -> Result<(CartItemInput, Option<(Option<String>, Bytes)>), ApiError> {
    let mut product: Option<ProductSnapshot> = None;
    let mut with_fabric = false;
    let mut profile_tag = SELF_PROFILE_ID.to_string();
    let mut quantity: i64 = 1;
    let mut customization: Option<Customization> = None;
    let mut file: Option<(Option<String>, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "product" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;
                product = Some(serde_json::from_str(&text).map_err(|e| {
                    ApiError::new(StatusCode::BAD_REQUEST, format!("Invalid product payload: {e}"))
                })?);
            }
            "withFabric" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;
                with_fabric = text == "true";
            }
            "profileId" => {
                profile_tag = field
                    .text()
                    .await
                    .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;
            }
            "quantity" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;
                quantity = text.parse().unwrap_or(1);
            }
            "customization" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;
                customization = Some(serde_json::from_str(&text).map_err(|e| {
                    ApiError::new(
                        StatusCode::BAD_REQUEST,
                        format!("Invalid customization payload: {e}"),
                    )
                })?);
            }
            "referenceImage" => {
                let filename = field.file_name().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;
                file = Some((filename, data));
            }
            _ => {}
        }
    }

    let product =
        product.ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "Product is required"))?;

    Ok((
        CartItemInput {
            product,
            with_fabric,
            profile_tag,
            quantity,
            customization,
        },
        file,
    ))
}
