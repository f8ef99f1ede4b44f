use axum::Json;
use axum::extract::{FromRequest, Multipart, Path, Query, Request, State};
use axum::http::StatusCode;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::{Value, json};

use darzi_core::traits::*;
use darzi_core::types::{
    NewProduct, ProductCategory, ProductFilter, ProductGender, ProductUpdate,
};
use darzi_core::DarziError;

use crate::auth::{AuthenticatedUser, require_admin};
use crate::error::ApiError;
use crate::state::AppState;
use crate::uploads;

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
}

pub async fn list_products<A, P, C, O, I>(
    State(state): State<AppState<A, P, C, O, I>>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Value>, ApiError>
where
    A: AccountStore,
    P: CatalogStore,
    C: CartStore,
    O: OrderStore,
    I: ImageStore,
{
    let mut filter = ProductFilter::default();

    // Unknown filter values match nothing, the way a raw document query
    // would.
    if let Some(category) = query.category.as_deref() {
        match ProductCategory::parse(category) {
            Some(parsed) => filter.category = Some(parsed),
            None => return Ok(empty_listing()),
        }
    }
    if let Some(gender) = query.gender.as_deref() {
        match ProductGender::parse(gender) {
            Some(parsed) => filter.gender = Some(parsed),
            None => return Ok(empty_listing()),
        }
    }

    let products = state.catalog_store.list_products(&filter).await?;
    Ok(Json(json!({
        "status": "success",
        "results": products.len(),
        "data": { "products": products },
    })))
}

fn empty_listing() -> Json<Value> {
    Json(json!({
        "status": "success",
        "results": 0,
        "data": { "products": [] },
    }))
}

pub async fn get_product<A, P, C, O, I>(
    State(state): State<AppState<A, P, C, O, I>>,
    Path(product_id): Path<String>,
) -> Result<Json<Value>, ApiError>
where
    A: AccountStore,
    P: CatalogStore,
    C: CartStore,
    O: OrderStore,
    I: ImageStore,
{
    let product = state
        .catalog_store
        .get_product(&product_id)
        .await?
        .ok_or(DarziError::ProductNotFound)?;

    Ok(Json(json!({
        "status": "success",
        "data": { "product": product },
    })))
}

pub async fn create_product<A, P, C, O, I>(
    State(state): State<AppState<A, P, C, O, I>>,
    user: AuthenticatedUser,
    request: Request,
) -> Result<(StatusCode, Json<Value>), ApiError>
where
    A: AccountStore,
    P: CatalogStore,
    C: CartStore,
    O: OrderStore,
    I: ImageStore,
{
    require_admin(state.account_store.as_ref(), &user).await?;

    let (mut input, file) = if is_multipart(&request) {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;
        parse_multipart_product(multipart).await?
    } else {
        let Json(input) = Json::<NewProduct>::from_request(request, &())
            .await
            .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;
        (input, None)
    };

    if let Some((filename, data)) = file {
        let path = uploads::store_product_image(&state, filename.as_deref(), data).await?;
        input.image = Some(path);
    }

    let product = state.catalog_store.create_product(&input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "data": { "product": product },
        })),
    ))
}

pub async fn update_product<A, P, C, O, I>(
    State(state): State<AppState<A, P, C, O, I>>,
    user: AuthenticatedUser,
    Path(product_id): Path<String>,
    request: Request,
) -> Result<Json<Value>, ApiError>
where
    A: AccountStore,
    P: CatalogStore,
    C: CartStore,
    O: OrderStore,
    I: ImageStore,
{
    require_admin(state.account_store.as_ref(), &user).await?;

    let (mut update, file) = if is_multipart(&request) {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;
        parse_multipart_update(multipart).await?
    } else {
        let Json(update) = Json::<ProductUpdate>::from_request(request, &())
            .await
            .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;
        (update, None)
    };

    if let Some((filename, data)) = file {
        let path = uploads::store_product_image(&state, filename.as_deref(), data).await?;
        update.image = Some(path);
    }

    let product = state
        .catalog_store
        .update_product(&product_id, &update)
        .await?;
    Ok(Json(json!({
        "status": "success",
        "data": { "product": product },
    })))
}

pub async fn delete_product<A, P, C, O, I>(
    State(state): State<AppState<A, P, C, O, I>>,
    user: AuthenticatedUser,
    Path(product_id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    A: AccountStore,
    P: CatalogStore,
    C: CartStore,
    O: OrderStore,
    I: ImageStore,
{
    require_admin(state.account_store.as_ref(), &user).await?;
    state.catalog_store.delete_product(&product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"))
}

struct RawProductFields {
    name: Option<String>,
    description: Option<String>,
    category: Option<String>,
    gender: Option<String>,
    base_price: Option<i64>,
    fabric_price: Option<i64>,
    file: Option<(Option<String>, Bytes)>,
}

async fn collect_product_fields(mut multipart: Multipart) -> Result<RawProductFields, ApiError> {
    let mut fields = RawProductFields {
        name: None,
        description: None,
        category: None,
        gender: None,
        base_price: None,
        fabric_price: None,
        file: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "referenceImage" => {
                let filename = field.file_name().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;
                fields.file = Some((filename, data));
            }
            other => {
                let key = other.to_string();
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;
                match key.as_str() {
                    "name" => fields.name = Some(text),
                    "description" => fields.description = Some(text),
                    "category" => fields.category = Some(text),
                    "gender" => fields.gender = Some(text),
                    "basePrice" => {
                        fields.base_price = Some(text.parse().map_err(|_| {
                            ApiError::new(StatusCode::BAD_REQUEST, "Invalid basePrice")
                        })?);
                    }
                    "fabricPrice" => {
                        fields.fabric_price = Some(text.parse().map_err(|_| {
                            ApiError::new(StatusCode::BAD_REQUEST, "Invalid fabricPrice")
                        })?);
                    }
                    _ => {}
                }
            }
        }
    }

    Ok(fields)
}

fn parse_category(value: &str) -> Result<ProductCategory, ApiError> {
    ProductCategory::parse(value).ok_or_else(|| {
        ApiError::new(StatusCode::BAD_REQUEST, format!("Invalid category: {value}"))
    })
}

fn parse_gender(value: &str) -> Result<ProductGender, ApiError> {
    ProductGender::parse(value)
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, format!("Invalid gender: {value}")))
}

async fn parse_multipart_product(
    multipart: Multipart,
) -> Result<(NewProduct, Option<(Option<String>, Bytes)>), ApiError> {
    let fields = collect_product_fields(multipart).await?;

    let name = fields
        .name
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "A product must have a name"))?;
    let category = parse_category(&fields.category.ok_or_else(|| {
        ApiError::new(StatusCode::BAD_REQUEST, "A product must have a category")
    })?)?;
    let base_price = fields.base_price.ok_or_else(|| {
        ApiError::new(StatusCode::BAD_REQUEST, "A product must have a stitching price")
    })?;
    let gender = fields.gender.as_deref().map(parse_gender).transpose()?;

    Ok((
        NewProduct {
            name,
            description: fields.description,
            category,
            gender,
            base_price,
            fabric_price: fields.fabric_price,
            image: None,
        },
        fields.file,
    ))
}

async fn parse_multipart_update(
    multipart: Multipart,
) -> Result<(ProductUpdate, Option<(Option<String>, Bytes)>), ApiError> {
    let fields = collect_product_fields(multipart).await?;

    let category = fields.category.as_deref().map(parse_category).transpose()?;
    let gender = fields.gender.as_deref().map(parse_gender).transpose()?;

    Ok((
        ProductUpdate {
            name: fields.name,
            description: fields.description,
            category,
            gender,
            base_price: fields.base_price,
            fabric_price: fields.fabric_price,
            image: None,
        },
        fields.file,
    ))
}
