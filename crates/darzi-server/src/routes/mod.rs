pub mod admin;
pub mod auth;
pub mod cart;
pub mod health;
pub mod orders;
pub mod products;
pub mod profiles;

use axum::Extension;
use axum::http::{Method, header};
use tower_http::services::ServeDir;

use crate::auth::JwtSecret;
use crate::state::AppState;
use darzi_core::traits::*;

pub fn build_router<A, P, C, O, I>(state: AppState<A, P, C, O, I>) -> axum::Router
where
    A: AccountStore + Clone,
    P: CatalogStore + Clone,
    C: CartStore + Clone,
    O: OrderStore + Clone,
    I: ImageStore + Clone,
{
    let jwt_secret = JwtSecret(state.config.jwt.secret.clone());
    let uploads_path = state.config.uploads.path.clone();

    // The storefront needs credentialed CORS (the refresh cookie); with no
    // configured origin, fall back to a permissive cookieless policy.
    let cors = match state
        .config
        .cors_origin
        .as_deref()
        .map(|origin| origin.parse::<axum::http::HeaderValue>())
    {
        Some(Ok(origin)) => tower_http::cors::CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        Some(Err(_)) => {
            tracing::warn!("invalid cors_origin in config, falling back to permissive CORS");
            permissive_cors()
        }
        None => permissive_cors(),
    };

    axum::Router::new()
        // Health
        .route("/health", axum::routing::get(health::health_check))
        // Sessions
        .route(
            "/api/auth/signup",
            axum::routing::post(auth::signup::<A, P, C, O, I>),
        )
        .route(
            "/api/auth/login",
            axum::routing::post(auth::login::<A, P, C, O, I>),
        )
        .route(
            "/api/auth/refresh-token",
            axum::routing::post(auth::refresh_token::<A, P, C, O, I>),
        )
        .route(
            "/api/auth/logout",
            axum::routing::post(auth::logout::<A, P, C, O, I>),
        )
        .route(
            "/api/auth/me",
            axum::routing::get(auth::me::<A, P, C, O, I>),
        )
        // Measurement profiles
        .route(
            "/api/user/profiles",
            axum::routing::get(profiles::list_profiles::<A, P, C, O, I>)
                .post(profiles::add_profile::<A, P, C, O, I>),
        )
        .route(
            "/api/user/profiles/{id}",
            axum::routing::put(profiles::update_profile::<A, P, C, O, I>)
                .delete(profiles::delete_profile::<A, P, C, O, I>),
        )
        // Cart
        .route(
            "/api/cart",
            axum::routing::get(cart::get_cart::<A, P, C, O, I>)
                .post(cart::add_to_cart::<A, P, C, O, I>),
        )
        .route(
            "/api/cart/{itemId}",
            axum::routing::delete(cart::remove_from_cart::<A, P, C, O, I>),
        )
        // Orders
        .route(
            "/api/orders",
            axum::routing::post(orders::create_order::<A, P, C, O, I>)
                .get(orders::my_orders::<A, P, C, O, I>),
        )
        // Catalog
        .route(
            "/api/products",
            axum::routing::get(products::list_products::<A, P, C, O, I>)
                .post(products::create_product::<A, P, C, O, I>),
        )
        .route(
            "/api/products/{id}",
            axum::routing::get(products::get_product::<A, P, C, O, I>)
                .put(products::update_product::<A, P, C, O, I>)
                .delete(products::delete_product::<A, P, C, O, I>),
        )
        // Admin
        .route(
            "/api/admin/stats",
            axum::routing::get(admin::dashboard_stats::<A, P, C, O, I>),
        )
        .route(
            "/api/admin/users",
            axum::routing::get(admin::list_users::<A, P, C, O, I>),
        )
        .route(
            "/api/admin/users/{id}",
            axum::routing::get(admin::user_details::<A, P, C, O, I>)
                .delete(admin::delete_user::<A, P, C, O, I>),
        )
        .route(
            "/api/admin/orders",
            axum::routing::get(admin::all_orders::<A, P, C, O, I>),
        )
        .route(
            "/api/admin/orders/{id}/status",
            axum::routing::put(admin::update_order_status::<A, P, C, O, I>),
        )
        // Uploaded images (reference images, product images)
        .nest_service("/uploads", ServeDir::new(uploads_path))
        .layer(Extension(jwt_secret))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(cors)
        // Request body size limit: 10 MiB covers reference-image uploads.
        .layer(tower_http::limit::RequestBodyLimitLayer::new(
            10 * 1024 * 1024,
        ))
        .with_state(state)
}

fn permissive_cors() -> tower_http::cors::CorsLayer {
    tower_http::cors::CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}
