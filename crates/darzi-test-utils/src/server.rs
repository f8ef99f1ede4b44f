use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use darzi_core::config::{DarziConfig, DatabaseConfig, JwtConfig, UploadsConfig};
use darzi_image_fs::FsImageStore;
use darzi_server::{AppState, build_router};
use darzi_storage_sqlite::{
    SqliteAccountStore, SqliteCartStore, SqliteCatalogStore, SqliteOrderStore,
};

use crate::stores::{TestStores, create_test_stores};

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-chars-long";
pub const TEST_PASSWORD: &str = "stitch-in-time-9";

pub fn create_test_config(uploads_path: &str) -> DarziConfig {
    DarziConfig {
        port: 0,
        public_url: "http://test.darzi.local".to_string(),
        cors_origin: None,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
        },
        database: DatabaseConfig {
            url: String::new(), // not used; stores are pre-connected
        },
        uploads: UploadsConfig {
            path: uploads_path.to_string(),
            image_host_url: None,
        },
    }
}

pub fn create_test_app_state(
    stores: &TestStores,
) -> AppState<SqliteAccountStore, SqliteCatalogStore, SqliteCartStore, SqliteOrderStore, FsImageStore>
{
    AppState {
        account_store: Arc::new(stores.account_store.clone()),
        catalog_store: Arc::new(stores.catalog_store.clone()),
        cart_store: Arc::new(stores.cart_store.clone()),
        order_store: Arc::new(stores.order_store.clone()),
        image_store: Arc::new(stores.image_store.clone()),
        config: Arc::new(create_test_config(&stores.uploads_path)),
        http_client: reqwest::Client::new(),
    }
}

pub fn create_test_router(stores: &TestStores) -> Router {
    build_router(create_test_app_state(stores))
}

pub async fn create_test_router_and_stores() -> (Router, TestStores) {
    let stores = create_test_stores().await;
    let router = create_test_router(&stores);
    (router, stores)
}

/// Promote an account to admin directly in the database; there is no API
/// surface for this on purpose.
pub async fn make_admin(stores: &TestStores, account_id: &str) {
    let pool = sqlx::SqlitePool::connect(&stores.db_url)
        .await
        .expect("pool connect");
    sqlx::query("UPDATE account SET role = 'admin' WHERE id = ?")
        .bind(account_id)
        .execute(&pool)
        .await
        .expect("failed to promote account to admin");
}

/// Sign up via the API and return (account_id, access_token, refresh_cookie).
pub async fn signup_via_api(router: &Router, email: &str) -> (String, String, String) {
    let body = serde_json::json!({
        "name": "Test User",
        "email": email,
        "password": TEST_PASSWORD,
        "phone": "9876543210",
    });

    let (status, json, cookie) =
        send_request_with_cookie(router, "POST", "/api/auth/signup", None, None, Some(body)).await;
    assert_eq!(status, 201, "signup failed: {json}");

    let account_id = json["data"]["user"]["id"].as_str().unwrap().to_string();
    let access_token = json["accessToken"].as_str().unwrap().to_string();
    let refresh_cookie = cookie.expect("signup should set the refresh cookie");

    (account_id, access_token, refresh_cookie)
}

/// Send a request through the router and return (status, body_json).
pub async fn send_request(
    router: &Router,
    method: &str,
    uri: &str,
    auth_token: Option<&str>,
    body: Option<Value>,
) -> (u16, Value) {
    let (status, json, _) =
        send_request_with_cookie(router, method, uri, auth_token, None, body).await;
    (status, json)
}

/// Like [`send_request`], but with an optional `refreshToken` cookie on the
/// request; also returns the `refreshToken` value from any `Set-Cookie`
/// response header.
pub async fn send_request_with_cookie(
    router: &Router,
    method: &str,
    uri: &str,
    auth_token: Option<&str>,
    refresh_cookie: Option<&str>,
    body: Option<Value>,
) -> (u16, Value, Option<String>) {
    let mut builder = axum::http::Request::builder().method(method).uri(uri);

    if let Some(token) = auth_token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    if let Some(cookie) = refresh_cookie {
        builder = builder.header("cookie", format!("refreshToken={cookie}"));
    }
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }

    let req_body = match body {
        Some(b) => Body::from(serde_json::to_vec(&b).unwrap()),
        None => Body::empty(),
    };

    let req = builder.body(req_body).unwrap();
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status().as_u16();

    let new_cookie = resp
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(extract_refresh_cookie);

    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or(Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };

    (status, json, new_cookie)
}

fn extract_refresh_cookie(header: &str) -> Option<String> {
    let (name_value, _) = header.split_once(';').unwrap_or((header, ""));
    let (name, value) = name_value.split_once('=')?;
    if name.trim() == "refreshToken" {
        Some(value.to_string())
    } else {
        None
    }
}

/// Build a multipart/form-data request body. Returns (content_type, body).
pub fn multipart_body(
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> (String, Vec<u8>) {
    let boundary = "darzi-test-boundary";
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    if let Some((name, filename, data)) = file {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={boundary}"), body)
}
