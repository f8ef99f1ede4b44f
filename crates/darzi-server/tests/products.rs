use axum::body::Body;
use darzi_test_utils::*;
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

async fn admin_token(router: &axum::Router, stores: &TestStores) -> String {
    let (account_id, token, _) = signup_via_api(router, "admin@example.com").await;
    make_admin(stores, &account_id).await;
    token
}

fn shirt_payload() -> serde_json::Value {
    json!({
        "name": "Linen Shirt",
        "description": "Half-sleeve linen shirt",
        "category": "Shirt",
        "gender": "Male",
        "basePrice": 500,
        "fabricPrice": 300,
    })
}

#[tokio::test]
async fn listing_is_public_and_filterable() {
    let (router, stores) = create_test_router_and_stores().await;
    let admin = admin_token(&router, &stores).await;

    let (status, body) =
        send_request(&router, "POST", "/api/products", Some(&admin), Some(shirt_payload())).await;
    assert_eq!(status, 201, "create product failed: {body}");

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/products",
        Some(&admin),
        Some(json!({
            "name": "Anarkali Kurta",
            "category": "Kurta",
            "gender": "Female",
            "basePrice": 900,
        })),
    )
    .await;
    assert_eq!(status, 201, "create product failed: {body}");

    // No auth needed to browse.
    let (status, body) = send_request(&router, "GET", "/api/products", None, None).await;
    assert_api_ok(status, &body);
    assert_eq!(body["results"], 2);

    let (_, body) = send_request(&router, "GET", "/api/products?category=Shirt", None, None).await;
    assert_eq!(body["results"], 1);
    assert_eq!(body["data"]["products"][0]["name"], "Linen Shirt");

    // Unknown filter values match nothing rather than erroring.
    let (status, body) =
        send_request(&router, "GET", "/api/products?category=Spacesuit", None, None).await;
    assert_api_ok(status, &body);
    assert_eq!(body["results"], 0);
}

#[tokio::test]
async fn product_mutation_is_admin_gated() {
    let (router, _stores) = create_test_router_and_stores().await;
    let (_, user_token, _) = signup_via_api(&router, "user@example.com").await;

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/products",
        Some(&user_token),
        Some(shirt_payload()),
    )
    .await;
    assert_api_fail(status, &body, 403, "Admin only");

    let (status, body) =
        send_request(&router, "DELETE", "/api/products/some-id", Some(&user_token), None).await;
    assert_api_fail(status, &body, 403, "Admin only");
}

#[tokio::test]
async fn get_update_delete_round_trip() {
    let (router, stores) = create_test_router_and_stores().await;
    let admin = admin_token(&router, &stores).await;

    let (_, body) =
        send_request(&router, "POST", "/api/products", Some(&admin), Some(shirt_payload())).await;
    let product_id = body["data"]["product"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["product"]["image"], "default-product.jpg");

    let (status, body) =
        send_request(&router, "GET", &format!("/api/products/{product_id}"), None, None).await;
    assert_api_ok(status, &body);
    assert_eq!(body["data"]["product"]["basePrice"], 500);

    let (status, body) = send_request(
        &router,
        "PUT",
        &format!("/api/products/{product_id}"),
        Some(&admin),
        Some(json!({"basePrice": 550})),
    )
    .await;
    assert_api_ok(status, &body);
    assert_eq!(body["data"]["product"]["basePrice"], 550);
    assert_eq!(body["data"]["product"]["name"], "Linen Shirt");

    let (status, _) = send_request(
        &router,
        "DELETE",
        &format!("/api/products/{product_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, 204);

    let (status, body) =
        send_request(&router, "GET", &format!("/api/products/{product_id}"), None, None).await;
    assert_api_fail(status, &body, 404, "Product not found");
}

#[tokio::test]
async fn multipart_create_stores_the_product_image() {
    let (router, stores) = create_test_router_and_stores().await;
    let admin = admin_token(&router, &stores).await;

    let (content_type, body) = multipart_body(
        &[
            ("name", "Sherwani Royale"),
            ("category", "Sherwani"),
            ("gender", "Male"),
            ("basePrice", "5000"),
            ("fabricPrice", "1500"),
        ],
        Some(("referenceImage", "sherwani.png", b"fake-png-bytes")),
    );

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/products")
        .header("authorization", format!("Bearer {admin}"))
        .header("content-type", content_type)
        .body(Body::from(body))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status().as_u16();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(status, 201, "multipart create failed: {body}");

    let image = body["data"]["product"]["image"].as_str().unwrap();
    assert!(image.starts_with("/uploads/products/"));
    assert!(image.ends_with(".png"));
    assert_eq!(body["data"]["product"]["basePrice"], 5000);
}

#[tokio::test]
async fn multipart_create_validates_required_fields() {
    let (router, stores) = create_test_router_and_stores().await;
    let admin = admin_token(&router, &stores).await;

    let (content_type, body) = multipart_body(&[("name", "No Price")], None);
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/products")
        .header("authorization", format!("Bearer {admin}"))
        .header("content-type", content_type)
        .body(Body::from(body))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status().as_u16();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_api_fail(status, &body, 400, "category");
}
