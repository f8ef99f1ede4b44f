use darzi_test_utils::*;
use serde_json::json;

fn cart_payload(profile_tag: &str) -> serde_json::Value {
    json!({
        "product": {
            "id": "prod-1",
            "name": "Silk Kurta",
            "image": "kurta.jpg",
            "category": "Kurta",
            "basePrice": 500,
            "fabricPrice": 300,
        },
        "withFabric": true,
        "profileId": profile_tag,
        "customization": {"color": "maroon"},
    })
}

fn booking_payload(profile_tag: &str) -> serde_json::Value {
    json!({
        "items": [{
            "product": {"id": "prod-1", "name": "Silk Kurta", "image": "kurta.jpg"},
            "quantity": 1,
            "withFabric": true,
            "price": 800,
            "customization": "maroon",
        }],
        "totalAmount": 800,
        "profileId": profile_tag,
        "appointment": {
            "date": "2026-09-12",
            "timeSlot": "10:00 - 12:00",
            "address": {"street": "12 MG Road", "city": "Bengaluru", "state": "KA", "zip": "560001"},
            "contactName": "Asha",
            "contactPhone": "9876543210",
        },
    })
}

#[tokio::test]
async fn booking_requires_a_non_empty_selection() {
    let (router, _stores) = create_test_router_and_stores().await;
    let (_, token, _) = signup_via_api(&router, "asha@example.com").await;

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/orders",
        Some(&token),
        Some(json!({
            "items": [],
            "totalAmount": 0,
            "appointment": {"date": "2026-09-12", "timeSlot": "10:00 - 12:00"},
        })),
    )
    .await;
    assert_api_fail(status, &body, 400, "Cart is empty");
}

#[tokio::test]
async fn booking_snapshots_the_order_and_clears_matching_cart_lines() {
    let (router, _stores) = create_test_router_and_stores().await;
    let (_, token, _) = signup_via_api(&router, "asha@example.com").await;

    // One kurta for "me" (the one being ordered), one for another profile.
    send_request(&router, "POST", "/api/cart", Some(&token), Some(cart_payload("me"))).await;
    send_request(&router, "POST", "/api/cart", Some(&token), Some(cart_payload("Priya"))).await;

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/orders",
        Some(&token),
        Some(booking_payload("me")),
    )
    .await;
    assert_eq!(status, 201, "booking failed: {body}");

    let order = &body["data"]["order"];
    assert_eq!(order["status"], "Pending");
    assert_eq!(order["profileId"], "me");
    assert_eq!(order["totalAmount"], 800);
    assert_eq!(order["items"][0]["name"], "Silk Kurta");
    assert_eq!(order["items"][0]["quantity"], 1);
    assert_eq!(order["appointment"]["timeSlot"], "10:00 - 12:00");
    assert_eq!(order["appointment"]["address"]["city"], "Bengaluru");

    // Reconciliation removed only the (prod-1, "me") line.
    let (_, body) = send_request(&router, "GET", "/api/cart", Some(&token), None).await;
    let items = body["data"]["cart"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["profileId"], "Priya");
}

#[tokio::test]
async fn reconciliation_drops_duplicate_lines_for_the_same_pair() {
    let (router, _stores) = create_test_router_and_stores().await;
    let (_, token, _) = signup_via_api(&router, "asha@example.com").await;

    // Two lines for the same (product, profile) pair, differing only in
    // customization.
    send_request(&router, "POST", "/api/cart", Some(&token), Some(cart_payload("me"))).await;
    let mut second = cart_payload("me");
    second["customization"] = json!({"color": "navy"});
    send_request(&router, "POST", "/api/cart", Some(&token), Some(second)).await;

    let (status, _) = send_request(
        &router,
        "POST",
        "/api/orders",
        Some(&token),
        Some(booking_payload("me")),
    )
    .await;
    assert_eq!(status, 201);

    // Matching is by (product, profile), so both lines vanished even though
    // only one was ordered.
    let (_, body) = send_request(&router, "GET", "/api/cart", Some(&token), None).await;
    assert_eq!(body["data"]["cart"]["items"], json!([]));
}

#[tokio::test]
async fn status_is_pending_regardless_of_client_input() {
    let (router, _stores) = create_test_router_and_stores().await;
    let (_, token, _) = signup_via_api(&router, "asha@example.com").await;

    let mut payload = booking_payload("me");
    payload["status"] = json!("Delivered");
    let (status, body) =
        send_request(&router, "POST", "/api/orders", Some(&token), Some(payload)).await;
    assert_eq!(status, 201);
    assert_eq!(body["data"]["order"]["status"], "Pending");
}

#[tokio::test]
async fn plain_product_ids_fall_back_to_item_level_fields() {
    let (router, _stores) = create_test_router_and_stores().await;
    let (_, token, _) = signup_via_api(&router, "asha@example.com").await;

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/orders",
        Some(&token),
        Some(json!({
            "items": [{
                "product": "prod-7",
                "name": "Blazer",
                "image": "blazer.jpg",
                "price": 2500,
            }],
            "totalAmount": 2500,
            "appointment": {"date": "2026-10-01", "timeSlot": "14:00 - 16:00"},
        })),
    )
    .await;
    assert_eq!(status, 201, "booking failed: {body}");
    let order = &body["data"]["order"];
    assert_eq!(order["items"][0]["product"], "prod-7");
    assert_eq!(order["items"][0]["name"], "Blazer");
    // profileId defaults to "me" when omitted.
    assert_eq!(order["profileId"], "me");
}

#[tokio::test]
async fn my_orders_lists_own_orders_newest_first() {
    let (router, _stores) = create_test_router_and_stores().await;
    let (_, asha, _) = signup_via_api(&router, "asha@example.com").await;
    let (_, ravi, _) = signup_via_api(&router, "ravi@example.com").await;

    for total in [100, 200, 300] {
        let mut payload = booking_payload("me");
        payload["totalAmount"] = json!(total);
        let (status, _) =
            send_request(&router, "POST", "/api/orders", Some(&asha), Some(payload)).await;
        assert_eq!(status, 201);
    }
    send_request(&router, "POST", "/api/orders", Some(&ravi), Some(booking_payload("me"))).await;

    let (status, body) = send_request(&router, "GET", "/api/orders", Some(&asha), None).await;
    assert_api_ok(status, &body);
    assert_eq!(body["results"], 3);
    let totals: Vec<i64> = body["data"]["orders"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["totalAmount"].as_i64().unwrap())
        .collect();
    assert_eq!(totals, vec![300, 200, 100]);
}
