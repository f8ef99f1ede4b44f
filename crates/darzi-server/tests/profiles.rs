use darzi_test_utils::*;
use serde_json::json;

async fn add_profile(router: &axum::Router, token: &str, name: &str) -> serde_json::Value {
    let (status, body) = send_request(
        router,
        "POST",
        "/api/user/profiles",
        Some(token),
        Some(json!({
            "name": name,
            "phone": "9000000001",
            "location": "Mumbai",
            "measurements": "chest 36, waist 30",
        })),
    )
    .await;
    assert_eq!(status, 201, "add profile failed: {body}");
    body["data"]["profile"].clone()
}

#[tokio::test]
async fn listing_always_leads_with_the_self_profile() {
    let (router, _stores) = create_test_router_and_stores().await;
    let (_, token, _) = signup_via_api(&router, "asha@example.com").await;

    let (status, body) =
        send_request(&router, "GET", "/api/user/profiles", Some(&token), None).await;
    assert_api_ok(status, &body);

    let profiles = body["data"]["profiles"].as_array().unwrap();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0]["id"], "me");
    assert_eq!(profiles[0]["isSelf"], true);
    assert_eq!(profiles[0]["name"], "Test User");

    add_profile(&router, &token, "Priya").await;
    add_profile(&router, &token, "Dadi").await;

    let (status, body) =
        send_request(&router, "GET", "/api/user/profiles", Some(&token), None).await;
    assert_api_ok(status, &body);
    let profiles = body["data"]["profiles"].as_array().unwrap();
    assert_eq!(profiles.len(), 3);
    assert_eq!(profiles[0]["id"], "me");
    let me_count = profiles.iter().filter(|p| p["id"] == "me").count();
    assert_eq!(me_count, 1);
    assert_eq!(profiles[1]["name"], "Priya");
    assert_eq!(profiles[2]["name"], "Dadi");
}

#[tokio::test]
async fn duplicate_profile_names_are_rejected() {
    let (router, _stores) = create_test_router_and_stores().await;
    let (_, token, _) = signup_via_api(&router, "asha@example.com").await;

    add_profile(&router, &token, "Priya").await;

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/user/profiles",
        Some(&token),
        Some(json!({"name": "PRIYA", "phone": "9000000002"})),
    )
    .await;
    assert_api_fail(status, &body, 400, "already exists");
}

#[tokio::test]
async fn updating_me_mutates_the_account() {
    let (router, _stores) = create_test_router_and_stores().await;
    let (_, token, _) = signup_via_api(&router, "asha@example.com").await;

    let (status, body) = send_request(
        &router,
        "PUT",
        "/api/user/profiles/me",
        Some(&token),
        Some(json!({"name": "Asha Rao", "location": "Pune"})),
    )
    .await;
    assert_api_ok(status, &body);
    assert_eq!(body["data"]["profile"]["id"], "me");
    assert_eq!(body["data"]["profile"]["name"], "Asha Rao");
    assert_eq!(body["data"]["profile"]["location"], "Pune");

    // The account itself changed, not a stored profile.
    let (status, body) = send_request(&router, "GET", "/api/auth/me", Some(&token), None).await;
    assert_api_ok(status, &body);
    assert_eq!(body["data"]["user"]["name"], "Asha Rao");

    let (_, body) = send_request(&router, "GET", "/api/user/profiles", Some(&token), None).await;
    assert_eq!(body["data"]["profiles"][0]["name"], "Asha Rao");
    assert_eq!(body["data"]["profiles"][0]["location"], "Pune");
}

#[tokio::test]
async fn updating_a_stored_profile_merges_fields() {
    let (router, _stores) = create_test_router_and_stores().await;
    let (_, token, _) = signup_via_api(&router, "asha@example.com").await;
    let profile = add_profile(&router, &token, "Priya").await;
    let profile_id = profile["id"].as_str().unwrap();

    let (status, body) = send_request(
        &router,
        "PUT",
        &format!("/api/user/profiles/{profile_id}"),
        Some(&token),
        Some(json!({"measurements": "chest 38"})),
    )
    .await;
    assert_api_ok(status, &body);
    assert_eq!(body["data"]["profile"]["name"], "Priya");
    assert_eq!(body["data"]["profile"]["measurements"], "chest 38");

    let (status, body) = send_request(
        &router,
        "PUT",
        "/api/user/profiles/does-not-exist",
        Some(&token),
        Some(json!({"measurements": "x"})),
    )
    .await;
    assert_api_fail(status, &body, 404, "Profile not found");
}

#[tokio::test]
async fn deleting_a_profile_cascades_to_its_orders() {
    let (router, _stores) = create_test_router_and_stores().await;
    let (_, token, _) = signup_via_api(&router, "asha@example.com").await;
    let profile = add_profile(&router, &token, "Priya").await;
    let profile_id = profile["id"].as_str().unwrap().to_string();

    let order = |profile_tag: &str| {
        json!({
            "items": [{"product": "prod-1", "name": "Kurta", "price": 800}],
            "totalAmount": 800,
            "profileId": profile_tag,
            "appointment": {"date": "2026-09-12", "timeSlot": "10:00 - 12:00"},
        })
    };

    // Two orders tagged by display name (the common client behavior), one
    // by the raw id, one for the account itself.
    for tag in ["Priya", "Priya"] {
        let (status, _) =
            send_request(&router, "POST", "/api/orders", Some(&token), Some(order(tag))).await;
        assert_eq!(status, 201);
    }
    let (status, _) = send_request(
        &router,
        "POST",
        "/api/orders",
        Some(&token),
        Some(order(&profile_id)),
    )
    .await;
    assert_eq!(status, 201);
    let (status, _) =
        send_request(&router, "POST", "/api/orders", Some(&token), Some(order("me"))).await;
    assert_eq!(status, 201);

    let (_, body) = send_request(&router, "GET", "/api/orders", Some(&token), None).await;
    assert_eq!(body["results"], 4);

    let (status, body) = send_request(
        &router,
        "DELETE",
        &format!("/api/user/profiles/{profile_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_api_ok(status, &body);
    let profiles = body["data"]["profiles"].as_array().unwrap();
    assert!(profiles.iter().all(|p| p["name"] != "Priya"));

    // Both match paths fired: name-tagged and id-tagged orders are gone.
    let (_, body) = send_request(&router, "GET", "/api/orders", Some(&token), None).await;
    assert_eq!(body["results"], 1);
    assert_eq!(body["data"]["orders"][0]["profileId"], "me");
}

#[tokio::test]
async fn deleting_missing_or_self_profile_is_404() {
    let (router, _stores) = create_test_router_and_stores().await;
    let (_, token, _) = signup_via_api(&router, "asha@example.com").await;

    let (status, body) = send_request(
        &router,
        "DELETE",
        "/api/user/profiles/does-not-exist",
        Some(&token),
        None,
    )
    .await;
    assert_api_fail(status, &body, 404, "Profile not found");

    // "me" is synthesized, never stored, and cannot be deleted.
    let (status, body) =
        send_request(&router, "DELETE", "/api/user/profiles/me", Some(&token), None).await;
    assert_api_fail(status, &body, 404, "Profile not found");
}
