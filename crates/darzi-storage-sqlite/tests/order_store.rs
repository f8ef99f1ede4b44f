use chrono::NaiveDate;
use tempfile::TempDir;

use darzi_core::{
    Appointment, AppointmentAddress, AccountStore, CreateAccountInput, DarziError, Gender,
    NewOrder, NewOrderItem, OrderStatus, OrderStore, Role,
};
use darzi_storage_sqlite::{SqliteAccountStore, SqliteOrderStore};

async fn connect_stores() -> (SqliteAccountStore, SqliteOrderStore, TempDir) {
    let tempdir = TempDir::new().expect("failed to create tempdir");
    let db_path = tempdir.path().join("test.db");
    let url = format!("sqlite://{}?mode=rwc", db_path.display());
    let accounts = SqliteAccountStore::connect(&url)
        .await
        .expect("failed to connect account store");
    let orders = SqliteOrderStore::connect(&url)
        .await
        .expect("failed to connect order store");
    (accounts, orders, tempdir)
}

async fn create_account(accounts: &SqliteAccountStore, email: &str) -> String {
    accounts
        .create_account(&CreateAccountInput {
            name: "Meera".to_string(),
            email: email.to_string(),
            phone: "9812345678".to_string(),
            password_hash: "$argon2id$test".to_string(),
            role: Role::User,
            gender: Gender::Female,
        })
        .await
        .unwrap()
        .id
}

fn appointment() -> Appointment {
    Appointment {
        date: NaiveDate::from_ymd_opt(2026, 9, 12).unwrap(),
        time_slot: "10:00 - 12:00".to_string(),
        address: Some(AppointmentAddress {
            street: Some("12 MG Road".to_string()),
            city: Some("Bengaluru".to_string()),
            state: Some("KA".to_string()),
            zip: Some("560001".to_string()),
        }),
        contact_name: Some("Meera".to_string()),
        contact_phone: Some("9812345678".to_string()),
    }
}

fn kurta_order(account_id: &str, profile_tag: &str, total: i64) -> NewOrder {
    NewOrder {
        account_id: account_id.to_string(),
        profile_tag: profile_tag.to_string(),
        items: vec![NewOrderItem {
            product_ref: "prod-1".to_string(),
            name: Some("Silk Kurta".to_string()),
            image: Some("kurta.jpg".to_string()),
            quantity: 1,
            with_fabric: true,
            price: Some(total),
            customization: Some("maroon, short collar".to_string()),
        }],
        total_amount: total,
        status: OrderStatus::Pending,
        appointment: appointment(),
    }
}

#[tokio::test]
async fn create_order_snapshots_items_and_appointment() {
    let (accounts, orders, _dir) = connect_stores().await;
    let account_id = create_account(&accounts, "meera@example.com").await;

    let order = orders.create_order(&kurta_order(&account_id, "me", 800)).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_amount, 800);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].name.as_deref(), Some("Silk Kurta"));
    assert_eq!(order.appointment.time_slot, "10:00 - 12:00");
    assert_eq!(
        order.appointment.address.as_ref().unwrap().city.as_deref(),
        Some("Bengaluru")
    );
}

#[tokio::test]
async fn orders_list_newest_first() {
    let (accounts, orders, _dir) = connect_stores().await;
    let account_id = create_account(&accounts, "meera@example.com").await;

    orders.create_order(&kurta_order(&account_id, "me", 100)).await.unwrap();
    orders.create_order(&kurta_order(&account_id, "me", 200)).await.unwrap();
    orders.create_order(&kurta_order(&account_id, "me", 300)).await.unwrap();

    let listed = orders.list_orders_for_account(&account_id).await.unwrap();
    let totals: Vec<_> = listed.iter().map(|o| o.total_amount).collect();
    assert_eq!(totals, vec![300, 200, 100]);
}

#[tokio::test]
async fn joined_listings_carry_account_fields() {
    let (accounts, orders, _dir) = connect_stores().await;
    let account_id = create_account(&accounts, "meera@example.com").await;
    orders.create_order(&kurta_order(&account_id, "me", 800)).await.unwrap();

    let all = orders.list_all_orders().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].user.email, "meera@example.com");
    assert_eq!(all[0].user.phone.as_deref(), Some("9812345678"));

    let recent = orders.recent_orders(10).await.unwrap();
    assert_eq!(recent[0].user.name, "Meera");
    assert!(recent[0].user.phone.is_none());
}

#[tokio::test]
async fn revenue_sum_ignores_status() {
    let (accounts, orders, _dir) = connect_stores().await;
    let account_id = create_account(&accounts, "meera@example.com").await;

    let kept = orders.create_order(&kurta_order(&account_id, "me", 800)).await.unwrap();
    let cancelled = orders.create_order(&kurta_order(&account_id, "me", 500)).await.unwrap();
    orders
        .update_order_status(&cancelled.id, OrderStatus::Cancelled)
        .await
        .unwrap();

    assert_eq!(orders.count_orders().await.unwrap(), 2);
    // Cancelled orders still count toward revenue.
    assert_eq!(orders.sum_order_totals().await.unwrap(), 1300);

    let reloaded = orders.list_orders_for_account(&account_id).await.unwrap();
    let statuses: Vec<_> = reloaded.iter().map(|o| (o.id.clone(), o.status)).collect();
    assert!(statuses.contains(&(kept.id, OrderStatus::Pending)));
    assert!(statuses.contains(&(cancelled.id, OrderStatus::Cancelled)));
}

#[tokio::test]
async fn status_update_accepts_any_enumeration_value() {
    let (accounts, orders, _dir) = connect_stores().await;
    let account_id = create_account(&accounts, "meera@example.com").await;
    let order = orders.create_order(&kurta_order(&account_id, "me", 800)).await.unwrap();

    // No transition guard: Pending can jump straight to Delivered and back.
    let delivered = orders
        .update_order_status(&order.id, OrderStatus::Delivered)
        .await
        .unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);
    let back = orders
        .update_order_status(&order.id, OrderStatus::Confirmed)
        .await
        .unwrap();
    assert_eq!(back.status, OrderStatus::Confirmed);

    let err = orders
        .update_order_status("missing", OrderStatus::Pending)
        .await
        .unwrap_err();
    assert!(matches!(err, DarziError::NotFound(_)));
}

#[tokio::test]
async fn profile_tag_cascade_only_touches_matching_orders() {
    let (accounts, orders, _dir) = connect_stores().await;
    let account_id = create_account(&accounts, "meera@example.com").await;
    let other_id = create_account(&accounts, "asha@example.com").await;

    orders.create_order(&kurta_order(&account_id, "Priya", 100)).await.unwrap();
    orders.create_order(&kurta_order(&account_id, "Priya", 200)).await.unwrap();
    orders.create_order(&kurta_order(&account_id, "me", 300)).await.unwrap();
    // Same display name under another account stays untouched.
    orders.create_order(&kurta_order(&other_id, "Priya", 400)).await.unwrap();

    let removed = orders
        .delete_orders_by_profile_tag(&account_id, "Priya")
        .await
        .unwrap();
    assert_eq!(removed, 2);

    assert_eq!(orders.list_orders_for_account(&account_id).await.unwrap().len(), 1);
    assert_eq!(orders.list_orders_for_account(&other_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn account_cascade_removes_all_owned_orders() {
    let (accounts, orders, _dir) = connect_stores().await;
    let account_id = create_account(&accounts, "meera@example.com").await;
    orders.create_order(&kurta_order(&account_id, "me", 100)).await.unwrap();
    orders.create_order(&kurta_order(&account_id, "Priya", 200)).await.unwrap();

    let removed = orders.delete_orders_for_account(&account_id).await.unwrap();
    assert_eq!(removed, 2);
    assert!(orders.list_orders_for_account(&account_id).await.unwrap().is_empty());
}
