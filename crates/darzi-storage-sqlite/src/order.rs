use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use darzi_core::{
    AccountBrief, Appointment, AppointmentAddress, DarziError, DarziResult, NewOrder, Order,
    OrderItem, OrderStatus, OrderStore, OrderWithUser,
};

use crate::datetime::{format_date, parse_date, parse_datetime};

#[derive(Clone)]
pub struct SqliteOrderStore {
    pool: SqlitePool,
}

fn row_to_appointment(row: &sqlx::sqlite::SqliteRow) -> Result<Appointment, DarziError> {
    let date: String = row
        .try_get("appt_date")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let time_slot: String = row
        .try_get("appt_time_slot")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let street: Option<String> = row
        .try_get("appt_street")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let city: Option<String> = row
        .try_get("appt_city")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let state: Option<String> = row
        .try_get("appt_state")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let zip: Option<String> = row
        .try_get("appt_zip")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let contact_name: Option<String> = row
        .try_get("appt_contact_name")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let contact_phone: Option<String> = row
        .try_get("appt_contact_phone")
        .map_err(|e| DarziError::Storage(e.to_string()))?;

    let address = if street.is_none() && city.is_none() && state.is_none() && zip.is_none() {
        None
    } else {
        Some(AppointmentAddress {
            street,
            city,
            state,
            zip,
        })
    };

    Ok(Appointment {
        date: parse_date(&date)?,
        time_slot,
        address,
        contact_name,
        contact_phone,
    })
}

fn row_to_order(row: &sqlx::sqlite::SqliteRow, items: Vec<OrderItem>) -> Result<Order, DarziError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let account_id: String = row
        .try_get("account_id")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let profile_tag: String = row
        .try_get("profile_tag")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let total_amount: i64 = row
        .try_get("total_amount")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let status: String = row
        .try_get("status")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let created_at: String = row
        .try_get("created_at")
        .map_err(|e| DarziError::Storage(e.to_string()))?;

    Ok(Order {
        id,
        account_id,
        profile_tag,
        items,
        total_amount,
        status: OrderStatus::parse(&status)
            .ok_or_else(|| DarziError::Storage(format!("unknown order status: {status}")))?,
        appointment: row_to_appointment(row)?,
        created_at: parse_datetime(&created_at)?,
    })
}

fn row_to_order_item(row: &sqlx::sqlite::SqliteRow) -> Result<OrderItem, DarziError> {
    let product_ref: String = row
        .try_get("product_ref")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let name: Option<String> = row
        .try_get("name")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let image: Option<String> = row
        .try_get("image")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let quantity: i64 = row
        .try_get("quantity")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let with_fabric: i64 = row
        .try_get("with_fabric")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let price: Option<i64> = row
        .try_get("price")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let customization: Option<String> = row
        .try_get("customization")
        .map_err(|e| DarziError::Storage(e.to_string()))?;

    Ok(OrderItem {
        product: product_ref,
        name,
        image,
        quantity,
        with_fabric: with_fabric != 0,
        price,
        customization,
    })
}

impl SqliteOrderStore {
    pub async fn connect(url: &str) -> DarziResult<Self> {
        let pool = SqlitePool::connect(url)
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;
        Ok(Self { pool })
    }

    async fn items_for(&self, order_id: &str) -> DarziResult<Vec<OrderItem>> {
        let rows =
            sqlx::query("SELECT * FROM order_item WHERE order_id = ? ORDER BY position ASC")
                .bind(order_id)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| DarziError::Storage(e.to_string()))?;

        rows.iter().map(row_to_order_item).collect()
    }

    async fn get_order(&self, id: &str) -> DarziResult<Option<Order>> {
        let row = sqlx::query("SELECT * FROM orders WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;

        match row {
            Some(ref r) => {
                let items = self.items_for(id).await?;
                Ok(Some(row_to_order(r, items)?))
            }
            None => Ok(None),
        }
    }

    async fn joined_orders(&self, limit: Option<usize>) -> DarziResult<Vec<OrderWithUser>> {
        let sql = match limit {
            Some(_) => {
                "SELECT o.*, a.name AS user_name, a.email AS user_email, a.phone AS user_phone \
                 FROM orders o INNER JOIN account a ON a.id = o.account_id \
                 ORDER BY o.created_at DESC, o.rowid DESC LIMIT ?"
            }
            None => {
                "SELECT o.*, a.name AS user_name, a.email AS user_email, a.phone AS user_phone \
                 FROM orders o INNER JOIN account a ON a.id = o.account_id \
                 ORDER BY o.created_at DESC, o.rowid DESC"
            }
        };

        let mut query = sqlx::query(sql);
        if let Some(limit) = limit {
            query = query.bind(limit as i64);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: String = row
                .try_get("id")
                .map_err(|e| DarziError::Storage(e.to_string()))?;
            let items = self.items_for(&id).await?;
            let order = row_to_order(row, items)?;
            let user_name: String = row
                .try_get("user_name")
                .map_err(|e| DarziError::Storage(e.to_string()))?;
            let user_email: String = row
                .try_get("user_email")
                .map_err(|e| DarziError::Storage(e.to_string()))?;
            let user_phone: String = row
                .try_get("user_phone")
                .map_err(|e| DarziError::Storage(e.to_string()))?;

            orders.push(OrderWithUser {
                id: order.id,
                user: AccountBrief {
                    id: order.account_id,
                    name: user_name,
                    email: user_email,
                    phone: Some(user_phone),
                },
                profile_tag: order.profile_tag,
                items: order.items,
                total_amount: order.total_amount,
                status: order.status,
                appointment: order.appointment,
                created_at: order.created_at,
            });
        }
        Ok(orders)
    }
}

#[async_trait]
impl OrderStore for SqliteOrderStore {
    async fn create_order(&self, input: &NewOrder) -> DarziResult<Order> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;

        let id = Uuid::new_v4().to_string();
        let address = input.appointment.address.clone().unwrap_or_default();
        sqlx::query(
            "INSERT INTO orders (id, account_id, profile_tag, total_amount, status, appt_date, appt_time_slot, appt_street, appt_city, appt_state, appt_zip, appt_contact_name, appt_contact_phone) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&input.account_id)
        .bind(&input.profile_tag)
        .bind(input.total_amount)
        .bind(input.status.as_str())
        .bind(format_date(input.appointment.date))
        .bind(&input.appointment.time_slot)
        .bind(&address.street)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.zip)
        .bind(&input.appointment.contact_name)
        .bind(&input.appointment.contact_phone)
        .execute(&mut *tx)
        .await
        .map_err(|e| DarziError::Storage(e.to_string()))?;

        for (position, item) in input.items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO order_item (order_id, position, product_ref, name, image, quantity, with_fabric, price, customization) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&id)
            .bind(position as i64)
            .bind(&item.product_ref)
            .bind(&item.name)
            .bind(&item.image)
            .bind(item.quantity)
            .bind(item.with_fabric as i64)
            .bind(item.price)
            .bind(&item.customization)
            .execute(&mut *tx)
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;

        self.get_order(&id).await?.ok_or_else(|| {
            DarziError::Storage("failed to retrieve order after creation".to_string())
        })
    }

    async fn list_orders_for_account(&self, account_id: &str) -> DarziResult<Vec<Order>> {
        let rows = sqlx::query(
            "SELECT * FROM orders WHERE account_id = ? ORDER BY created_at DESC, rowid DESC",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DarziError::Storage(e.to_string()))?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: String = row
                .try_get("id")
                .map_err(|e| DarziError::Storage(e.to_string()))?;
            let items = self.items_for(&id).await?;
            orders.push(row_to_order(row, items)?);
        }
        Ok(orders)
    }

    async fn list_all_orders(&self) -> DarziResult<Vec<OrderWithUser>> {
        self.joined_orders(None).await
    }

    async fn recent_orders(&self, limit: usize) -> DarziResult<Vec<OrderWithUser>> {
        let mut orders = self.joined_orders(Some(limit)).await?;
        // The dashboard join carries name/email only.
        for order in &mut orders {
            order.user.phone = None;
        }
        Ok(orders)
    }

    async fn update_order_status(&self, id: &str, status: OrderStatus) -> DarziResult<Order> {
        let result = sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DarziError::NotFound("Order not found".to_string()));
        }
        self.get_order(id)
            .await?
            .ok_or_else(|| DarziError::NotFound("Order not found".to_string()))
    }

    async fn count_orders(&self) -> DarziResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM orders")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;
        row.try_get("n")
            .map_err(|e| DarziError::Storage(e.to_string()))
    }

    async fn sum_order_totals(&self) -> DarziResult<i64> {
        let row = sqlx::query("SELECT COALESCE(SUM(total_amount), 0) AS total FROM orders")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;
        row.try_get("total")
            .map_err(|e| DarziError::Storage(e.to_string()))
    }

    async fn delete_orders_for_account(&self, account_id: &str) -> DarziResult<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;

        sqlx::query(
            "DELETE FROM order_item WHERE order_id IN (SELECT id FROM orders WHERE account_id = ?)",
        )
        .bind(account_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| DarziError::Storage(e.to_string()))?;

        let result = sqlx::query("DELETE FROM orders WHERE account_id = ?")
            .bind(account_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;
        Ok(result.rows_affected())
    }

    async fn delete_orders_by_profile_tag(
        &self,
        account_id: &str,
        tag: &str,
    ) -> DarziResult<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;

        sqlx::query(
            "DELETE FROM order_item WHERE order_id IN (SELECT id FROM orders WHERE account_id = ? AND profile_tag = ?)",
        )
        .bind(account_id)
        .bind(tag)
        .execute(&mut *tx)
        .await
        .map_err(|e| DarziError::Storage(e.to_string()))?;

        let result = sqlx::query("DELETE FROM orders WHERE account_id = ? AND profile_tag = ?")
            .bind(account_id)
            .bind(tag)
            .execute(&mut *tx)
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;
        Ok(result.rows_affected())
    }
}
