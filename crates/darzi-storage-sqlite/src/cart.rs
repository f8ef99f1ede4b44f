use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use darzi_core::{
    Cart, CartItem, CartItemInput, CartStore, Customization, DarziError, DarziResult,
    ProductSnapshot,
};

use crate::datetime::parse_datetime;

#[derive(Clone)]
pub struct SqliteCartStore {
    pool: SqlitePool,
}

fn row_to_cart_item(row: &sqlx::sqlite::SqliteRow) -> Result<CartItem, DarziError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let product_id: String = row
        .try_get("product_id")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let product_name: Option<String> = row
        .try_get("product_name")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let product_image: Option<String> = row
        .try_get("product_image")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let product_category: Option<String> = row
        .try_get("product_category")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let base_price: Option<i64> = row
        .try_get("base_price")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let fabric_price: Option<i64> = row
        .try_get("fabric_price")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let with_fabric: i64 = row
        .try_get("with_fabric")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let profile_tag: String = row
        .try_get("profile_tag")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let quantity: i64 = row
        .try_get("quantity")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let has_customization: i64 = row
        .try_get("has_customization")
        .map_err(|e| DarziError::Storage(e.to_string()))?;

    let customization = if has_customization != 0 {
        Some(Customization {
            fabric_type: row
                .try_get("fabric_type")
                .map_err(|e| DarziError::Storage(e.to_string()))?,
            color: row
                .try_get("color")
                .map_err(|e| DarziError::Storage(e.to_string()))?,
            description: row
                .try_get("note")
                .map_err(|e| DarziError::Storage(e.to_string()))?,
            reference_image: row
                .try_get("reference_image")
                .map_err(|e| DarziError::Storage(e.to_string()))?,
        })
    } else {
        None
    };

    Ok(CartItem {
        id,
        product: ProductSnapshot {
            id: product_id,
            name: product_name,
            image: product_image,
            category: product_category,
            base_price,
            fabric_price,
        },
        with_fabric: with_fabric != 0,
        profile_tag,
        quantity,
        customization,
    })
}

impl SqliteCartStore {
    pub async fn connect(url: &str) -> DarziResult<Self> {
        let pool = SqlitePool::connect(url)
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;
        Ok(Self { pool })
    }

    async fn ensure_cart(&self, account_id: &str) -> DarziResult<()> {
        sqlx::query("INSERT INTO cart (account_id) VALUES (?) ON CONFLICT(account_id) DO NOTHING")
            .bind(account_id)
            .execute(&self.pool)
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn touch_cart(&self, account_id: &str) -> DarziResult<()> {
        sqlx::query(
            "UPDATE cart SET updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE account_id = ?",
        )
        .bind(account_id)
        .execute(&self.pool)
        .await
        .map_err(|e| DarziError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn load_cart(&self, account_id: &str) -> DarziResult<Option<Cart>> {
        let row = sqlx::query("SELECT account_id, updated_at FROM cart WHERE account_id = ?")
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;

        let row = match row {
            Some(r) => r,
            None => return Ok(None),
        };

        let updated_at: String = row
            .try_get("updated_at")
            .map_err(|e| DarziError::Storage(e.to_string()))?;

        let item_rows =
            sqlx::query("SELECT * FROM cart_item WHERE account_id = ? ORDER BY rowid ASC")
                .bind(account_id)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| DarziError::Storage(e.to_string()))?;

        let items = item_rows
            .iter()
            .map(row_to_cart_item)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Cart {
            account_id: account_id.to_string(),
            items,
            updated_at: parse_datetime(&updated_at)?,
        }))
    }
}

#[async_trait]
impl CartStore for SqliteCartStore {
    async fn get_or_create_cart(&self, account_id: &str) -> DarziResult<Cart> {
        self.ensure_cart(account_id).await?;
        self.load_cart(account_id).await?.ok_or_else(|| {
            DarziError::Storage("failed to retrieve cart after creation".to_string())
        })
    }

    async fn add_item(&self, account_id: &str, item: &CartItemInput) -> DarziResult<Cart> {
        self.ensure_cart(account_id).await?;

        let id = Uuid::new_v4().to_string();
        let customization = item.customization.as_ref();
        sqlx::query(
            "INSERT INTO cart_item (id, account_id, product_id, product_name, product_image, product_category, base_price, fabric_price, with_fabric, profile_tag, quantity, has_customization, fabric_type, color, note, reference_image) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(account_id)
        .bind(&item.product.id)
        .bind(&item.product.name)
        .bind(&item.product.image)
        .bind(&item.product.category)
        .bind(item.product.base_price)
        .bind(item.product.fabric_price)
        .bind(item.with_fabric as i64)
        .bind(&item.profile_tag)
        .bind(item.quantity)
        .bind(customization.is_some() as i64)
        .bind(customization.and_then(|c| c.fabric_type.as_deref()))
        .bind(customization.and_then(|c| c.color.as_deref()))
        .bind(customization.and_then(|c| c.description.as_deref()))
        .bind(customization.and_then(|c| c.reference_image.as_deref()))
        .execute(&self.pool)
        .await
        .map_err(|e| DarziError::Storage(e.to_string()))?;

        self.touch_cart(account_id).await?;
        self.get_or_create_cart(account_id).await
    }

    async fn remove_item(&self, account_id: &str, item_id: &str) -> DarziResult<Option<Cart>> {
        let cart = self.load_cart(account_id).await?;
        if cart.is_none() {
            return Ok(None);
        }

        // Removing an id that is not present is not an error.
        sqlx::query("DELETE FROM cart_item WHERE account_id = ? AND id = ?")
            .bind(account_id)
            .bind(item_id)
            .execute(&self.pool)
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;

        self.touch_cart(account_id).await?;
        self.load_cart(account_id).await
    }

    async fn remove_matching_items(
        &self,
        account_id: &str,
        product_ids: &[String],
        profile_tag: &str,
    ) -> DarziResult<u64> {
        if product_ids.is_empty() {
            return Ok(0);
        }

        let mut builder = sqlx::QueryBuilder::new(
            "DELETE FROM cart_item WHERE account_id = ",
        );
        builder.push_bind(account_id);
        builder.push(" AND profile_tag = ").push_bind(profile_tag);
        builder.push(" AND product_id IN (");
        let mut separated = builder.separated(", ");
        for product_id in product_ids {
            separated.push_bind(product_id);
        }
        separated.push_unseparated(")");

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;

        if result.rows_affected() > 0 {
            self.touch_cart(account_id).await?;
        }
        Ok(result.rows_affected())
    }
}
