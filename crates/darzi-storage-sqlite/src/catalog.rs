use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use darzi_core::{
    CatalogStore, DarziError, DarziResult, NewProduct, Product, ProductCategory, ProductFilter,
    ProductGender, ProductUpdate,
};

use crate::datetime::parse_datetime;

#[derive(Clone)]
pub struct SqliteCatalogStore {
    pool: SqlitePool,
}

fn row_to_product(row: &sqlx::sqlite::SqliteRow) -> Result<Product, DarziError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let name: String = row
        .try_get("name")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let description: Option<String> = row
        .try_get("description")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let category: String = row
        .try_get("category")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let gender: String = row
        .try_get("gender")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let base_price: i64 = row
        .try_get("base_price")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let fabric_price: i64 = row
        .try_get("fabric_price")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let image: String = row
        .try_get("image")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let created_at: String = row
        .try_get("created_at")
        .map_err(|e| DarziError::Storage(e.to_string()))?;

    Ok(Product {
        id,
        name,
        description,
        category: ProductCategory::parse(&category)
            .ok_or_else(|| DarziError::Storage(format!("unknown category: {category}")))?,
        gender: ProductGender::parse(&gender)
            .ok_or_else(|| DarziError::Storage(format!("unknown product gender: {gender}")))?,
        base_price,
        fabric_price,
        image,
        created_at: parse_datetime(&created_at)?,
    })
}

impl SqliteCatalogStore {
    pub async fn connect(url: &str) -> DarziResult<Self> {
        let pool = SqlitePool::connect(url)
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalogStore {
    async fn create_product(&self, input: &NewProduct) -> DarziResult<Product> {
        let id = Uuid::new_v4().to_string();
        let gender = input.gender.unwrap_or(ProductGender::Male);
        let fabric_price = input.fabric_price.unwrap_or(0);
        let image = input.image.as_deref().unwrap_or("default-product.jpg");

        sqlx::query(
            "INSERT INTO product (id, name, description, category, gender, base_price, fabric_price, image) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.category.as_str())
        .bind(gender.as_str())
        .bind(input.base_price)
        .bind(fabric_price)
        .bind(image)
        .execute(&self.pool)
        .await
        .map_err(|e| DarziError::Storage(e.to_string()))?;

        self.get_product(&id).await?.ok_or_else(|| {
            DarziError::Storage("failed to retrieve product after creation".to_string())
        })
    }

    async fn get_product(&self, id: &str) -> DarziResult<Option<Product>> {
        let row = sqlx::query("SELECT * FROM product WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;

        match row {
            Some(ref r) => Ok(Some(row_to_product(r)?)),
            None => Ok(None),
        }
    }

    async fn list_products(&self, filter: &ProductFilter) -> DarziResult<Vec<Product>> {
        let rows = match (filter.category, filter.gender) {
            (Some(category), Some(gender)) => {
                sqlx::query("SELECT * FROM product WHERE category = ? AND gender = ? ORDER BY created_at DESC, rowid DESC")
                    .bind(category.as_str())
                    .bind(gender.as_str())
                    .fetch_all(&self.pool)
                    .await
                    .map_err(|e| DarziError::Storage(e.to_string()))?
            }
            (Some(category), None) => {
                sqlx::query("SELECT * FROM product WHERE category = ? ORDER BY created_at DESC, rowid DESC")
                    .bind(category.as_str())
                    .fetch_all(&self.pool)
                    .await
                    .map_err(|e| DarziError::Storage(e.to_string()))?
            }
            (None, Some(gender)) => {
                sqlx::query("SELECT * FROM product WHERE gender = ? ORDER BY created_at DESC, rowid DESC")
                    .bind(gender.as_str())
                    .fetch_all(&self.pool)
                    .await
                    .map_err(|e| DarziError::Storage(e.to_string()))?
            }
            (None, None) => {
                sqlx::query("SELECT * FROM product ORDER BY created_at DESC, rowid DESC")
                    .fetch_all(&self.pool)
                    .await
                    .map_err(|e| DarziError::Storage(e.to_string()))?
            }
        };

        rows.iter().map(row_to_product).collect()
    }

    async fn update_product(&self, id: &str, update: &ProductUpdate) -> DarziResult<Product> {
        let current = self
            .get_product(id)
            .await?
            .ok_or(DarziError::ProductNotFound)?;

        let name = update.name.clone().unwrap_or(current.name);
        let description = update.description.clone().or(current.description);
        let category = update.category.unwrap_or(current.category);
        let gender = update.gender.unwrap_or(current.gender);
        let base_price = update.base_price.unwrap_or(current.base_price);
        let fabric_price = update.fabric_price.unwrap_or(current.fabric_price);
        let image = update.image.clone().unwrap_or(current.image);

        sqlx::query(
            "UPDATE product SET name = ?, description = ?, category = ?, gender = ?, base_price = ?, fabric_price = ?, image = ? WHERE id = ?",
        )
        .bind(&name)
        .bind(&description)
        .bind(category.as_str())
        .bind(gender.as_str())
        .bind(base_price)
        .bind(fabric_price)
        .bind(&image)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| DarziError::Storage(e.to_string()))?;

        self.get_product(id).await?.ok_or(DarziError::ProductNotFound)
    }

    async fn delete_product(&self, id: &str) -> DarziResult<()> {
        let result = sqlx::query("DELETE FROM product WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DarziError::ProductNotFound);
        }
        Ok(())
    }

    async fn count_products(&self) -> DarziResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM product")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;
        row.try_get("n")
            .map_err(|e| DarziError::Storage(e.to_string()))
    }
}
