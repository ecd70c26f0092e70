// src/db/product_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::product::{
        CreateProductPayload, DEFAULT_MAX_STOCK, DEFAULT_MIN_STOCK, Product, ProductFilter,
        UpdateProductPayload,
    },
};

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

fn map_product_write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::SkuAlreadyExists;
        }
        if db_err.is_foreign_key_violation() {
            return AppError::VendorNotFound;
        }
    }
    e.into()
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // ---
    // Reads
    // ---

    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM products WHERE 1=1");

        if let Some(vendor_id) = filter.vendor_id {
            qb.push(" AND vendor_id = ").push_bind(vendor_id);
        }
        if let Some(category) = &filter.category {
            qb.push(" AND category = ").push_bind(category.clone());
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let pattern = format!("%{}%", search.trim());
            qb.push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR sku ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        qb.push(" ORDER BY created_at DESC");

        let products = qb.build_query_as::<Product>().fetch_all(&self.pool).await?;
        Ok(products)
    }

    pub async fn list_by_vendors(&self, vendor_ids: &[Uuid]) -> Result<Vec<Product>, AppError> {
        if vendor_ids.is_empty() {
            return Ok(Vec::new());
        }
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE vendor_id = ANY($1) ORDER BY created_at DESC",
        )
        .bind(vendor_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    pub async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Product>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let products = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    /// Row lock held until the surrounding transaction ends.
    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product =
            sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(product)
    }

    // ---
    // Writes
    // ---

    pub async fn create(&self, payload: &CreateProductPayload) -> Result<Product, AppError> {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                vendor_id, name, description, price, cost, stock, min_stock, max_stock,
                sku, barcode, category, status, image
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(payload.vendor_id)
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(payload.price)
        .bind(payload.cost)
        .bind(payload.stock.unwrap_or(0))
        .bind(payload.min_stock.unwrap_or(DEFAULT_MIN_STOCK))
        .bind(payload.max_stock.unwrap_or(DEFAULT_MAX_STOCK))
        .bind(&payload.sku)
        .bind(&payload.barcode)
        .bind(&payload.category)
        .bind(payload.status.unwrap_or_default())
        .bind(&payload.image)
        .fetch_one(&self.pool)
        .await
        .map_err(map_product_write_error)
    }

    // Stock is deliberately not part of this statement.
    pub async fn update(
        &self,
        id: Uuid,
        payload: &UpdateProductPayload,
    ) -> Result<Option<Product>, AppError> {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name        = COALESCE($2, name),
                description = COALESCE($3, description),
                price       = COALESCE($4, price),
                cost        = COALESCE($5, cost),
                min_stock   = COALESCE($6, min_stock),
                max_stock   = COALESCE($7, max_stock),
                sku         = COALESCE($8, sku),
                barcode     = COALESCE($9, barcode),
                category    = COALESCE($10, category),
                status      = COALESCE($11, status),
                image       = COALESCE($12, image),
                vendor_id   = COALESCE($13, vendor_id),
                updated_at  = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(payload.price)
        .bind(payload.cost)
        .bind(payload.min_stock)
        .bind(payload.max_stock)
        .bind(&payload.sku)
        .bind(&payload.barcode)
        .bind(&payload.category)
        .bind(payload.status)
        .bind(&payload.image)
        .bind(payload.vendor_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_product_write_error)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::Conflict(
                            "Product is referenced by orders and cannot be deleted".into(),
                        );
                    }
                }
                AppError::from(e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// Sets the new stock level, and the unit cost when one is given.
    pub async fn update_stock<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        new_stock: i32,
        cost: Option<Decimal>,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET stock = $2, cost = COALESCE($3, cost), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(new_stock)
        .bind(cost)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::ProductNotFound(id))?;
        Ok(product)
    }
}
