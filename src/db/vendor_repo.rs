// src/db/vendor_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        orders::DocumentKind,
        vendor::{CreateVendorPayload, UpdateVendorPayload, Vendor, VendorFilter},
    },
};

#[derive(Clone)]
pub struct VendorRepository {
    pool: PgPool,
}

fn map_vendor_write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::EmailAlreadyExists;
        }
    }
    e.into()
}

impl VendorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // ---
    // Reads
    // ---

    pub async fn list(&self, filter: &VendorFilter) -> Result<Vec<Vendor>, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM vendors WHERE 1=1");

        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let pattern = format!("%{}%", search.trim());
            qb.push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR email ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        qb.push(" ORDER BY created_at DESC");

        let vendors = qb.build_query_as::<Vendor>().fetch_all(&self.pool).await?;
        Ok(vendors)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Vendor>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let vendor = sqlx::query_as::<_, Vendor>("SELECT * FROM vendors WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(vendor)
    }

    pub async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Vendor>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let vendors = sqlx::query_as::<_, Vendor>("SELECT * FROM vendors WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(vendors)
    }

    // ---
    // Writes
    // ---

    pub async fn create(&self, payload: &CreateVendorPayload) -> Result<Vendor, AppError> {
        sqlx::query_as::<_, Vendor>(
            r#"
            INSERT INTO vendors (name, email, phone, address, description, status, tax_id, website)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(&payload.address)
        .bind(&payload.description)
        .bind(payload.status.unwrap_or_default())
        .bind(&payload.tax_id)
        .bind(&payload.website)
        .fetch_one(&self.pool)
        .await
        .map_err(map_vendor_write_error)
    }

    // Absent fields keep their stored value (COALESCE)
    pub async fn update(
        &self,
        id: Uuid,
        payload: &UpdateVendorPayload,
    ) -> Result<Option<Vendor>, AppError> {
        sqlx::query_as::<_, Vendor>(
            r#"
            UPDATE vendors SET
                name        = COALESCE($2, name),
                email       = COALESCE($3, email),
                phone       = COALESCE($4, phone),
                address     = COALESCE($5, address),
                description = COALESCE($6, description),
                status      = COALESCE($7, status),
                tax_id      = COALESCE($8, tax_id),
                website     = COALESCE($9, website),
                updated_at  = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(&payload.address)
        .bind(&payload.description)
        .bind(payload.status)
        .bind(&payload.tax_id)
        .bind(&payload.website)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_vendor_write_error)
    }

    /// Returns false when no row matched.
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM vendors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::Conflict(
                            "Vendor still has products or orders and cannot be deleted".into(),
                        );
                    }
                }
                AppError::from(e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// Atomic running-total increment; concurrent orders never lose an update.
    pub async fn add_to_total<'e, E>(
        &self,
        executor: E,
        vendor_id: Uuid,
        kind: DocumentKind,
        amount: Decimal,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = match kind {
            DocumentKind::Sale => {
                "UPDATE vendors SET total_sales = total_sales + $2, updated_at = NOW() WHERE id = $1"
            }
            DocumentKind::Purchase => {
                "UPDATE vendors SET total_purchases = total_purchases + $2, updated_at = NOW() WHERE id = $1"
            }
        };
        sqlx::query(sql)
            .bind(vendor_id)
            .bind(amount)
            .execute(executor)
            .await?;
        Ok(())
    }
}
