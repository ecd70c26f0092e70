// src/db/purchase_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::orders::{NewPurchase, NewPurchaseItem, OrderFilter, Purchase, PurchaseItem},
};

#[derive(Clone)]
pub struct PurchaseRepository {
    pool: PgPool,
}

impl PurchaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &OrderFilter) -> Result<Vec<Purchase>, AppError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM purchases WHERE 1=1");

        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(payment_status) = filter.payment_status {
            qb.push(" AND payment_status = ").push_bind(payment_status);
        }
        if let Some(vendor_id) = filter.vendor_id {
            qb.push(" AND vendor_id = ").push_bind(vendor_id);
        }
        if let Some(start) = filter.start_date {
            qb.push(" AND created_at::date >= ").push_bind(start);
        }
        if let Some(end) = filter.end_date {
            qb.push(" AND created_at::date <= ").push_bind(end);
        }
        qb.push(" ORDER BY created_at DESC");

        let purchases = qb.build_query_as::<Purchase>().fetch_all(&self.pool).await?;
        Ok(purchases)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Purchase>, AppError> {
        let purchase = sqlx::query_as::<_, Purchase>("SELECT * FROM purchases WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(purchase)
    }

    pub async fn items_for(&self, purchase_ids: &[Uuid]) -> Result<Vec<PurchaseItem>, AppError> {
        if purchase_ids.is_empty() {
            return Ok(Vec::new());
        }
        let items = sqlx::query_as::<_, PurchaseItem>(
            "SELECT * FROM purchase_items WHERE purchase_id = ANY($1) ORDER BY created_at ASC, id ASC",
        )
        .bind(purchase_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn last_number<'e, E>(&self, executor: E) -> Result<Option<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let number = sqlx::query_scalar::<_, String>(
            "SELECT purchase_number FROM purchases ORDER BY created_at DESC, purchase_number DESC LIMIT 1",
        )
        .fetch_optional(executor)
        .await?;
        Ok(number)
    }

    pub async fn insert<'e, E>(&self, executor: E, purchase: &NewPurchase) -> Result<Purchase, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Purchase>(
            r#"
            INSERT INTO purchases (
                purchase_number, vendor_id, subtotal, tax, discount, total, payment_method,
                payment_status, invoice_number, due_date, notes, created_by_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(&purchase.purchase_number)
        .bind(purchase.vendor_id)
        .bind(purchase.subtotal)
        .bind(purchase.tax)
        .bind(purchase.discount)
        .bind(purchase.total)
        .bind(&purchase.payment_method)
        .bind(purchase.payment_status)
        .bind(&purchase.invoice_number)
        .bind(purchase.due_date)
        .bind(&purchase.notes)
        .bind(purchase.created_by_id)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(format!(
                        "Purchase number {} is already taken",
                        purchase.purchase_number
                    ));
                }
            }
            e.into()
        })
    }

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        purchase_id: Uuid,
        item: &NewPurchaseItem,
    ) -> Result<PurchaseItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, PurchaseItem>(
            r#"
            INSERT INTO purchase_items (purchase_id, product_id, quantity, unit_cost, subtotal)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(purchase_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.unit_cost)
        .bind(item.subtotal)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }
}
