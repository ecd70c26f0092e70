// src/db/sales_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::orders::{NewSale, NewSaleItem, OrderFilter, Sale, SaleItem},
};

#[derive(Clone)]
pub struct SalesRepository {
    pool: PgPool,
}

impl SalesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Reads
    // ---

    pub async fn list(&self, filter: &OrderFilter) -> Result<Vec<Sale>, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM sales WHERE 1=1");

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

        let sales = qb.build_query_as::<Sale>().fetch_all(&self.pool).await?;
        Ok(sales)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Sale>, AppError> {
        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(sale)
    }

    pub async fn items_for(&self, sale_ids: &[Uuid]) -> Result<Vec<SaleItem>, AppError> {
        if sale_ids.is_empty() {
            return Ok(Vec::new());
        }
        let items = sqlx::query_as::<_, SaleItem>(
            "SELECT * FROM sale_items WHERE sale_id = ANY($1) ORDER BY created_at ASC, id ASC",
        )
        .bind(sale_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Number of the most recently created sale, if any.
    pub async fn last_number<'e, E>(&self, executor: E) -> Result<Option<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let number = sqlx::query_scalar::<_, String>(
            "SELECT sale_number FROM sales ORDER BY created_at DESC, sale_number DESC LIMIT 1",
        )
        .fetch_optional(executor)
        .await?;
        Ok(number)
    }

    // ---
    // Writes (always inside the order transaction)
    // ---

    pub async fn insert<'e, E>(&self, executor: E, sale: &NewSale) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO sales (
                sale_number, vendor_id, customer_name, customer_email, customer_phone,
                subtotal, tax, discount, total, payment_method, payment_status, notes, created_by_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(&sale.sale_number)
        .bind(sale.vendor_id)
        .bind(&sale.customer_name)
        .bind(&sale.customer_email)
        .bind(&sale.customer_phone)
        .bind(sale.subtotal)
        .bind(sale.tax)
        .bind(sale.discount)
        .bind(sale.total)
        .bind(&sale.payment_method)
        .bind(sale.payment_status)
        .bind(&sale.notes)
        .bind(sale.created_by_id)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(format!(
                        "Sale number {} is already taken",
                        sale.sale_number
                    ));
                }
            }
            e.into()
        })
    }

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        item: &NewSaleItem,
    ) -> Result<SaleItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, SaleItem>(
            r#"
            INSERT INTO sale_items (sale_id, product_id, quantity, unit_price, discount, subtotal)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(sale_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.discount)
        .bind(item.subtotal)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }
}
