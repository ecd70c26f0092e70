// src/db/inventory_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};

use crate::{
    common::error::AppError,
    models::{
        inventory::{InventoryMovement, MovementFilter, NewInventoryMovement},
        orders::DocumentKind,
    },
};

const DEFAULT_MOVEMENT_LIMIT: i64 = 100;

#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Ledger reads
    // ---

    pub async fn list_movements(
        &self,
        filter: &MovementFilter,
    ) -> Result<Vec<InventoryMovement>, AppError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM inventory_movements WHERE 1=1");

        if let Some(product_id) = filter.product_id {
            qb.push(" AND product_id = ").push_bind(product_id);
        }
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(filter.limit.unwrap_or(DEFAULT_MOVEMENT_LIMIT).clamp(1, 1000));

        let movements = qb
            .build_query_as::<InventoryMovement>()
            .fetch_all(&self.pool)
            .await?;
        Ok(movements)
    }

    // ---
    // Ledger writes (append only)
    // ---

    pub async fn record_movement<'e, E>(
        &self,
        executor: E,
        movement: &NewInventoryMovement,
    ) -> Result<InventoryMovement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, InventoryMovement>(
            r#"
            INSERT INTO inventory_movements (
                product_id, vendor_id, movement_type, quantity,
                previous_stock, new_stock, reason, reference
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(movement.product_id)
        .bind(movement.vendor_id)
        .bind(movement.movement_type)
        .bind(movement.quantity)
        .bind(movement.previous_stock)
        .bind(movement.new_stock)
        .bind(&movement.reason)
        .bind(&movement.reference)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    /// Serialises document numbering per kind until the transaction ends.
    pub async fn lock_numbering<'e, E>(&self, executor: E, kind: DocumentKind) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(format!("document_number:{}", kind.prefix()))
            .execute(executor)
            .await?;
        Ok(())
    }
}
