// src/db/audit_repo.rs

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    common::error::AppError,
    models::activity::{AuditLog, AuditLogFilter, NewAuditLog},
};

const DEFAULT_AUDIT_LIMIT: i64 = 100;

#[derive(Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, entry: &NewAuditLog) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (user_id, action, entity_type, entity_id, details, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.user_id)
        .bind(&entry.action)
        .bind(&entry.entity_type)
        .bind(&entry.entity_id)
        .bind(&entry.details)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn list(&self, filter: &AuditLogFilter) -> Result<Vec<AuditLog>, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM audit_logs WHERE 1=1");

        if let Some(user_id) = filter.user_id {
            qb.push(" AND user_id = ").push_bind(user_id);
        }
        if let Some(entity_type) = &filter.entity_type {
            qb.push(" AND entity_type = ").push_bind(entity_type.clone());
        }
        if let Some(action) = &filter.action {
            qb.push(" AND action = ").push_bind(action.clone());
        }
        if let Some(start) = filter.start_date {
            qb.push(" AND created_at::date >= ").push_bind(start);
        }
        if let Some(end) = filter.end_date {
            qb.push(" AND created_at::date <= ").push_bind(end);
        }
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(filter.limit.unwrap_or(DEFAULT_AUDIT_LIMIT).clamp(1, 1000));

        let logs = qb.build_query_as::<AuditLog>().fetch_all(&self.pool).await?;
        Ok(logs)
    }
}
