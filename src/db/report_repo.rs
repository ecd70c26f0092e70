// src/db/report_repo.rs

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    common::error::AppError,
    models::report::{ProductReportRow, ReportFilters},
};

#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Products matching the filters, each with its vendor's name.
    // Dates only narrow the result when both ends are present.
    pub async fn products(&self, filters: &ReportFilters) -> Result<Vec<ProductReportRow>, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT p.*, v.name AS vendor_name
            FROM products p
            LEFT JOIN vendors v ON v.id = p.vendor_id
            WHERE 1=1
            "#,
        );

        if let (Some(start), Some(end)) = (filters.start_date, filters.end_date) {
            qb.push(" AND p.created_at::date BETWEEN ")
                .push_bind(start)
                .push(" AND ")
                .push_bind(end);
        }
        if let Some(vendor_id) = filters.vendor_id {
            qb.push(" AND p.vendor_id = ").push_bind(vendor_id);
        }
        if let Some(category) = &filters.category {
            qb.push(" AND p.category = ").push_bind(category.clone());
        }
        if let Some(status) = filters.status {
            qb.push(" AND p.status = ").push_bind(status);
        }
        qb.push(" ORDER BY p.created_at DESC");

        let rows = qb
            .build_query_as::<ProductReportRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
