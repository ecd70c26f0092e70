// src/models/report.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::product::{Product, ProductStatus};

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilters {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub vendor_id: Option<Uuid>,
    pub category: Option<String>,
    pub status: Option<ProductStatus>,
}

impl ReportFilters {
    /// Human readable summary printed on the PDF header.
    pub fn describe(&self) -> Vec<String> {
        let mut parts = Vec::new();
        if let Some(start) = self.start_date {
            parts.push(format!("From: {}", start));
        }
        if let Some(end) = self.end_date {
            parts.push(format!("To: {}", end));
        }
        if let Some(category) = &self.category {
            parts.push(format!("Category: {}", category));
        }
        if let Some(status) = self.status {
            parts.push(format!("Status: {}", status.as_str()));
        }
        parts
    }
}

// Product joined with the owning vendor's name.
#[derive(Debug, Clone, FromRow)]
pub struct ProductReportRow {
    #[sqlx(flatten)]
    pub product: Product,
    pub vendor_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBucket {
    pub category: String,
    pub count: usize,
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorBucket {
    pub vendor_id: Uuid,
    pub vendor_name: String,
    pub count: usize,
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusBucket {
    pub status: ProductStatus,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryReport {
    pub total_products: usize,
    pub total_vendors: usize,
    /// Sum of price x stock over the matching products.
    pub total_value: Decimal,
    pub products_by_category: Vec<CategoryBucket>,
    pub products_by_vendor: Vec<VendorBucket>,
    pub products_by_status: Vec<StatusBucket>,
    pub recent_products: Vec<Product>,
}
