// src/models/vendor.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::product::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "vendor_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VendorStatus {
    #[default]
    Active,
    Inactive,
}

// --- Vendor (supplier) ---
// total_purchases / total_sales are running sums kept by the order workflow,
// never recomputed from the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: Uuid,
    #[schema(example = "Tech Supplies Inc")]
    pub name: String,
    #[schema(example = "contact@techsupplies.com")]
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub status: VendorStatus,
    pub tax_id: Option<String>,
    pub website: Option<String>,
    pub rating: Decimal,
    pub total_purchases: Decimal,
    pub total_sales: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorWithProducts {
    #[serde(flatten)]
    pub vendor: Vendor,
    pub products: Vec<Product>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVendorPayload {
    #[validate(length(min = 1, message = "The name is required."))]
    pub name: String,
    #[validate(email(message = "The e-mail address is invalid."))]
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub status: Option<VendorStatus>,
    pub tax_id: Option<String>,
    pub website: Option<String>,
}

// Only the fields present in the body are changed.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVendorPayload {
    #[validate(length(min = 1, message = "The name cannot be empty."))]
    pub name: Option<String>,
    #[validate(email(message = "The e-mail address is invalid."))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub status: Option<VendorStatus>,
    pub tax_id: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VendorFilter {
    pub status: Option<VendorStatus>,
    pub search: Option<String>,
}
