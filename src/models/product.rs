// src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::vendor::Vendor;

pub const DEFAULT_MIN_STOCK: i32 = 10;
pub const DEFAULT_MAX_STOCK: i32 = 1000;

// Status is set by people, never derived from stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "product_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Available,
    OutOfStock,
    Discontinued,
}

impl ProductStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductStatus::Available => "available",
            ProductStatus::OutOfStock => "out_of_stock",
            ProductStatus::Discontinued => "discontinued",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub vendor_id: Uuid,
    #[schema(example = "Wireless Mouse")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "29.99")]
    pub price: Decimal,
    /// Unit cost of the most recent purchase.
    pub cost: Option<Decimal>,
    pub stock: i32,
    pub min_stock: i32,
    pub max_stock: i32,
    #[schema(example = "TECH-MOU-002")]
    pub sku: String,
    pub barcode: Option<String>,
    #[schema(example = "Electronics")]
    pub category: String,
    pub status: ProductStatus,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithVendor {
    #[serde(flatten)]
    pub product: Product,
    pub vendor: Option<Vendor>,
}

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("The value cannot be negative.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(length(min = 1, message = "The name is required."))]
    pub name: String,
    pub description: Option<String>,
    #[validate(custom(function = "validate_not_negative"))]
    pub price: Decimal,
    pub cost: Option<Decimal>,
    #[validate(range(min = 0, message = "Stock cannot be negative."))]
    pub stock: Option<i32>,
    pub min_stock: Option<i32>,
    pub max_stock: Option<i32>,
    #[validate(length(min = 1, message = "The SKU is required."))]
    pub sku: String,
    pub barcode: Option<String>,
    #[validate(length(min = 1, message = "The category is required."))]
    pub category: String,
    pub status: Option<ProductStatus>,
    pub image: Option<String>,
    pub vendor_id: Uuid,
}

// No stock field: after creation stock only moves through orders.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    #[validate(length(min = 1, message = "The name cannot be empty."))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub cost: Option<Decimal>,
    pub min_stock: Option<i32>,
    pub max_stock: Option<i32>,
    #[validate(length(min = 1, message = "The SKU cannot be empty."))]
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub category: Option<String>,
    pub status: Option<ProductStatus>,
    pub image: Option<String>,
    pub vendor_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub vendor_id: Option<Uuid>,
    pub category: Option<String>,
    pub status: Option<ProductStatus>,
    pub search: Option<String>,
}
