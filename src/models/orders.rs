// src/models/orders.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{product::Product, vendor::Vendor};

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    #[default]
    Pending,
    Partial,
}

// Orders are created as Completed; the other states exist for future refund flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Completed,
    Cancelled,
    Refunded,
}

/// The two document types that receive sequential numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Sale,
    Purchase,
}

impl DocumentKind {
    pub fn prefix(self) -> &'static str {
        match self {
            DocumentKind::Sale => "VEN",
            DocumentKind::Purchase => "COM",
        }
    }

    pub fn entity_name(self) -> &'static str {
        match self {
            DocumentKind::Sale => "Sale",
            DocumentKind::Purchase => "Purchase",
        }
    }
}

// =============================================================================
//  SALES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,
    #[schema(example = "VEN-00001")]
    pub sale_number: String,
    pub vendor_id: Option<Uuid>,
    #[schema(example = "Jane Doe")]
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    #[schema(example = "cash")]
    pub payment_method: String,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub created_by_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub discount: Decimal,
    pub subtotal: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleItemDetail {
    #[serde(flatten)]
    pub item: SaleItem,
    pub product: Option<Product>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetail {
    #[serde(flatten)]
    pub sale: Sale,
    pub vendor: Option<Vendor>,
    pub items: Vec<SaleItemDetail>,
}

// --- Sale creation input ---
// Missing customerName/items deserialize to empty values so the workflow can
// answer with a 400 instead of a body rejection.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleRequest {
    pub vendor_id: Option<Uuid>,

    #[serde(default)]
    #[schema(example = "Jane Doe")]
    pub customer_name: String,

    #[validate(email(message = "The customer e-mail is invalid."))]
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<CreateSaleItem>,

    #[serde(default)]
    #[schema(example = "cash")]
    pub payment_method: String,

    #[serde(default)]
    pub payment_status: PaymentStatus,

    pub notes: Option<String>,
    pub tax: Option<Decimal>,
    pub discount: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleItem {
    pub product_id: Uuid,

    #[validate(range(min = 1, message = "The quantity must be at least 1."))]
    #[schema(example = 2)]
    pub quantity: i32,

    #[schema(example = "29.99")]
    pub unit_price: Decimal,

    // Not checked against the line value: a line may end up negative.
    pub discount: Option<Decimal>,
}

// Row ready to be inserted, with totals already computed.
#[derive(Debug, Clone)]
pub struct NewSale {
    pub sale_number: String,
    pub vendor_id: Option<Uuid>,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub payment_method: String,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    pub created_by_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct NewSaleItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub discount: Decimal,
    pub subtotal: Decimal,
}

// =============================================================================
//  PURCHASES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: Uuid,
    #[schema(example = "COM-00001")]
    pub purchase_number: String,
    pub vendor_id: Uuid,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub payment_method: String,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    pub invoice_number: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_by_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItem {
    pub id: Uuid,
    pub purchase_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_cost: Decimal,
    pub subtotal: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItemDetail {
    #[serde(flatten)]
    pub item: PurchaseItem,
    pub product: Option<Product>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseDetail {
    #[serde(flatten)]
    pub purchase: Purchase,
    pub vendor: Option<Vendor>,
    pub items: Vec<PurchaseItemDetail>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchaseRequest {
    pub vendor_id: Option<Uuid>,

    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<CreatePurchaseItem>,

    #[serde(default)]
    #[schema(example = "transfer")]
    pub payment_method: String,

    #[serde(default)]
    pub payment_status: PaymentStatus,

    pub invoice_number: Option<String>,

    // Format YYYY-MM-DD
    pub due_date: Option<NaiveDate>,

    pub notes: Option<String>,
    pub tax: Option<Decimal>,
    pub discount: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchaseItem {
    pub product_id: Uuid,

    #[validate(range(min = 1, message = "The quantity must be at least 1."))]
    #[schema(example = 10)]
    pub quantity: i32,

    #[schema(example = "18.50")]
    pub unit_cost: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub purchase_number: String,
    pub vendor_id: Uuid,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub payment_method: String,
    pub payment_status: PaymentStatus,
    pub invoice_number: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_by_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct NewPurchaseItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_cost: Decimal,
    pub subtotal: Decimal,
}

// --- List filters (query string) ---
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub vendor_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
