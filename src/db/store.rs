// src/db/store.rs
//
// Persistence seam of the order workflow. Everything between `begin` and
// `commit` happens atomically; dropping an uncommitted `OrderTx` discards
// every write made through it.

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        activity::{NewAuditLog, NewNotification},
        inventory::{InventoryMovement, NewInventoryMovement},
        orders::{
            DocumentKind, NewPurchase, NewPurchaseItem, NewSale, NewSaleItem, Purchase,
            PurchaseItem, Sale, SaleItem,
        },
        product::Product,
        vendor::Vendor,
    },
};

#[async_trait]
pub trait OrderStore: Send + Sync {
    type Tx: OrderTx;

    async fn begin(&self) -> Result<Self::Tx, AppError>;

    // Side-effect sinks, written outside the order transaction.
    async fn record_audit(&self, entry: NewAuditLog) -> Result<(), AppError>;
    async fn push_notification(&self, notification: NewNotification) -> Result<(), AppError>;
}

#[async_trait]
pub trait OrderTx: Send {
    async fn find_vendor(&mut self, id: Uuid) -> Result<Option<Vendor>, AppError>;
    async fn find_product(&mut self, id: Uuid) -> Result<Option<Product>, AppError>;

    /// Reads the product and holds it against concurrent stock changes.
    async fn lock_product(&mut self, id: Uuid) -> Result<Option<Product>, AppError>;

    /// Number of the newest document of `kind`. Also reserves numbering for
    /// `kind` until this transaction ends.
    async fn last_document_number(&mut self, kind: DocumentKind) -> Result<Option<String>, AppError>;

    async fn insert_sale(&mut self, sale: NewSale) -> Result<Sale, AppError>;
    async fn insert_sale_item(&mut self, sale_id: Uuid, item: NewSaleItem) -> Result<SaleItem, AppError>;
    async fn insert_purchase(&mut self, purchase: NewPurchase) -> Result<Purchase, AppError>;
    async fn insert_purchase_item(
        &mut self,
        purchase_id: Uuid,
        item: NewPurchaseItem,
    ) -> Result<PurchaseItem, AppError>;

    async fn update_product_stock(
        &mut self,
        product_id: Uuid,
        new_stock: i32,
        cost: Option<Decimal>,
    ) -> Result<Product, AppError>;

    async fn insert_movement(
        &mut self,
        movement: NewInventoryMovement,
    ) -> Result<InventoryMovement, AppError>;

    /// Adds `amount` to the vendor's running total for `kind`, atomically.
    async fn add_to_vendor_total(
        &mut self,
        vendor_id: Uuid,
        kind: DocumentKind,
        amount: Decimal,
    ) -> Result<(), AppError>;

    async fn commit(self) -> Result<(), AppError>;
}
