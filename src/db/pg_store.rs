// src/db/pg_store.rs

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        AuditRepository, InventoryRepository, NotificationRepository, ProductRepository,
        PurchaseRepository, SalesRepository, VendorRepository,
        store::{OrderStore, OrderTx},
    },
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

#[derive(Clone)]
struct Repos {
    vendors: VendorRepository,
    products: ProductRepository,
    sales: SalesRepository,
    purchases: PurchaseRepository,
    inventory: InventoryRepository,
}

/// Postgres-backed store: one database transaction per order.
#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
    repos: Repos,
    audit: AuditRepository,
    notifications: NotificationRepository,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repos: Repos {
                vendors: VendorRepository::new(pool.clone()),
                products: ProductRepository::new(pool.clone()),
                sales: SalesRepository::new(pool.clone()),
                purchases: PurchaseRepository::new(pool.clone()),
                inventory: InventoryRepository::new(pool.clone()),
            },
            audit: AuditRepository::new(pool.clone()),
            notifications: NotificationRepository::new(pool.clone()),
            pool,
        }
    }
}

pub struct PgOrderTx {
    tx: Transaction<'static, Postgres>,
    repos: Repos,
}

#[async_trait]
impl OrderStore for PgOrderStore {
    type Tx = PgOrderTx;

    async fn begin(&self) -> Result<PgOrderTx, AppError> {
        let tx = self.pool.begin().await?;
        Ok(PgOrderTx {
            tx,
            repos: self.repos.clone(),
        })
    }

    async fn record_audit(&self, entry: NewAuditLog) -> Result<(), AppError> {
        self.audit.insert(&entry).await
    }

    async fn push_notification(&self, notification: NewNotification) -> Result<(), AppError> {
        self.notifications.insert(&notification).await
    }
}

#[async_trait]
impl OrderTx for PgOrderTx {
    async fn find_vendor(&mut self, id: Uuid) -> Result<Option<Vendor>, AppError> {
        self.repos.vendors.find_by_id(&mut *self.tx, id).await
    }

    async fn find_product(&mut self, id: Uuid) -> Result<Option<Product>, AppError> {
        self.repos.products.find_by_id(&mut *self.tx, id).await
    }

    async fn lock_product(&mut self, id: Uuid) -> Result<Option<Product>, AppError> {
        self.repos.products.find_for_update(&mut *self.tx, id).await
    }

    async fn last_document_number(&mut self, kind: DocumentKind) -> Result<Option<String>, AppError> {
        // 1. Advisory lock: a concurrent order of the same kind waits for our commit
        self.repos.inventory.lock_numbering(&mut *self.tx, kind).await?;

        // 2. Newest number, read after the lock is held
        match kind {
            DocumentKind::Sale => self.repos.sales.last_number(&mut *self.tx).await,
            DocumentKind::Purchase => self.repos.purchases.last_number(&mut *self.tx).await,
        }
    }

    async fn insert_sale(&mut self, sale: NewSale) -> Result<Sale, AppError> {
        self.repos.sales.insert(&mut *self.tx, &sale).await
    }

    async fn insert_sale_item(&mut self, sale_id: Uuid, item: NewSaleItem) -> Result<SaleItem, AppError> {
        self.repos.sales.insert_item(&mut *self.tx, sale_id, &item).await
    }

    async fn insert_purchase(&mut self, purchase: NewPurchase) -> Result<Purchase, AppError> {
        self.repos.purchases.insert(&mut *self.tx, &purchase).await
    }

    async fn insert_purchase_item(
        &mut self,
        purchase_id: Uuid,
        item: NewPurchaseItem,
    ) -> Result<PurchaseItem, AppError> {
        self.repos
            .purchases
            .insert_item(&mut *self.tx, purchase_id, &item)
            .await
    }

    async fn update_product_stock(
        &mut self,
        product_id: Uuid,
        new_stock: i32,
        cost: Option<Decimal>,
    ) -> Result<Product, AppError> {
        self.repos
            .products
            .update_stock(&mut *self.tx, product_id, new_stock, cost)
            .await
    }

    async fn insert_movement(
        &mut self,
        movement: NewInventoryMovement,
    ) -> Result<InventoryMovement, AppError> {
        self.repos
            .inventory
            .record_movement(&mut *self.tx, &movement)
            .await
    }

    async fn add_to_vendor_total(
        &mut self,
        vendor_id: Uuid,
        kind: DocumentKind,
        amount: Decimal,
    ) -> Result<(), AppError> {
        self.repos
            .vendors
            .add_to_total(&mut *self.tx, vendor_id, kind, amount)
            .await
    }

    async fn commit(self) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }
}
