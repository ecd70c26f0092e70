// src/db/memory_store.rs
//
// In-process `OrderStore`. A transaction holds the whole state behind one
// mutex and works on a copy, so commit is a swap and rollback is a drop.
// Compiled for tests only (`test-util` feature).

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{OrderStore, OrderTx},
    models::{
        activity::{NewAuditLog, NewNotification},
        inventory::{InventoryMovement, NewInventoryMovement},
        orders::{
            DocumentKind, NewPurchase, NewPurchaseItem, NewSale, NewSaleItem, OrderStatus,
            PaymentStatus, Purchase, PurchaseItem, Sale, SaleItem,
        },
        product::{DEFAULT_MAX_STOCK, Product, ProductStatus},
        vendor::{Vendor, VendorStatus},
    },
};

#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    pub vendors: HashMap<Uuid, Vendor>,
    pub products: HashMap<Uuid, Product>,
    pub sales: Vec<Sale>,
    pub sale_items: Vec<SaleItem>,
    pub purchases: Vec<Purchase>,
    pub purchase_items: Vec<PurchaseItem>,
    pub movements: Vec<InventoryMovement>,
    pub audit_logs: Vec<NewAuditLog>,
    pub notifications: Vec<NewNotification>,
}

#[derive(Debug, Default)]
struct FailureSwitches {
    movement_inserts: AtomicBool,
    audit_writes: AtomicBool,
    notification_writes: AtomicBool,
}

#[derive(Clone, Default)]
pub struct MemoryOrderStore {
    state: Arc<Mutex<MemoryState>>,
    failures: Arc<FailureSwitches>,
}

pub struct MemoryOrderTx {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
    failures: Arc<FailureSwitches>,
}

fn injected(what: &str) -> AppError {
    AppError::InternalServerError(anyhow::anyhow!("injected failure: {what}"))
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Seeding ---

    pub async fn insert_vendor(&self, name: &str) -> Vendor {
        let now = Utc::now();
        let vendor = Vendor {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@vendors.test", name.to_lowercase().replace(' ', ".")),
            phone: None,
            address: None,
            description: None,
            status: VendorStatus::Active,
            tax_id: None,
            website: None,
            rating: Decimal::ZERO,
            total_purchases: Decimal::ZERO,
            total_sales: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().await.vendors.insert(vendor.id, vendor.clone());
        vendor
    }

    pub async fn insert_product(
        &self,
        vendor_id: Uuid,
        name: &str,
        price: Decimal,
        stock: i32,
        min_stock: i32,
    ) -> Product {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            vendor_id,
            name: name.to_string(),
            description: None,
            price,
            cost: None,
            stock,
            min_stock,
            max_stock: DEFAULT_MAX_STOCK,
            sku: format!("SKU-{}", &Uuid::new_v4().simple().to_string()[..8]),
            barcode: None,
            category: "General".to_string(),
            status: ProductStatus::Available,
            image: None,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().await.products.insert(product.id, product.clone());
        product
    }

    /// Stores a bare sale header carrying `sale_number`, as if created earlier.
    pub async fn insert_sale_with_number(&self, sale_number: &str) -> Sale {
        let now = Utc::now();
        let sale = Sale {
            id: Uuid::new_v4(),
            sale_number: sale_number.to_string(),
            vendor_id: None,
            customer_name: "Walk-in".to_string(),
            customer_email: None,
            customer_phone: None,
            subtotal: Decimal::ZERO,
            tax: Decimal::ZERO,
            discount: Decimal::ZERO,
            total: Decimal::ZERO,
            payment_method: "cash".to_string(),
            payment_status: PaymentStatus::Paid,
            status: OrderStatus::Completed,
            notes: None,
            created_by_id: Uuid::nil(),
            created_at: now,
            updated_at: now,
        };
        self.state.lock().await.sales.push(sale.clone());
        sale
    }

    // --- Failure injection ---

    pub fn fail_movement_inserts(&self, fail: bool) {
        self.failures.movement_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_audit_writes(&self, fail: bool) {
        self.failures.audit_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_notification_writes(&self, fail: bool) {
        self.failures.notification_writes.store(fail, Ordering::SeqCst);
    }

    // --- Inspection ---

    pub async fn snapshot(&self) -> MemoryState {
        self.state.lock().await.clone()
    }

    pub async fn product(&self, id: Uuid) -> Option<Product> {
        self.state.lock().await.products.get(&id).cloned()
    }

    pub async fn vendor(&self, id: Uuid) -> Option<Vendor> {
        self.state.lock().await.vendors.get(&id).cloned()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    type Tx = MemoryOrderTx;

    async fn begin(&self) -> Result<MemoryOrderTx, AppError> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(MemoryOrderTx {
            guard,
            working,
            failures: self.failures.clone(),
        })
    }

    async fn record_audit(&self, entry: NewAuditLog) -> Result<(), AppError> {
        if self.failures.audit_writes.load(Ordering::SeqCst) {
            return Err(injected("audit write"));
        }
        self.state.lock().await.audit_logs.push(entry);
        Ok(())
    }

    async fn push_notification(&self, notification: NewNotification) -> Result<(), AppError> {
        if self.failures.notification_writes.load(Ordering::SeqCst) {
            return Err(injected("notification write"));
        }
        self.state.lock().await.notifications.push(notification);
        Ok(())
    }
}

#[async_trait]
impl OrderTx for MemoryOrderTx {
    async fn find_vendor(&mut self, id: Uuid) -> Result<Option<Vendor>, AppError> {
        Ok(self.working.vendors.get(&id).cloned())
    }

    async fn find_product(&mut self, id: Uuid) -> Result<Option<Product>, AppError> {
        Ok(self.working.products.get(&id).cloned())
    }

    // The state mutex is already held for the whole transaction.
    async fn lock_product(&mut self, id: Uuid) -> Result<Option<Product>, AppError> {
        Ok(self.working.products.get(&id).cloned())
    }

    async fn last_document_number(&mut self, kind: DocumentKind) -> Result<Option<String>, AppError> {
        let last = match kind {
            DocumentKind::Sale => self.working.sales.last().map(|s| s.sale_number.clone()),
            DocumentKind::Purchase => self
                .working
                .purchases
                .last()
                .map(|p| p.purchase_number.clone()),
        };
        Ok(last)
    }

    async fn insert_sale(&mut self, sale: NewSale) -> Result<Sale, AppError> {
        if self.working.sales.iter().any(|s| s.sale_number == sale.sale_number) {
            return Err(AppError::Conflict(format!(
                "Sale number {} is already taken",
                sale.sale_number
            )));
        }
        let now = Utc::now();
        let row = Sale {
            id: Uuid::new_v4(),
            sale_number: sale.sale_number,
            vendor_id: sale.vendor_id,
            customer_name: sale.customer_name,
            customer_email: sale.customer_email,
            customer_phone: sale.customer_phone,
            subtotal: sale.subtotal,
            tax: sale.tax,
            discount: sale.discount,
            total: sale.total,
            payment_method: sale.payment_method,
            payment_status: sale.payment_status,
            status: OrderStatus::Completed,
            notes: sale.notes,
            created_by_id: sale.created_by_id,
            created_at: now,
            updated_at: now,
        };
        self.working.sales.push(row.clone());
        Ok(row)
    }

    async fn insert_sale_item(&mut self, sale_id: Uuid, item: NewSaleItem) -> Result<SaleItem, AppError> {
        let row = SaleItem {
            id: Uuid::new_v4(),
            sale_id,
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: item.unit_price,
            discount: item.discount,
            subtotal: item.subtotal,
            created_at: Utc::now(),
        };
        self.working.sale_items.push(row.clone());
        Ok(row)
    }

    async fn insert_purchase(&mut self, purchase: NewPurchase) -> Result<Purchase, AppError> {
        if self
            .working
            .purchases
            .iter()
            .any(|p| p.purchase_number == purchase.purchase_number)
        {
            return Err(AppError::Conflict(format!(
                "Purchase number {} is already taken",
                purchase.purchase_number
            )));
        }
        let now = Utc::now();
        let row = Purchase {
            id: Uuid::new_v4(),
            purchase_number: purchase.purchase_number,
            vendor_id: purchase.vendor_id,
            subtotal: purchase.subtotal,
            tax: purchase.tax,
            discount: purchase.discount,
            total: purchase.total,
            payment_method: purchase.payment_method,
            payment_status: purchase.payment_status,
            status: OrderStatus::Completed,
            invoice_number: purchase.invoice_number,
            due_date: purchase.due_date,
            notes: purchase.notes,
            created_by_id: purchase.created_by_id,
            created_at: now,
            updated_at: now,
        };
        self.working.purchases.push(row.clone());
        Ok(row)
    }

    async fn insert_purchase_item(
        &mut self,
        purchase_id: Uuid,
        item: NewPurchaseItem,
    ) -> Result<PurchaseItem, AppError> {
        let row = PurchaseItem {
            id: Uuid::new_v4(),
            purchase_id,
            product_id: item.product_id,
            quantity: item.quantity,
            unit_cost: item.unit_cost,
            subtotal: item.subtotal,
            created_at: Utc::now(),
        };
        self.working.purchase_items.push(row.clone());
        Ok(row)
    }

    async fn update_product_stock(
        &mut self,
        product_id: Uuid,
        new_stock: i32,
        cost: Option<Decimal>,
    ) -> Result<Product, AppError> {
        let product = self
            .working
            .products
            .get_mut(&product_id)
            .ok_or(AppError::ProductNotFound(product_id))?;
        product.stock = new_stock;
        if cost.is_some() {
            product.cost = cost;
        }
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    async fn insert_movement(
        &mut self,
        movement: NewInventoryMovement,
    ) -> Result<InventoryMovement, AppError> {
        if self.failures.movement_inserts.load(Ordering::SeqCst) {
            return Err(injected("movement insert"));
        }
        let row = InventoryMovement {
            id: Uuid::new_v4(),
            product_id: movement.product_id,
            vendor_id: movement.vendor_id,
            movement_type: movement.movement_type,
            quantity: movement.quantity,
            previous_stock: movement.previous_stock,
            new_stock: movement.new_stock,
            reason: Some(movement.reason),
            reference: Some(movement.reference),
            created_at: Utc::now(),
        };
        self.working.movements.push(row.clone());
        Ok(row)
    }

    async fn add_to_vendor_total(
        &mut self,
        vendor_id: Uuid,
        kind: DocumentKind,
        amount: Decimal,
    ) -> Result<(), AppError> {
        // Matches an UPDATE touching zero rows.
        if let Some(vendor) = self.working.vendors.get_mut(&vendor_id) {
            let total = match kind {
                DocumentKind::Sale => &mut vendor.total_sales,
                DocumentKind::Purchase => &mut vendor.total_purchases,
            };
            *total = total.checked_add(amount).ok_or_else(|| {
                AppError::InvalidInput(format!("Total for vendor \"{}\" is out of range", vendor.name))
            })?;
        }
        Ok(())
    }

    async fn commit(self) -> Result<(), AppError> {
        let MemoryOrderTx {
            mut guard, working, ..
        } = self;
        *guard = working;
        Ok(())
    }
}
