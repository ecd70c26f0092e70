// Shared fixtures for the order workflow tests.
#![allow(dead_code)]

use rust_decimal::Decimal;
use uuid::Uuid;

use stockbook::{
    db::MemoryOrderStore,
    models::{
        orders::{
            CreatePurchaseItem, CreatePurchaseRequest, CreateSaleItem, CreateSaleRequest,
            PaymentStatus,
        },
        product::Product,
        vendor::Vendor,
    },
    services::order_service::OrderService,
};

pub struct Fixture {
    pub store: MemoryOrderStore,
    pub service: OrderService<MemoryOrderStore>,
    pub user_id: Uuid,
}

impl Fixture {
    pub fn new() -> Self {
        let store = MemoryOrderStore::new();
        Self {
            service: OrderService::new(store.clone()),
            store,
            user_id: Uuid::new_v4(),
        }
    }

    pub async fn vendor(&self, name: &str) -> Vendor {
        self.store.insert_vendor(name).await
    }

    pub async fn product(&self, vendor: &Vendor, name: &str, price: Decimal, stock: i32, min_stock: i32) -> Product {
        self.store
            .insert_product(vendor.id, name, price, stock, min_stock)
            .await
    }
}

pub fn sale_line(product: &Product, quantity: i32, unit_price: Decimal) -> CreateSaleItem {
    CreateSaleItem {
        product_id: product.id,
        quantity,
        unit_price,
        discount: None,
    }
}

pub fn sale_request(vendor_id: Option<Uuid>, items: Vec<CreateSaleItem>) -> CreateSaleRequest {
    CreateSaleRequest {
        vendor_id,
        customer_name: "Jane Doe".to_string(),
        customer_email: Some("jane@example.com".to_string()),
        customer_phone: None,
        items,
        payment_method: "cash".to_string(),
        payment_status: PaymentStatus::Paid,
        notes: None,
        tax: None,
        discount: None,
    }
}

pub fn purchase_line(product: &Product, quantity: i32, unit_cost: Decimal) -> CreatePurchaseItem {
    CreatePurchaseItem {
        product_id: product.id,
        quantity,
        unit_cost,
    }
}

pub fn purchase_request(vendor_id: Option<Uuid>, items: Vec<CreatePurchaseItem>) -> CreatePurchaseRequest {
    CreatePurchaseRequest {
        vendor_id,
        items,
        payment_method: "transfer".to_string(),
        payment_status: PaymentStatus::Pending,
        invoice_number: Some("INV-77".to_string()),
        due_date: None,
        notes: None,
        tax: None,
        discount: None,
    }
}
