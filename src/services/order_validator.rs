// src/services/order_validator.rs
//
// Read-and-check pass run before an order touches anything. Check order:
// required fields, vendor, then per line: product exists, product belongs
// to the vendor, enough stock (sales only). The first failure wins.

use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::OrderTx,
    models::{
        orders::{CreatePurchaseRequest, CreateSaleRequest},
        product::Product,
        vendor::Vendor,
    },
};

/// Everything the workflow needs from the validation reads.
#[derive(Debug, Clone)]
pub struct ValidatedOrder {
    pub vendor: Option<Vendor>,
    /// Same order as the request lines.
    pub products: Vec<Product>,
}

// --- Required fields (no store access) ---

pub fn check_sale_fields(req: &CreateSaleRequest) -> Result<(), AppError> {
    if req.customer_name.trim().is_empty() || req.items.is_empty() {
        return Err(AppError::InvalidInput(
            "Customer name and items are required".into(),
        ));
    }
    check_payment_method(&req.payment_method)
}

pub fn check_purchase_fields(req: &CreatePurchaseRequest) -> Result<Uuid, AppError> {
    let vendor_id = match req.vendor_id {
        Some(id) if !req.items.is_empty() => id,
        _ => return Err(AppError::InvalidInput("Vendor and items are required".into())),
    };
    check_payment_method(&req.payment_method)?;
    Ok(vendor_id)
}

fn check_payment_method(method: &str) -> Result<(), AppError> {
    if method.trim().is_empty() {
        return Err(AppError::InvalidInput("Payment method is required".into()));
    }
    Ok(())
}

// --- Referential checks ---

async fn load_vendor<T: OrderTx>(tx: &mut T, vendor_id: Uuid) -> Result<Vendor, AppError> {
    tx.find_vendor(vendor_id).await?.ok_or(AppError::VendorNotFound)
}

async fn load_product<T: OrderTx>(
    tx: &mut T,
    product_id: Uuid,
    vendor: Option<&Vendor>,
) -> Result<Product, AppError> {
    let product = tx
        .find_product(product_id)
        .await?
        .ok_or(AppError::ProductNotFound(product_id))?;

    if let Some(vendor) = vendor {
        if product.vendor_id != vendor.id {
            return Err(AppError::VendorMismatch {
                product: product.name,
                vendor: vendor.name.clone(),
            });
        }
    }
    Ok(product)
}

pub async fn validate_sale<T: OrderTx>(
    tx: &mut T,
    req: &CreateSaleRequest,
) -> Result<ValidatedOrder, AppError> {
    check_sale_fields(req)?;

    let vendor = match req.vendor_id {
        Some(id) => Some(load_vendor(tx, id).await?),
        None => None,
    };

    // A product listed on several lines must cover the sum of them.
    let mut requested: HashMap<Uuid, i32> = HashMap::new();
    let mut products = Vec::with_capacity(req.items.len());

    for item in &req.items {
        let product = load_product(tx, item.product_id, vendor.as_ref()).await?;

        let wanted = requested.entry(product.id).or_insert(0);
        *wanted = wanted.saturating_add(item.quantity);
        if *wanted > product.stock {
            return Err(AppError::insufficient_stock(&product.name, product.stock));
        }
        products.push(product);
    }

    Ok(ValidatedOrder { vendor, products })
}

pub async fn validate_purchase<T: OrderTx>(
    tx: &mut T,
    req: &CreatePurchaseRequest,
) -> Result<ValidatedOrder, AppError> {
    let vendor_id = check_purchase_fields(req)?;
    let vendor = load_vendor(tx, vendor_id).await?;

    let mut products = Vec::with_capacity(req.items.len());
    for item in &req.items {
        products.push(load_product(tx, item.product_id, Some(&vendor)).await?);
    }

    Ok(ValidatedOrder {
        vendor: Some(vendor),
        products,
    })
}
