// src/services/inventory_service.rs

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{InventoryRepository, OrderTx},
    models::{
        inventory::{InventoryMovement, MovementFilter, MovementType, NewInventoryMovement},
        product::Product,
    },
};

/// What a stock level means for the people watching the product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockAlert {
    Low,
    Out,
}

impl StockAlert {
    /// `Out` at zero or below; `Low` while still positive but at or under the minimum.
    pub fn classify(new_stock: i32, min_stock: i32) -> Option<StockAlert> {
        if new_stock <= 0 {
            Some(StockAlert::Out)
        } else if new_stock <= min_stock {
            Some(StockAlert::Low)
        } else {
            None
        }
    }
}

/// A single line's stock change, as requested by the order workflow.
#[derive(Debug, Clone)]
pub struct StockChange<'a> {
    pub product_id: Uuid,
    pub movement_type: MovementType,
    pub quantity: i32,
    /// Overwrites the product's cost (purchases).
    pub unit_cost: Option<Decimal>,
    /// Vendor recorded on the ledger row.
    pub vendor_id: Option<Uuid>,
    pub reason: &'a str,
    pub reference: &'a str,
}

#[derive(Debug, Clone)]
pub struct AppliedChange {
    pub product: Product,
    pub movement: InventoryMovement,
}

// --- STOCK MUTATION (inside the order transaction) ---
// 1. Lock and re-read the product
// 2. Re-check stock for outgoing movements
// 3. Persist the new level (and cost)
// 4. Append the ledger row
pub async fn apply_stock_change<T: OrderTx>(
    tx: &mut T,
    change: StockChange<'_>,
) -> Result<AppliedChange, AppError> {
    let current = tx
        .lock_product(change.product_id)
        .await?
        .ok_or(AppError::ProductNotFound(change.product_id))?;

    if change.movement_type == MovementType::Out && current.stock < change.quantity {
        return Err(AppError::insufficient_stock(&current.name, current.stock));
    }

    let previous_stock = current.stock;
    let new_stock = change
        .movement_type
        .apply(previous_stock, change.quantity)
        .ok_or_else(|| {
            AppError::InvalidInput(format!(
                "Quantity {} for product \"{}\" is out of range",
                change.quantity, current.name
            ))
        })?;

    let product = tx
        .update_product_stock(change.product_id, new_stock, change.unit_cost)
        .await?;

    let movement = tx
        .insert_movement(NewInventoryMovement {
            product_id: change.product_id,
            vendor_id: change.vendor_id,
            movement_type: change.movement_type,
            quantity: change.quantity,
            previous_stock,
            new_stock,
            reason: change.reason.to_string(),
            reference: change.reference.to_string(),
        })
        .await?;

    Ok(AppliedChange { product, movement })
}

// --- LEDGER READS ---

#[derive(Clone)]
pub struct InventoryService {
    inventory_repo: InventoryRepository,
}

impl InventoryService {
    pub fn new(inventory_repo: InventoryRepository) -> Self {
        Self { inventory_repo }
    }

    pub async fn list_movements(
        &self,
        filter: &MovementFilter,
    ) -> Result<Vec<InventoryMovement>, AppError> {
        self.inventory_repo.list_movements(filter).await
    }
}
