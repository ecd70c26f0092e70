// src/models/inventory.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "movement_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    In,
    Out,
}

impl MovementType {
    /// Stock level after moving `quantity` units in this direction, or `None`
    /// when the result does not fit the stock column.
    pub fn apply(self, stock: i32, quantity: i32) -> Option<i32> {
        match self {
            MovementType::In => stock.checked_add(quantity),
            MovementType::Out => stock.checked_sub(quantity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_moves_stock_in_both_directions() {
        assert_eq!(MovementType::In.apply(5, 3), Some(8));
        assert_eq!(MovementType::Out.apply(5, 3), Some(2));
    }

    #[test]
    fn apply_refuses_levels_outside_i32() {
        assert_eq!(MovementType::In.apply(5, i32::MAX), None);
        assert_eq!(MovementType::Out.apply(i32::MIN, 1), None);
        assert_eq!(MovementType::In.apply(0, i32::MAX), Some(i32::MAX));
    }
}

// --- STOCK LEDGER ---
// Append-only: rows are written once by the order workflow and never updated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub vendor_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub quantity: i32,
    pub previous_stock: i32,
    pub new_stock: i32,
    pub reason: Option<String>,
    #[schema(example = "VEN-00001")]
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewInventoryMovement {
    pub product_id: Uuid,
    pub vendor_id: Option<Uuid>,
    pub movement_type: MovementType,
    pub quantity: i32,
    pub previous_stock: i32,
    pub new_stock: i32,
    pub reason: String,
    pub reference: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementFilter {
    pub product_id: Option<Uuid>,
    pub limit: Option<i64>,
}
