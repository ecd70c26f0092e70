// src/services/totals.rs

use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    models::orders::{CreatePurchaseItem, CreateSaleItem},
};

#[derive(Debug, Clone, PartialEq)]
pub struct OrderTotals {
    /// One entry per input line, same order.
    pub line_subtotals: Vec<Decimal>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

// Flat amounts, no rounding. A discount larger than the line is allowed and
// yields a negative subtotal. Amounts past what `Decimal` can hold are
// rejected as bad input.
pub fn sale_line_subtotal(item: &CreateSaleItem) -> Result<Decimal, AppError> {
    item.unit_price
        .checked_mul(Decimal::from(item.quantity))
        .and_then(|gross| gross.checked_sub(item.discount.unwrap_or(Decimal::ZERO)))
        .ok_or_else(out_of_range)
}

pub fn purchase_line_subtotal(item: &CreatePurchaseItem) -> Result<Decimal, AppError> {
    item.unit_cost
        .checked_mul(Decimal::from(item.quantity))
        .ok_or_else(out_of_range)
}

fn out_of_range() -> AppError {
    AppError::InvalidInput("Order amounts are out of range".into())
}

fn summarize(
    line_subtotals: Vec<Decimal>,
    tax: Option<Decimal>,
    discount: Option<Decimal>,
) -> Result<OrderTotals, AppError> {
    let subtotal = line_subtotals
        .iter()
        .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(*line))
        .ok_or_else(out_of_range)?;
    let tax = tax.unwrap_or(Decimal::ZERO);
    let discount = discount.unwrap_or(Decimal::ZERO);
    let total = subtotal
        .checked_add(tax)
        .and_then(|t| t.checked_sub(discount))
        .ok_or_else(out_of_range)?;

    Ok(OrderTotals {
        line_subtotals,
        subtotal,
        tax,
        discount,
        total,
    })
}

pub fn sale_totals(
    items: &[CreateSaleItem],
    tax: Option<Decimal>,
    discount: Option<Decimal>,
) -> Result<OrderTotals, AppError> {
    let lines = items.iter().map(sale_line_subtotal).collect::<Result<Vec<_>, _>>()?;
    summarize(lines, tax, discount)
}

pub fn purchase_totals(
    items: &[CreatePurchaseItem],
    tax: Option<Decimal>,
    discount: Option<Decimal>,
) -> Result<OrderTotals, AppError> {
    let lines = items
        .iter()
        .map(purchase_line_subtotal)
        .collect::<Result<Vec<_>, _>>()?;
    summarize(lines, tax, discount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn sale_item(qty: i32, price: Decimal, discount: Option<Decimal>) -> CreateSaleItem {
        CreateSaleItem {
            product_id: Uuid::new_v4(),
            quantity: qty,
            unit_price: price,
            discount,
        }
    }

    #[test]
    fn sale_lines_apply_their_own_discount() {
        let items = vec![
            sale_item(2, dec!(10.00), None),
            sale_item(3, dec!(4.50), Some(dec!(1.50))),
        ];
        let totals = sale_totals(&items, Some(dec!(2.00)), Some(dec!(5.00))).unwrap();

        assert_eq!(totals.line_subtotals, vec![dec!(20.00), dec!(12.00)]);
        assert_eq!(totals.subtotal, dec!(32.00));
        assert_eq!(totals.total, dec!(29.00));
    }

    #[test]
    fn oversized_line_discount_goes_negative() {
        let totals = sale_totals(&[sale_item(1, dec!(5), Some(dec!(8)))], None, None).unwrap();
        assert_eq!(totals.subtotal, dec!(-3));
        assert_eq!(totals.total, dec!(-3));
    }

    #[test]
    fn purchase_lines_are_cost_times_quantity() {
        let items = vec![CreatePurchaseItem {
            product_id: Uuid::new_v4(),
            quantity: 12,
            unit_cost: dec!(18.25),
        }];
        let totals = purchase_totals(&items, Some(dec!(10)), None).unwrap();
        assert_eq!(totals.subtotal, dec!(219.00));
        assert_eq!(totals.discount, Decimal::ZERO);
        assert_eq!(totals.total, dec!(229.00));
    }

    #[test]
    fn decimal_amounts_stay_exact() {
        let totals = sale_totals(&[sale_item(3, dec!(0.1), None)], None, None).unwrap();
        assert_eq!(totals.total, dec!(0.3));
    }

    #[test]
    fn overflowing_amounts_are_rejected() {
        let err = sale_totals(&[sale_item(2, Decimal::MAX, None)], None, None).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let lines = vec![sale_item(1, Decimal::MAX, None), sale_item(1, Decimal::MAX, None)];
        assert!(sale_totals(&lines, None, None).is_err());

        let err = sale_totals(&[sale_item(1, Decimal::MAX, None)], Some(Decimal::MAX), None)
            .unwrap_err();
        assert!(err.is_client_error());

        let item = CreatePurchaseItem {
            product_id: Uuid::new_v4(),
            quantity: i32::MAX,
            unit_cost: Decimal::MAX,
        };
        assert!(purchase_totals(&[item], None, None).is_err());
    }
}
