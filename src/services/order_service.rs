// src/services/order_service.rs
//
// Sale and purchase recording. Validation, numbering, totals, header and
// lines, stock, ledger and vendor totals all go through one `OrderTx` and
// land together or not at all. Notifications and the audit entry are
// written after the commit and never fail the order.

use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{AppError, display_amount},
    db::{OrderStore, OrderTx},
    models::{
        activity::{NewAuditLog, NewNotification, NotificationKind},
        inventory::MovementType,
        orders::{
            CreatePurchaseRequest, CreateSaleRequest, DocumentKind, NewPurchase, NewPurchaseItem,
            NewSale, NewSaleItem, PurchaseDetail, PurchaseItemDetail, SaleDetail, SaleItemDetail,
        },
        product::Product,
    },
    services::{
        inventory_service::{StockAlert, StockChange, apply_stock_change},
        numbering::next_document_number,
        order_validator::{
            check_purchase_fields, check_sale_fields, validate_purchase, validate_sale,
        },
        totals::{purchase_totals, sale_totals},
    },
};

const SALE_REASON: &str = "Sale";
const PURCHASE_REASON: &str = "Purchase";

#[derive(Clone)]
pub struct OrderService<S: OrderStore> {
    store: S,
}

// Result of the transactional part, before side effects.
struct Recorded<D> {
    detail: D,
    alerts: Vec<(Product, StockAlert)>,
}

impl<S: OrderStore> OrderService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // =========================================================================
    //  SALES
    // =========================================================================

    pub async fn create_sale(
        &self,
        created_by: Uuid,
        req: CreateSaleRequest,
    ) -> Result<SaleDetail, AppError> {
        if let Err(e) = req.validate().map_err(AppError::from).and_then(|_| check_sale_fields(&req)) {
            tracing::info!(error = %e, "Sale rejected");
            return Err(e);
        }

        let mut tx = self.store.begin().await?;
        let mut number = None;

        let recorded = match self.record_sale(&mut tx, created_by, &req, &mut number).await {
            Ok(recorded) => recorded,
            Err(e) => return Err(log_failure(DocumentKind::Sale, number.as_deref(), e)),
        };
        if let Err(e) = tx.commit().await {
            return Err(log_failure(DocumentKind::Sale, number.as_deref(), e));
        }

        let sale = &recorded.detail.sale;
        tracing::info!(
            sale_number = %sale.sale_number,
            total = %sale.total,
            lines = recorded.detail.items.len(),
            "Sale recorded"
        );

        // Side effects: best effort
        for (product, alert) in &recorded.alerts {
            self.notify(stock_notification(created_by, product, *alert)).await;
        }
        self.audit(
            NewAuditLog::new(created_by, "CREATE", "Sale", Some(sale.id.to_string())).with_details(
                json!({
                    "saleNumber": sale.sale_number,
                    "total": sale.total,
                    "customerName": sale.customer_name,
                }),
            ),
        )
        .await;

        Ok(recorded.detail)
    }

    async fn record_sale(
        &self,
        tx: &mut S::Tx,
        created_by: Uuid,
        req: &CreateSaleRequest,
        number: &mut Option<String>,
    ) -> Result<Recorded<SaleDetail>, AppError> {
        // 1. Validation reads
        let validated = validate_sale(&mut *tx, req).await?;

        // 2. Number, under the numbering lock
        let last = tx.last_document_number(DocumentKind::Sale).await?;
        let sale_number = next_document_number(DocumentKind::Sale, last.as_deref())?;
        *number = Some(sale_number.clone());

        // 3. Totals
        let totals = sale_totals(&req.items, req.tax, req.discount)?;

        // 4. Header and lines
        let sale = tx
            .insert_sale(NewSale {
                sale_number: sale_number.clone(),
                vendor_id: req.vendor_id,
                customer_name: req.customer_name.trim().to_string(),
                customer_email: req.customer_email.clone(),
                customer_phone: req.customer_phone.clone(),
                subtotal: totals.subtotal,
                tax: totals.tax,
                discount: totals.discount,
                total: totals.total,
                payment_method: req.payment_method.clone(),
                payment_status: req.payment_status,
                notes: req.notes.clone(),
                created_by_id: created_by,
            })
            .await?;

        let mut lines = Vec::with_capacity(req.items.len());
        for (item, subtotal) in req.items.iter().zip(&totals.line_subtotals) {
            let row = tx
                .insert_sale_item(
                    sale.id,
                    NewSaleItem {
                        product_id: item.product_id,
                        quantity: item.quantity,
                        unit_price: item.unit_price,
                        discount: item.discount.unwrap_or(Decimal::ZERO),
                        subtotal: *subtotal,
                    },
                )
                .await?;
            lines.push(row);
        }

        // 5. Stock and ledger, one movement per line
        let mut items = Vec::with_capacity(lines.len());
        let mut alerts = Vec::new();
        for (line, product) in lines.into_iter().zip(&validated.products) {
            let applied = apply_stock_change(
                &mut *tx,
                StockChange {
                    product_id: line.product_id,
                    movement_type: MovementType::Out,
                    quantity: line.quantity,
                    unit_cost: None,
                    vendor_id: Some(product.vendor_id),
                    reason: SALE_REASON,
                    reference: &sale_number,
                },
            )
            .await?;

            if let Some(alert) = StockAlert::classify(applied.product.stock, applied.product.min_stock) {
                alerts.push((applied.product.clone(), alert));
            }
            items.push(SaleItemDetail {
                item: line,
                product: Some(applied.product),
            });
        }

        // 6. Vendor running total
        let vendor = match req.vendor_id {
            Some(vendor_id) => {
                tx.add_to_vendor_total(vendor_id, DocumentKind::Sale, totals.total)
                    .await?;
                tx.find_vendor(vendor_id).await?
            }
            None => None,
        };

        Ok(Recorded {
            detail: SaleDetail { sale, vendor, items },
            alerts,
        })
    }

    // =========================================================================
    //  PURCHASES
    // =========================================================================

    pub async fn create_purchase(
        &self,
        created_by: Uuid,
        req: CreatePurchaseRequest,
    ) -> Result<PurchaseDetail, AppError> {
        if let Err(e) = req
            .validate()
            .map_err(AppError::from)
            .and_then(|_| check_purchase_fields(&req).map(|_| ()))
        {
            tracing::info!(error = %e, "Purchase rejected");
            return Err(e);
        }

        let mut tx = self.store.begin().await?;
        let mut number = None;

        let recorded = match self.record_purchase(&mut tx, created_by, &req, &mut number).await {
            Ok(recorded) => recorded,
            Err(e) => return Err(log_failure(DocumentKind::Purchase, number.as_deref(), e)),
        };
        if let Err(e) = tx.commit().await {
            return Err(log_failure(DocumentKind::Purchase, number.as_deref(), e));
        }

        let purchase = &recorded.detail.purchase;
        tracing::info!(
            purchase_number = %purchase.purchase_number,
            total = %purchase.total,
            lines = recorded.detail.items.len(),
            "Purchase recorded"
        );

        self.notify(NewNotification {
            user_id: created_by,
            kind: NotificationKind::Success,
            title: "Purchase recorded".into(),
            message: format!(
                "Purchase {} recorded for ${}",
                purchase.purchase_number,
                display_amount(purchase.total)
            ),
            link: Some(format!("/purchases/{}", purchase.id)),
        })
        .await;
        self.audit(
            NewAuditLog::new(created_by, "CREATE", "Purchase", Some(purchase.id.to_string()))
                .with_details(json!({
                    "purchaseNumber": purchase.purchase_number,
                    "total": purchase.total,
                    "vendorId": purchase.vendor_id,
                })),
        )
        .await;

        Ok(recorded.detail)
    }

    async fn record_purchase(
        &self,
        tx: &mut S::Tx,
        created_by: Uuid,
        req: &CreatePurchaseRequest,
        number: &mut Option<String>,
    ) -> Result<Recorded<PurchaseDetail>, AppError> {
        // 1. Validation reads
        let validated = validate_purchase(&mut *tx, req).await?;
        let vendor_id = validated
            .vendor
            .as_ref()
            .map(|v| v.id)
            .ok_or(AppError::VendorNotFound)?;

        // 2. Number
        let last = tx.last_document_number(DocumentKind::Purchase).await?;
        let purchase_number = next_document_number(DocumentKind::Purchase, last.as_deref())?;
        *number = Some(purchase_number.clone());

        // 3. Totals
        let totals = purchase_totals(&req.items, req.tax, req.discount)?;

        // 4. Header and lines
        let purchase = tx
            .insert_purchase(NewPurchase {
                purchase_number: purchase_number.clone(),
                vendor_id,
                subtotal: totals.subtotal,
                tax: totals.tax,
                discount: totals.discount,
                total: totals.total,
                payment_method: req.payment_method.clone(),
                payment_status: req.payment_status,
                invoice_number: req.invoice_number.clone(),
                due_date: req.due_date,
                notes: req.notes.clone(),
                created_by_id: created_by,
            })
            .await?;

        let mut lines = Vec::with_capacity(req.items.len());
        for (item, subtotal) in req.items.iter().zip(&totals.line_subtotals) {
            let row = tx
                .insert_purchase_item(
                    purchase.id,
                    NewPurchaseItem {
                        product_id: item.product_id,
                        quantity: item.quantity,
                        unit_cost: item.unit_cost,
                        subtotal: *subtotal,
                    },
                )
                .await?;
            lines.push(row);
        }

        // 5. Stock in, cost overwritten with the line's unit cost
        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let applied = apply_stock_change(
                &mut *tx,
                StockChange {
                    product_id: line.product_id,
                    movement_type: MovementType::In,
                    quantity: line.quantity,
                    unit_cost: Some(line.unit_cost),
                    vendor_id: Some(vendor_id),
                    reason: PURCHASE_REASON,
                    reference: &purchase_number,
                },
            )
            .await?;
            items.push(PurchaseItemDetail {
                item: line,
                product: Some(applied.product),
            });
        }

        // 6. Vendor running total
        tx.add_to_vendor_total(vendor_id, DocumentKind::Purchase, totals.total)
            .await?;
        let vendor = tx.find_vendor(vendor_id).await?;

        Ok(Recorded {
            detail: PurchaseDetail {
                purchase,
                vendor,
                items,
            },
            alerts: Vec::new(),
        })
    }

    // =========================================================================
    //  SIDE EFFECTS
    // =========================================================================

    async fn notify(&self, notification: NewNotification) {
        let title = notification.title.clone();
        if let Err(e) = self.store.push_notification(notification).await {
            tracing::warn!(error = %e, title = %title, "Notification could not be stored");
        }
    }

    async fn audit(&self, entry: NewAuditLog) {
        let action = format!("{} {}", entry.action, entry.entity_type);
        if let Err(e) = self.store.record_audit(entry).await {
            tracing::warn!(error = %e, action = %action, "Audit entry could not be stored");
        }
    }
}

fn stock_notification(user_id: Uuid, product: &Product, alert: StockAlert) -> NewNotification {
    let link = Some(format!("/products?search={}", product.name));
    match alert {
        StockAlert::Low => NewNotification {
            user_id,
            kind: NotificationKind::Warning,
            title: "Low stock".into(),
            message: format!(
                "Product \"{}\" is running low ({}/{})",
                product.name, product.stock, product.min_stock
            ),
            link,
        },
        StockAlert::Out => NewNotification {
            user_id,
            kind: NotificationKind::Error,
            title: "Out of stock".into(),
            message: format!("Product \"{}\" is out of stock", product.name),
            link,
        },
    }
}

// Rejections are routine; anything else means the transaction was rolled back.
// The rollback is logged here, with the document number, and marked as
// reported so the HTTP layer does not log it a second time.
fn log_failure(kind: DocumentKind, number: Option<&str>, error: AppError) -> AppError {
    if error.is_client_error() {
        tracing::info!(order = kind.entity_name(), error = %error, "Order rejected");
        error
    } else {
        tracing::error!(
            order = kind.entity_name(),
            number = number.unwrap_or("-"),
            error = %error,
            "Order rolled back"
        );
        error.reported()
    }
}
