mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use common::{Fixture, sale_line, sale_request};
use stockbook::{
    common::error::AppError,
    models::{activity::NotificationKind, inventory::MovementType},
};

#[tokio::test]
async fn sale_decrements_stock_and_writes_one_movement_per_line() {
    let fx = Fixture::new();
    let vendor = fx.vendor("Acme").await;
    let mouse = fx.product(&vendor, "Mouse", dec!(25), 20, 5).await;

    let detail = fx
        .service
        .create_sale(fx.user_id, sale_request(Some(vendor.id), vec![sale_line(&mouse, 3, dec!(25))]))
        .await
        .unwrap();

    assert_eq!(detail.sale.sale_number, "VEN-00001");
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.items[0].product.as_ref().unwrap().stock, 17);
    assert_eq!(fx.store.product(mouse.id).await.unwrap().stock, 17);

    let state = fx.store.snapshot().await;
    assert_eq!(state.movements.len(), 1);
    let movement = &state.movements[0];
    assert_eq!(movement.movement_type, MovementType::Out);
    assert_eq!(movement.quantity, 3);
    assert_eq!(movement.previous_stock, 20);
    assert_eq!(movement.new_stock, 17);
    assert_eq!(movement.reference.as_deref(), Some("VEN-00001"));
    assert_eq!(movement.reason.as_deref(), Some("Sale"));
    assert_eq!(movement.vendor_id, Some(vendor.id));
}

#[tokio::test]
async fn sale_totals_hold_the_order_identity() {
    let fx = Fixture::new();
    let vendor = fx.vendor("Acme").await;
    let mouse = fx.product(&vendor, "Mouse", dec!(25), 20, 5).await;
    let cable = fx.product(&vendor, "Cable", dec!(4.5), 50, 5).await;

    let mut discounted = sale_line(&cable, 4, dec!(4.5));
    discounted.discount = Some(dec!(1));
    let mut req = sale_request(Some(vendor.id), vec![sale_line(&mouse, 2, dec!(25)), discounted]);
    req.tax = Some(dec!(6.8));
    req.discount = Some(dec!(3));

    let detail = fx.service.create_sale(fx.user_id, req).await.unwrap();
    let sale = &detail.sale;

    let line_sum: Decimal = detail.items.iter().map(|i| i.item.subtotal).sum();
    assert_eq!(sale.subtotal, dec!(67));
    assert_eq!(sale.subtotal, line_sum);
    assert_eq!(sale.total, sale.subtotal + sale.tax - sale.discount);
    assert_eq!(sale.total, dec!(70.8));
}

#[tokio::test]
async fn sales_are_numbered_sequentially() {
    let fx = Fixture::new();
    let vendor = fx.vendor("Acme").await;
    let mouse = fx.product(&vendor, "Mouse", dec!(10), 100, 5).await;

    let mut numbers = Vec::new();
    for _ in 0..3 {
        let detail = fx
            .service
            .create_sale(fx.user_id, sale_request(None, vec![sale_line(&mouse, 1, dec!(10))]))
            .await
            .unwrap();
        numbers.push(detail.sale.sale_number);
    }

    assert_eq!(numbers, vec!["VEN-00001", "VEN-00002", "VEN-00003"]);
}

#[tokio::test]
async fn numbering_continues_after_existing_sales() {
    let fx = Fixture::new();
    fx.store.insert_sale_with_number("VEN-00041").await;
    let vendor = fx.vendor("Acme").await;
    let mouse = fx.product(&vendor, "Mouse", dec!(10), 10, 2).await;

    let detail = fx
        .service
        .create_sale(fx.user_id, sale_request(None, vec![sale_line(&mouse, 1, dec!(10))]))
        .await
        .unwrap();

    assert_eq!(detail.sale.sale_number, "VEN-00042");
}

#[tokio::test]
async fn malformed_previous_number_fails_without_writes() {
    let fx = Fixture::new();
    fx.store.insert_sale_with_number("VEN-00X12").await;
    let vendor = fx.vendor("Acme").await;
    let mouse = fx.product(&vendor, "Mouse", dec!(10), 10, 2).await;

    let err = fx
        .service
        .create_sale(fx.user_id, sale_request(None, vec![sale_line(&mouse, 1, dec!(10))]))
        .await
        .unwrap_err();

    assert!(matches!(err.cause(), AppError::CorruptDocumentNumber(n) if n == "VEN-00X12"));
    assert!(!err.is_client_error());
    let state = fx.store.snapshot().await;
    assert_eq!(state.sales.len(), 1);
    assert!(state.movements.is_empty());
    assert_eq!(fx.store.product(mouse.id).await.unwrap().stock, 10);
}

#[tokio::test]
async fn low_stock_then_out_of_stock_notifications() {
    let fx = Fixture::new();
    let vendor = fx.vendor("Acme").await;
    let widget = fx.product(&vendor, "Widget", dec!(10), 5, 2).await;

    fx.service
        .create_sale(fx.user_id, sale_request(Some(vendor.id), vec![sale_line(&widget, 4, dec!(10))]))
        .await
        .unwrap();

    let state = fx.store.snapshot().await;
    assert_eq!(state.notifications.len(), 1);
    let low = &state.notifications[0];
    assert_eq!(low.kind, NotificationKind::Warning);
    assert_eq!(low.title, "Low stock");
    assert_eq!(low.message, "Product \"Widget\" is running low (1/2)");
    assert_eq!(low.user_id, fx.user_id);

    fx.service
        .create_sale(fx.user_id, sale_request(Some(vendor.id), vec![sale_line(&widget, 1, dec!(10))]))
        .await
        .unwrap();

    let state = fx.store.snapshot().await;
    assert_eq!(state.notifications.len(), 2);
    let out = &state.notifications[1];
    assert_eq!(out.kind, NotificationKind::Error);
    assert_eq!(out.title, "Out of stock");
    assert_eq!(fx.store.product(widget.id).await.unwrap().stock, 0);
}

#[tokio::test]
async fn healthy_stock_emits_no_notification() {
    let fx = Fixture::new();
    let vendor = fx.vendor("Acme").await;
    let widget = fx.product(&vendor, "Widget", dec!(10), 50, 10).await;

    fx.service
        .create_sale(fx.user_id, sale_request(None, vec![sale_line(&widget, 5, dec!(10))]))
        .await
        .unwrap();

    assert!(fx.store.snapshot().await.notifications.is_empty());
}

#[tokio::test]
async fn insufficient_stock_rejects_without_mutation() {
    let fx = Fixture::new();
    let vendor = fx.vendor("Acme").await;
    let mouse = fx.product(&vendor, "Wireless Mouse", dec!(25), 3, 1).await;

    let err = fx
        .service
        .create_sale(fx.user_id, sale_request(Some(vendor.id), vec![sale_line(&mouse, 4, dec!(25))]))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InsufficientStock { available: 3, .. }));
    assert!(err.to_string().contains("Wireless Mouse"));

    let state = fx.store.snapshot().await;
    assert!(state.sales.is_empty());
    assert!(state.sale_items.is_empty());
    assert!(state.movements.is_empty());
    assert_eq!(state.products[&mouse.id].stock, 3);
    assert_eq!(state.vendors[&vendor.id].total_sales, Decimal::ZERO);
}

#[tokio::test]
async fn repeated_product_lines_are_checked_together() {
    let fx = Fixture::new();
    let vendor = fx.vendor("Acme").await;
    let mouse = fx.product(&vendor, "Mouse", dec!(25), 5, 1).await;

    let err = fx
        .service
        .create_sale(
            fx.user_id,
            sale_request(None, vec![sale_line(&mouse, 3, dec!(25)), sale_line(&mouse, 3, dec!(25))]),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InsufficientStock { .. }));
    assert_eq!(fx.store.product(mouse.id).await.unwrap().stock, 5);
}

#[tokio::test]
async fn product_from_another_vendor_is_rejected() {
    let fx = Fixture::new();
    let acme = fx.vendor("Acme").await;
    let bolt = fx.vendor("Bolt").await;
    let screw = fx.product(&bolt, "Screw", dec!(1), 100, 10).await;

    let err = fx
        .service
        .create_sale(fx.user_id, sale_request(Some(acme.id), vec![sale_line(&screw, 1, dec!(1))]))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::VendorMismatch { .. }));
    assert!(fx.store.snapshot().await.sales.is_empty());
}

#[tokio::test]
async fn unknown_vendor_or_product_is_not_found() {
    let fx = Fixture::new();
    let vendor = fx.vendor("Acme").await;
    let mouse = fx.product(&vendor, "Mouse", dec!(25), 5, 1).await;

    let err = fx
        .service
        .create_sale(fx.user_id, sale_request(Some(Uuid::new_v4()), vec![sale_line(&mouse, 1, dec!(25))]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::VendorNotFound));

    let mut ghost = sale_line(&mouse, 1, dec!(25));
    ghost.product_id = Uuid::new_v4();
    let err = fx
        .service
        .create_sale(fx.user_id, sale_request(None, vec![ghost]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ProductNotFound(_)));
}

#[tokio::test]
async fn missing_fields_are_rejected_as_bad_request() {
    let fx = Fixture::new();
    let vendor = fx.vendor("Acme").await;
    let mouse = fx.product(&vendor, "Mouse", dec!(25), 5, 1).await;

    let mut no_customer = sale_request(None, vec![sale_line(&mouse, 1, dec!(25))]);
    no_customer.customer_name = "  ".to_string();
    let err = fx.service.create_sale(fx.user_id, no_customer).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    let err = fx
        .service
        .create_sale(fx.user_id, sale_request(None, Vec::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    let mut no_payment = sale_request(None, vec![sale_line(&mouse, 1, dec!(25))]);
    no_payment.payment_method = String::new();
    let err = fx.service.create_sale(fx.user_id, no_payment).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(ref m) if m == "Payment method is required"));

    let err = fx
        .service
        .create_sale(fx.user_id, sale_request(None, vec![sale_line(&mouse, 0, dec!(25))]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}

#[tokio::test]
async fn vendor_sales_total_accumulates() {
    let fx = Fixture::new();
    let vendor = fx.vendor("Acme").await;
    let widget = fx.product(&vendor, "Widget", dec!(10), 100, 5).await;

    fx.service
        .create_sale(fx.user_id, sale_request(Some(vendor.id), vec![sale_line(&widget, 5, dec!(10))]))
        .await
        .unwrap();
    let detail = fx
        .service
        .create_sale(fx.user_id, sale_request(Some(vendor.id), vec![sale_line(&widget, 3, dec!(10))]))
        .await
        .unwrap();

    assert_eq!(detail.vendor.as_ref().unwrap().total_sales, dec!(80));
    assert_eq!(fx.store.vendor(vendor.id).await.unwrap().total_sales, dec!(80));
}

#[tokio::test]
async fn sale_without_vendor_leaves_aggregates_alone() {
    let fx = Fixture::new();
    let vendor = fx.vendor("Acme").await;
    let widget = fx.product(&vendor, "Widget", dec!(10), 100, 5).await;

    let detail = fx
        .service
        .create_sale(fx.user_id, sale_request(None, vec![sale_line(&widget, 2, dec!(10))]))
        .await
        .unwrap();

    assert!(detail.vendor.is_none());
    assert_eq!(fx.store.vendor(vendor.id).await.unwrap().total_sales, Decimal::ZERO);
}

#[tokio::test]
async fn failed_side_effects_do_not_fail_the_sale() {
    let fx = Fixture::new();
    fx.store.fail_audit_writes(true);
    fx.store.fail_notification_writes(true);
    let vendor = fx.vendor("Acme").await;
    let widget = fx.product(&vendor, "Widget", dec!(10), 5, 2).await;

    let detail = fx
        .service
        .create_sale(fx.user_id, sale_request(Some(vendor.id), vec![sale_line(&widget, 4, dec!(10))]))
        .await
        .unwrap();

    assert_eq!(detail.sale.sale_number, "VEN-00001");
    let state = fx.store.snapshot().await;
    assert_eq!(state.sales.len(), 1);
    assert!(state.audit_logs.is_empty());
    assert!(state.notifications.is_empty());
}

#[tokio::test]
async fn sale_is_audited_after_commit() {
    let fx = Fixture::new();
    let vendor = fx.vendor("Acme").await;
    let widget = fx.product(&vendor, "Widget", dec!(10), 50, 2).await;

    let detail = fx
        .service
        .create_sale(fx.user_id, sale_request(None, vec![sale_line(&widget, 1, dec!(10))]))
        .await
        .unwrap();

    let state = fx.store.snapshot().await;
    assert_eq!(state.audit_logs.len(), 1);
    let entry = &state.audit_logs[0];
    assert_eq!(entry.action, "CREATE");
    assert_eq!(entry.entity_type, "Sale");
    assert_eq!(entry.entity_id, Some(detail.sale.id.to_string()));
    assert_eq!(entry.details.as_ref().unwrap()["saleNumber"], "VEN-00001");
}

#[tokio::test]
async fn persistence_failure_rolls_back_the_whole_sale() {
    let fx = Fixture::new();
    let vendor = fx.vendor("Acme").await;
    let widget = fx.product(&vendor, "Widget", dec!(10), 10, 2).await;
    fx.store.fail_movement_inserts(true);

    let err = fx
        .service
        .create_sale(fx.user_id, sale_request(Some(vendor.id), vec![sale_line(&widget, 2, dec!(10))]))
        .await
        .unwrap_err();
    assert!(!err.is_client_error());
    assert!(matches!(err, AppError::Reported(_)));

    let state = fx.store.snapshot().await;
    assert!(state.sales.is_empty());
    assert!(state.sale_items.is_empty());
    assert!(state.movements.is_empty());
    assert_eq!(state.products[&widget.id].stock, 10);
    assert_eq!(state.vendors[&vendor.id].total_sales, Decimal::ZERO);
    assert!(state.audit_logs.is_empty());

    // The failed attempt did not consume a number.
    fx.store.fail_movement_inserts(false);
    let detail = fx
        .service
        .create_sale(fx.user_id, sale_request(Some(vendor.id), vec![sale_line(&widget, 2, dec!(10))]))
        .await
        .unwrap();
    assert_eq!(detail.sale.sale_number, "VEN-00001");
}

#[tokio::test]
async fn concurrent_sales_never_oversell() {
    let fx = Fixture::new();
    let vendor = fx.vendor("Acme").await;
    let widget = fx.product(&vendor, "Widget", dec!(10), 5, 0).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = fx.service.clone();
        let req = sale_request(None, vec![sale_line(&widget, 1, dec!(10))]);
        let user_id = fx.user_id;
        handles.push(tokio::spawn(async move { service.create_sale(user_id, req).await }));
    }

    let mut ok = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            ok += 1;
        }
    }

    assert_eq!(ok, 5);
    let state = fx.store.snapshot().await;
    assert_eq!(state.products[&widget.id].stock, 0);
    let mut numbers: Vec<_> = state.sales.iter().map(|s| s.sale_number.clone()).collect();
    numbers.sort();
    numbers.dedup();
    assert_eq!(numbers.len(), 5);
}

#[tokio::test]
async fn amounts_beyond_decimal_range_are_rejected_without_writes() {
    let fx = Fixture::new();
    let vendor = fx.vendor("Acme").await;
    let gold = fx.product(&vendor, "Gold", dec!(10), 10, 1).await;

    let err = fx
        .service
        .create_sale(fx.user_id, sale_request(Some(vendor.id), vec![sale_line(&gold, 2, Decimal::MAX)]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
    assert!(err.is_client_error());

    let mut taxed = sale_request(Some(vendor.id), vec![sale_line(&gold, 1, Decimal::MAX)]);
    taxed.tax = Some(Decimal::MAX);
    let err = fx.service.create_sale(fx.user_id, taxed).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    let state = fx.store.snapshot().await;
    assert!(state.sales.is_empty());
    assert!(state.sale_items.is_empty());
    assert!(state.movements.is_empty());
    assert_eq!(state.products[&gold.id].stock, 10);
    assert_eq!(state.vendors[&vendor.id].total_sales, Decimal::ZERO);
}

#[tokio::test]
async fn oversized_quantity_is_a_stock_rejection() {
    let fx = Fixture::new();
    let vendor = fx.vendor("Acme").await;
    let widget = fx.product(&vendor, "Widget", dec!(1), 5, 1).await;

    let err = fx
        .service
        .create_sale(fx.user_id, sale_request(None, vec![sale_line(&widget, i32::MAX, dec!(1))]))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InsufficientStock { available: 5, .. }));
    assert_eq!(fx.store.product(widget.id).await.unwrap().stock, 5);
}
