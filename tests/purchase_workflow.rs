mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use common::{Fixture, purchase_line, purchase_request, sale_line, sale_request};
use stockbook::{
    common::error::AppError,
    models::{activity::NotificationKind, inventory::MovementType},
};

#[tokio::test]
async fn purchase_increments_stock_and_overwrites_cost() {
    let fx = Fixture::new();
    let vendor = fx.vendor("Acme").await;
    let cable = fx.product(&vendor, "Cable", dec!(9), 4, 10).await;

    let detail = fx
        .service
        .create_purchase(fx.user_id, purchase_request(Some(vendor.id), vec![purchase_line(&cable, 20, dec!(3.25))]))
        .await
        .unwrap();

    assert_eq!(detail.purchase.purchase_number, "COM-00001");
    let product = fx.store.product(cable.id).await.unwrap();
    assert_eq!(product.stock, 24);
    assert_eq!(product.cost, Some(dec!(3.25)));

    let state = fx.store.snapshot().await;
    assert_eq!(state.movements.len(), 1);
    let movement = &state.movements[0];
    assert_eq!(movement.movement_type, MovementType::In);
    assert_eq!(movement.previous_stock, 4);
    assert_eq!(movement.new_stock, 24);
    assert_eq!(movement.reference.as_deref(), Some("COM-00001"));
    assert_eq!(movement.reason.as_deref(), Some("Purchase"));
    assert_eq!(movement.vendor_id, Some(vendor.id));
}

#[tokio::test]
async fn purchase_totals_hold_the_order_identity() {
    let fx = Fixture::new();
    let vendor = fx.vendor("Acme").await;
    let cable = fx.product(&vendor, "Cable", dec!(9), 0, 10).await;
    let plug = fx.product(&vendor, "Plug", dec!(2), 0, 10).await;

    let mut req = purchase_request(
        Some(vendor.id),
        vec![purchase_line(&cable, 10, dec!(3)), purchase_line(&plug, 5, dec!(0.8))],
    );
    req.tax = Some(dec!(2.5));
    req.discount = Some(dec!(1.5));

    let detail = fx.service.create_purchase(fx.user_id, req).await.unwrap();
    let purchase = &detail.purchase;

    let line_sum: Decimal = detail.items.iter().map(|i| i.item.subtotal).sum();
    assert_eq!(purchase.subtotal, dec!(34));
    assert_eq!(purchase.subtotal, line_sum);
    assert_eq!(purchase.total, purchase.subtotal + purchase.tax - purchase.discount);
    assert_eq!(purchase.total, dec!(35));
}

#[tokio::test]
async fn purchases_and_sales_number_independently() {
    let fx = Fixture::new();
    let vendor = fx.vendor("Acme").await;
    let cable = fx.product(&vendor, "Cable", dec!(9), 10, 1).await;

    fx.service
        .create_sale(fx.user_id, sale_request(None, vec![sale_line(&cable, 1, dec!(9))]))
        .await
        .unwrap();

    let first = fx
        .service
        .create_purchase(fx.user_id, purchase_request(Some(vendor.id), vec![purchase_line(&cable, 1, dec!(3))]))
        .await
        .unwrap();
    let second = fx
        .service
        .create_purchase(fx.user_id, purchase_request(Some(vendor.id), vec![purchase_line(&cable, 1, dec!(3))]))
        .await
        .unwrap();

    assert_eq!(first.purchase.purchase_number, "COM-00001");
    assert_eq!(second.purchase.purchase_number, "COM-00002");
}

#[tokio::test]
async fn foreign_product_is_rejected_before_any_write() {
    let fx = Fixture::new();
    let acme = fx.vendor("Acme").await;
    let bolt = fx.vendor("Bolt").await;
    let own = fx.product(&acme, "Cable", dec!(9), 3, 1).await;
    let foreign = fx.product(&bolt, "Screw", dec!(1), 7, 1).await;

    let err = fx
        .service
        .create_purchase(
            fx.user_id,
            purchase_request(Some(acme.id), vec![purchase_line(&own, 5, dec!(3)), purchase_line(&foreign, 5, dec!(0.5))]),
        )
        .await
        .unwrap_err();

    match err {
        AppError::VendorMismatch { product, vendor } => {
            assert_eq!(product, "Screw");
            assert_eq!(vendor, "Acme");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let state = fx.store.snapshot().await;
    assert!(state.purchases.is_empty());
    assert!(state.purchase_items.is_empty());
    assert!(state.movements.is_empty());
    assert_eq!(state.products[&own.id].stock, 3);
    assert_eq!(state.products[&foreign.id].stock, 7);
    assert_eq!(state.vendors[&acme.id].total_purchases, Decimal::ZERO);
}

#[tokio::test]
async fn vendor_is_required_and_must_exist() {
    let fx = Fixture::new();
    let vendor = fx.vendor("Acme").await;
    let cable = fx.product(&vendor, "Cable", dec!(9), 3, 1).await;

    let err = fx
        .service
        .create_purchase(fx.user_id, purchase_request(None, vec![purchase_line(&cable, 1, dec!(3))]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(ref m) if m == "Vendor and items are required"));
    assert!(err.is_client_error());

    let err = fx
        .service
        .create_purchase(fx.user_id, purchase_request(Some(Uuid::new_v4()), vec![purchase_line(&cable, 1, dec!(3))]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::VendorNotFound));
}

#[tokio::test]
async fn purchase_notifies_its_creator() {
    let fx = Fixture::new();
    let vendor = fx.vendor("Acme").await;
    let cable = fx.product(&vendor, "Cable", dec!(9), 0, 1).await;

    let detail = fx
        .service
        .create_purchase(fx.user_id, purchase_request(Some(vendor.id), vec![purchase_line(&cable, 4, dec!(12.5))]))
        .await
        .unwrap();

    let state = fx.store.snapshot().await;
    assert_eq!(state.notifications.len(), 1);
    let note = &state.notifications[0];
    assert_eq!(note.kind, NotificationKind::Success);
    assert_eq!(note.user_id, fx.user_id);
    assert_eq!(note.message, "Purchase COM-00001 recorded for $50.00");
    assert_eq!(note.link, Some(format!("/purchases/{}", detail.purchase.id)));

    assert_eq!(state.audit_logs.len(), 1);
    assert_eq!(state.audit_logs[0].entity_type, "Purchase");
}

#[tokio::test]
async fn vendor_purchases_total_accumulates() {
    let fx = Fixture::new();
    let vendor = fx.vendor("Acme").await;
    let cable = fx.product(&vendor, "Cable", dec!(9), 0, 1).await;

    for cost in [dec!(20), dec!(15.5)] {
        fx.service
            .create_purchase(fx.user_id, purchase_request(Some(vendor.id), vec![purchase_line(&cable, 1, cost)]))
            .await
            .unwrap();
    }

    let stored = fx.store.vendor(vendor.id).await.unwrap();
    assert_eq!(stored.total_purchases, dec!(35.5));
    assert_eq!(stored.total_sales, Decimal::ZERO);
    assert_eq!(fx.store.product(cable.id).await.unwrap().cost, Some(dec!(15.5)));
}

#[tokio::test]
async fn movement_failure_rolls_back_the_purchase() {
    let fx = Fixture::new();
    let vendor = fx.vendor("Acme").await;
    let cable = fx.product(&vendor, "Cable", dec!(9), 2, 1).await;
    fx.store.fail_movement_inserts(true);

    let err = fx
        .service
        .create_purchase(fx.user_id, purchase_request(Some(vendor.id), vec![purchase_line(&cable, 4, dec!(3))]))
        .await
        .unwrap_err();
    assert!(!err.is_client_error());

    let state = fx.store.snapshot().await;
    assert!(state.purchases.is_empty());
    assert_eq!(state.products[&cable.id].stock, 2);
    assert_eq!(state.products[&cable.id].cost, None);
    assert_eq!(state.vendors[&vendor.id].total_purchases, Decimal::ZERO);
    assert!(state.notifications.is_empty());
}

#[tokio::test]
async fn quantity_overflowing_stock_is_rejected_without_writes() {
    let fx = Fixture::new();
    let vendor = fx.vendor("Acme").await;
    let cable = fx.product(&vendor, "Cable", dec!(9), 5, 1).await;

    let err = fx
        .service
        .create_purchase(fx.user_id, purchase_request(Some(vendor.id), vec![purchase_line(&cable, i32::MAX, dec!(0))]))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidInput(_)));
    assert!(err.is_client_error());

    let state = fx.store.snapshot().await;
    assert!(state.purchases.is_empty());
    assert!(state.purchase_items.is_empty());
    assert!(state.movements.is_empty());
    assert_eq!(state.products[&cable.id].stock, 5);
    assert_eq!(state.products[&cable.id].cost, None);
    assert_eq!(state.vendors[&vendor.id].total_purchases, Decimal::ZERO);
}

#[tokio::test]
async fn cost_beyond_decimal_range_is_rejected_without_writes() {
    let fx = Fixture::new();
    let vendor = fx.vendor("Acme").await;
    let cable = fx.product(&vendor, "Cable", dec!(9), 5, 1).await;

    let err = fx
        .service
        .create_purchase(fx.user_id, purchase_request(Some(vendor.id), vec![purchase_line(&cable, 2, Decimal::MAX)]))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidInput(_)));
    let state = fx.store.snapshot().await;
    assert!(state.purchases.is_empty());
    assert_eq!(state.products[&cable.id].stock, 5);
}

#[tokio::test]
async fn vendor_total_overflow_rolls_back_the_purchase() {
    let fx = Fixture::new();
    let vendor = fx.vendor("Acme").await;
    let cable = fx.product(&vendor, "Cable", dec!(9), 0, 1).await;

    fx.service
        .create_purchase(fx.user_id, purchase_request(Some(vendor.id), vec![purchase_line(&cable, 1, Decimal::MAX)]))
        .await
        .unwrap();

    let err = fx
        .service
        .create_purchase(fx.user_id, purchase_request(Some(vendor.id), vec![purchase_line(&cable, 1, Decimal::MAX)]))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidInput(_)));
    let state = fx.store.snapshot().await;
    assert_eq!(state.purchases.len(), 1);
    assert_eq!(state.movements.len(), 1);
    assert_eq!(state.products[&cable.id].stock, 1);
    assert_eq!(state.vendors[&vendor.id].total_purchases, Decimal::MAX);
}
