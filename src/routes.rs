// src/routes.rs

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn build_router(app_state: AppState) -> Router {
    // Public
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Protected (auth_guard), role checks happen per handler
    let session_routes = Router::new()
        .route("/logout", post(handlers::auth::logout))
        .route("/me", get(handlers::auth::get_me));

    let vendor_routes = Router::new()
        .route(
            "/",
            get(handlers::vendors::list_vendors).post(handlers::vendors::create_vendor),
        )
        .route(
            "/{id}",
            get(handlers::vendors::get_vendor)
                .put(handlers::vendors::update_vendor)
                .delete(handlers::vendors::delete_vendor),
        );

    let product_routes = Router::new()
        .route(
            "/",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/{id}",
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        );

    let sales_routes = Router::new()
        .route(
            "/",
            get(handlers::sales::list_sales).post(handlers::sales::create_sale),
        )
        .route("/{id}", get(handlers::sales::get_sale));

    let purchase_routes = Router::new()
        .route(
            "/",
            get(handlers::purchases::list_purchases).post(handlers::purchases::create_purchase),
        )
        .route("/{id}", get(handlers::purchases::get_purchase));

    let notification_routes = Router::new()
        .route("/", get(handlers::activity::list_notifications))
        .route("/read-all", post(handlers::activity::mark_all_notifications_read))
        .route("/{id}/read", post(handlers::activity::mark_notification_read));

    let protected = Router::new()
        .nest("/auth", session_routes)
        .nest("/vendors", vendor_routes)
        .nest("/products", product_routes)
        .nest("/sales", sales_routes)
        .nest("/purchases", purchase_routes)
        .route("/inventory/movements", get(handlers::inventory::list_movements))
        .route("/reports", get(handlers::reports::inventory_report))
        .route("/reports/pdf", get(handlers::reports::inventory_report_pdf))
        .nest("/notifications", notification_routes)
        .route("/audit-logs", get(handlers::activity::list_audit_logs))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let api = Router::new()
        .route("/health", get(|| async { "OK" }))
        .nest("/auth", auth_routes)
        .merge(protected);

    Router::new()
        .nest("/api", api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
