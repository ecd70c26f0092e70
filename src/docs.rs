// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Catalog ---
        handlers::vendors::list_vendors,
        handlers::vendors::create_vendor,
        handlers::products::list_products,
        handlers::products::create_product,

        // --- Orders ---
        handlers::sales::create_sale,
        handlers::purchases::create_purchase,

        // --- Inventory / reports ---
        handlers::inventory::list_movements,
        handlers::reports::inventory_report,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::UserStatus,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Catalog ---
            models::vendor::VendorStatus,
            models::vendor::Vendor,
            models::vendor::VendorWithProducts,
            models::vendor::CreateVendorPayload,
            models::vendor::UpdateVendorPayload,
            models::product::ProductStatus,
            models::product::Product,
            models::product::ProductWithVendor,
            models::product::CreateProductPayload,
            models::product::UpdateProductPayload,

            // --- Orders ---
            models::orders::PaymentStatus,
            models::orders::OrderStatus,
            models::orders::Sale,
            models::orders::SaleItem,
            models::orders::SaleItemDetail,
            models::orders::SaleDetail,
            models::orders::CreateSaleRequest,
            models::orders::CreateSaleItem,
            models::orders::Purchase,
            models::orders::PurchaseItem,
            models::orders::PurchaseItemDetail,
            models::orders::PurchaseDetail,
            models::orders::CreatePurchaseRequest,
            models::orders::CreatePurchaseItem,

            // --- Inventory ---
            models::inventory::MovementType,
            models::inventory::InventoryMovement,

            // --- Activity ---
            models::activity::NotificationKind,
            models::activity::Notification,
            models::activity::AuditLog,

            // --- Reports ---
            models::report::ReportFilters,
            models::report::CategoryBucket,
            models::report::VendorBucket,
            models::report::StatusBucket,
            models::report::InventoryReport,
        )
    ),
    tags(
        (name = "Auth", description = "Registration and sessions"),
        (name = "Vendors", description = "Suppliers and their products"),
        (name = "Products", description = "Product catalog"),
        (name = "Sales", description = "Customer orders (stock out)"),
        (name = "Purchases", description = "Vendor orders (stock in)"),
        (name = "Inventory", description = "Stock movement ledger"),
        (name = "Reports", description = "Inventory aggregates and PDF export")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
