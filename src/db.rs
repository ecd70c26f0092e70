pub mod user_repo;
pub use user_repo::UserRepository;
pub mod vendor_repo;
pub use vendor_repo::VendorRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod sales_repo;
pub use sales_repo::SalesRepository;
pub mod purchase_repo;
pub use purchase_repo::PurchaseRepository;
pub mod inventory_repo;
pub use inventory_repo::InventoryRepository;
pub mod audit_repo;
pub use audit_repo::AuditRepository;
pub mod notification_repo;
pub use notification_repo::NotificationRepository;
pub mod report_repo;
pub use report_repo::ReportRepository;

pub mod store;
pub use store::{OrderStore, OrderTx};
pub mod pg_store;
pub use pg_store::PgOrderStore;
#[cfg(any(test, feature = "test-util"))]
pub mod memory_store;
#[cfg(any(test, feature = "test-util"))]
pub use memory_store::MemoryOrderStore;
