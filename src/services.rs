pub mod activity_service;
pub mod auth;
pub mod catalog_service;
pub mod inventory_service;
pub mod numbering;
pub mod order_query_service;
pub mod order_service;
pub mod order_validator;
pub mod report_service;
pub mod totals;
