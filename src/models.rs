pub mod activity;
pub mod auth;
pub mod inventory;
pub mod orders;
pub mod product;
pub mod report;
pub mod vendor;
