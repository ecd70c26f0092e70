pub mod activity;
pub mod auth;
pub mod inventory;
pub mod products;
pub mod purchases;
pub mod reports;
pub mod sales;
pub mod vendors;
