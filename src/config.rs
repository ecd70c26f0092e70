// src/config.rs

use std::{env, net::SocketAddr, time::Duration};

use anyhow::Context;
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{
    db::{
        AuditRepository, InventoryRepository, NotificationRepository, PgOrderStore,
        ProductRepository, PurchaseRepository, ReportRepository, SalesRepository, UserRepository,
        VendorRepository,
    },
    services::{
        activity_service::ActivityService, auth::AuthService, catalog_service::CatalogService,
        inventory_service::InventoryService, order_query_service::OrderQueryService,
        order_service::OrderService, report_service::ReportService,
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_FONTS_DIR: &str = "./fonts";

/// Process configuration, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub fonts_dir: String,
}

fn required(name: &str) -> anyhow::Result<String> {
    env::var(name).with_context(|| format!("{name} must be set"))
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must be a socket address such as 0.0.0.0:3000")?;

        let max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .parse()
                .context("DB_MAX_CONNECTIONS must be a positive integer")?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr,
            max_connections,
            fonts_dir: env::var("REPORT_FONTS_DIR").unwrap_or_else(|_| DEFAULT_FONTS_DIR.to_string()),
        })
    }
}

// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub catalog_service: CatalogService,
    pub order_service: OrderService<PgOrderStore>,
    pub order_query_service: OrderQueryService,
    pub inventory_service: InventoryService,
    pub activity_service: ActivityService,
    pub report_service: ReportService,
}

impl AppState {
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("could not connect to the database")?;

        tracing::info!("Database connection established");

        Ok(Self::from_pool(db_pool, config))
    }

    // --- Dependency graph ---
    pub fn from_pool(db_pool: PgPool, config: &AppConfig) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let vendor_repo = VendorRepository::new(db_pool.clone());
        let product_repo = ProductRepository::new(db_pool.clone());
        let sales_repo = SalesRepository::new(db_pool.clone());
        let purchase_repo = PurchaseRepository::new(db_pool.clone());
        let inventory_repo = InventoryRepository::new(db_pool.clone());
        let audit_repo = AuditRepository::new(db_pool.clone());
        let notification_repo = NotificationRepository::new(db_pool.clone());
        let report_repo = ReportRepository::new(db_pool.clone());

        Self {
            auth_service: AuthService::new(user_repo, audit_repo.clone(), config.jwt_secret.clone()),
            catalog_service: CatalogService::new(vendor_repo.clone(), product_repo.clone()),
            order_service: OrderService::new(PgOrderStore::new(db_pool.clone())),
            order_query_service: OrderQueryService::new(
                sales_repo,
                purchase_repo,
                product_repo,
                vendor_repo,
            ),
            inventory_service: InventoryService::new(inventory_repo),
            activity_service: ActivityService::new(notification_repo, audit_repo),
            report_service: ReportService::new(report_repo, config.fonts_dir.clone()),
            db_pool,
        }
    }
}
