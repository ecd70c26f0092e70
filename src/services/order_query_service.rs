// src/services/order_query_service.rs

use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ProductRepository, PurchaseRepository, SalesRepository, VendorRepository},
    models::{
        orders::{
            OrderFilter, Purchase, PurchaseDetail, PurchaseItemDetail, Sale, SaleDetail,
            SaleItemDetail,
        },
        product::Product,
        vendor::Vendor,
    },
};

/// Read side of orders: headers joined with their lines, products and vendor.
#[derive(Clone)]
pub struct OrderQueryService {
    sales_repo: SalesRepository,
    purchase_repo: PurchaseRepository,
    product_repo: ProductRepository,
    vendor_repo: VendorRepository,
}

fn index_by_id<T, F: Fn(&T) -> Uuid>(rows: Vec<T>, key: F) -> HashMap<Uuid, T> {
    rows.into_iter().map(|row| (key(&row), row)).collect()
}

impl OrderQueryService {
    pub fn new(
        sales_repo: SalesRepository,
        purchase_repo: PurchaseRepository,
        product_repo: ProductRepository,
        vendor_repo: VendorRepository,
    ) -> Self {
        Self {
            sales_repo,
            purchase_repo,
            product_repo,
            vendor_repo,
        }
    }

    async fn lookups(
        &self,
        product_ids: Vec<Uuid>,
        vendor_ids: Vec<Uuid>,
    ) -> Result<(HashMap<Uuid, Product>, HashMap<Uuid, Vendor>), AppError> {
        let products = self.product_repo.find_many(&product_ids).await?;
        let vendors = self.vendor_repo.find_many(&vendor_ids).await?;
        Ok((index_by_id(products, |p| p.id), index_by_id(vendors, |v| v.id)))
    }

    // --- SALES ---

    pub async fn list_sales(&self, filter: &OrderFilter) -> Result<Vec<SaleDetail>, AppError> {
        let sales = self.sales_repo.list(filter).await?;
        self.expand_sales(sales).await
    }

    pub async fn get_sale(&self, id: Uuid) -> Result<SaleDetail, AppError> {
        let sale = self
            .sales_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::SaleNotFound)?;
        let mut expanded = self.expand_sales(vec![sale]).await?;
        expanded.pop().ok_or(AppError::SaleNotFound)
    }

    async fn expand_sales(&self, sales: Vec<Sale>) -> Result<Vec<SaleDetail>, AppError> {
        let sale_ids: Vec<Uuid> = sales.iter().map(|s| s.id).collect();
        let items = self.sales_repo.items_for(&sale_ids).await?;

        let product_ids = items.iter().map(|i| i.product_id).collect();
        let vendor_ids = sales.iter().filter_map(|s| s.vendor_id).collect();
        let (products, vendors) = self.lookups(product_ids, vendor_ids).await?;

        let mut items_by_sale: HashMap<Uuid, Vec<SaleItemDetail>> = HashMap::new();
        for item in items {
            let product = products.get(&item.product_id).cloned();
            items_by_sale
                .entry(item.sale_id)
                .or_default()
                .push(SaleItemDetail { item, product });
        }

        Ok(sales
            .into_iter()
            .map(|sale| SaleDetail {
                vendor: sale.vendor_id.and_then(|id| vendors.get(&id).cloned()),
                items: items_by_sale.remove(&sale.id).unwrap_or_default(),
                sale,
            })
            .collect())
    }

    // --- PURCHASES ---

    pub async fn list_purchases(&self, filter: &OrderFilter) -> Result<Vec<PurchaseDetail>, AppError> {
        let purchases = self.purchase_repo.list(filter).await?;
        self.expand_purchases(purchases).await
    }

    pub async fn get_purchase(&self, id: Uuid) -> Result<PurchaseDetail, AppError> {
        let purchase = self
            .purchase_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::PurchaseNotFound)?;
        let mut expanded = self.expand_purchases(vec![purchase]).await?;
        expanded.pop().ok_or(AppError::PurchaseNotFound)
    }

    async fn expand_purchases(&self, purchases: Vec<Purchase>) -> Result<Vec<PurchaseDetail>, AppError> {
        let purchase_ids: Vec<Uuid> = purchases.iter().map(|p| p.id).collect();
        let items = self.purchase_repo.items_for(&purchase_ids).await?;

        let product_ids = items.iter().map(|i| i.product_id).collect();
        let vendor_ids = purchases.iter().map(|p| p.vendor_id).collect();
        let (products, vendors) = self.lookups(product_ids, vendor_ids).await?;

        let mut items_by_purchase: HashMap<Uuid, Vec<PurchaseItemDetail>> = HashMap::new();
        for item in items {
            let product = products.get(&item.product_id).cloned();
            items_by_purchase
                .entry(item.purchase_id)
                .or_default()
                .push(PurchaseItemDetail { item, product });
        }

        Ok(purchases
            .into_iter()
            .map(|purchase| PurchaseDetail {
                vendor: vendors.get(&purchase.vendor_id).cloned(),
                items: items_by_purchase.remove(&purchase.id).unwrap_or_default(),
                purchase,
            })
            .collect())
    }
}
