// src/services/catalog_service.rs

use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ProductRepository, VendorRepository},
    models::{
        product::{
            CreateProductPayload, Product, ProductFilter, ProductWithVendor, UpdateProductPayload,
        },
        vendor::{
            CreateVendorPayload, UpdateVendorPayload, Vendor, VendorFilter, VendorWithProducts,
        },
    },
};

/// Vendor and product maintenance. Stock is never written here after a
/// product is created.
#[derive(Clone)]
pub struct CatalogService {
    vendor_repo: VendorRepository,
    product_repo: ProductRepository,
}

impl CatalogService {
    pub fn new(vendor_repo: VendorRepository, product_repo: ProductRepository) -> Self {
        Self {
            vendor_repo,
            product_repo,
        }
    }

    // ---
    // VENDORS
    // ---

    pub async fn list_vendors(&self, filter: &VendorFilter) -> Result<Vec<VendorWithProducts>, AppError> {
        let vendors = self.vendor_repo.list(filter).await?;
        let ids: Vec<Uuid> = vendors.iter().map(|v| v.id).collect();

        let mut by_vendor: HashMap<Uuid, Vec<Product>> = HashMap::new();
        for product in self.product_repo.list_by_vendors(&ids).await? {
            by_vendor.entry(product.vendor_id).or_default().push(product);
        }

        Ok(vendors
            .into_iter()
            .map(|vendor| VendorWithProducts {
                products: by_vendor.remove(&vendor.id).unwrap_or_default(),
                vendor,
            })
            .collect())
    }

    pub async fn get_vendor(&self, id: Uuid) -> Result<VendorWithProducts, AppError> {
        let vendor = self.require_vendor(id).await?;
        let products = self.product_repo.list_by_vendors(&[id]).await?;
        Ok(VendorWithProducts { vendor, products })
    }

    pub async fn create_vendor(&self, payload: &CreateVendorPayload) -> Result<Vendor, AppError> {
        let vendor = self.vendor_repo.create(payload).await?;
        tracing::info!(vendor_id = %vendor.id, "Vendor created");
        Ok(vendor)
    }

    pub async fn update_vendor(
        &self,
        id: Uuid,
        payload: &UpdateVendorPayload,
    ) -> Result<Vendor, AppError> {
        self.vendor_repo
            .update(id, payload)
            .await?
            .ok_or(AppError::VendorNotFound)
    }

    pub async fn delete_vendor(&self, id: Uuid) -> Result<(), AppError> {
        if !self.vendor_repo.delete(id).await? {
            return Err(AppError::VendorNotFound);
        }
        tracing::info!(vendor_id = %id, "Vendor deleted");
        Ok(())
    }

    async fn require_vendor(&self, id: Uuid) -> Result<Vendor, AppError> {
        self.vendor_repo
            .find_by_id(self.vendor_repo.pool(), id)
            .await?
            .ok_or(AppError::VendorNotFound)
    }

    // ---
    // PRODUCTS
    // ---

    pub async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<ProductWithVendor>, AppError> {
        let products = self.product_repo.list(filter).await?;
        self.attach_vendors(products).await
    }

    pub async fn get_product(&self, id: Uuid) -> Result<ProductWithVendor, AppError> {
        let product = self.require_product(id).await?;
        let mut with_vendor = self.attach_vendors(vec![product]).await?;
        with_vendor.pop().ok_or(AppError::ProductNotFound(id))
    }

    pub async fn create_product(&self, payload: &CreateProductPayload) -> Result<Product, AppError> {
        // 1. Vendor must exist (404 rather than a foreign key error)
        self.require_vendor(payload.vendor_id).await?;

        // 2. Insert (duplicate SKU → 409)
        let product = self.product_repo.create(payload).await?;
        tracing::info!(product_id = %product.id, sku = %product.sku, "Product created");
        Ok(product)
    }

    pub async fn update_product(
        &self,
        id: Uuid,
        payload: &UpdateProductPayload,
    ) -> Result<Product, AppError> {
        if payload.price.is_some_and(|p| p.is_sign_negative()) {
            return Err(AppError::InvalidInput("The price cannot be negative.".into()));
        }
        if let Some(vendor_id) = payload.vendor_id {
            self.require_vendor(vendor_id).await?;
        }
        self.product_repo
            .update(id, payload)
            .await?
            .ok_or(AppError::ProductNotFound(id))
    }

    pub async fn delete_product(&self, id: Uuid) -> Result<(), AppError> {
        if !self.product_repo.delete(id).await? {
            return Err(AppError::ProductNotFound(id));
        }
        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }

    async fn require_product(&self, id: Uuid) -> Result<Product, AppError> {
        self.product_repo
            .find_by_id(self.product_repo.pool(), id)
            .await?
            .ok_or(AppError::ProductNotFound(id))
    }

    async fn attach_vendors(&self, products: Vec<Product>) -> Result<Vec<ProductWithVendor>, AppError> {
        let ids: Vec<Uuid> = products.iter().map(|p| p.vendor_id).collect();
        let vendors: HashMap<Uuid, Vendor> = self
            .vendor_repo
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|v| (v.id, v))
            .collect();

        Ok(products
            .into_iter()
            .map(|product| ProductWithVendor {
                vendor: vendors.get(&product.vendor_id).cloned(),
                product,
            })
            .collect())
    }
}
