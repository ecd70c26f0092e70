// src/handlers/products.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{RequireRole, RoleVendor},
    },
    models::product::{
        CreateProductPayload, Product, ProductFilter, ProductWithVendor, UpdateProductPayload,
    },
};

#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    params(
        ("vendorId" = Option<Uuid>, Query, description = "Owning vendor"),
        ("category" = Option<String>, Query, description = "Exact category"),
        ("status" = Option<String>, Query, description = "available | out_of_stock | discontinued"),
        ("search" = Option<String>, Query, description = "Matches name, description or SKU")
    ),
    responses((status = 200, description = "Products with their vendor", body = Vec<ProductWithVendor>)),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(filter): Query<ProductFilter>,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state.catalog_service.list_products(&filter).await?;
    Ok(Json(products))
}

#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Products",
    request_body = CreateProductPayload,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 404, description = "Vendor not found"),
        (status = 409, description = "SKU already exists")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleVendor>,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let product = app_state.catalog_service.create_product(&payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn get_product(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.catalog_service.get_product(id).await?;
    Ok(Json(product))
}

// Any `stock` in the body is ignored.
pub async fn update_product(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleVendor>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let product = app_state.catalog_service.update_product(id, &payload).await?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleVendor>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.catalog_service.delete_product(id).await?;
    Ok(Json(json!({ "success": true })))
}
