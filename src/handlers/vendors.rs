// src/handlers/vendors.rs

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
    models::vendor::{
        CreateVendorPayload, UpdateVendorPayload, Vendor, VendorFilter, VendorWithProducts,
    },
};

#[utoipa::path(
    get,
    path = "/api/vendors",
    tag = "Vendors",
    params(
        ("status" = Option<String>, Query, description = "active | inactive"),
        ("search" = Option<String>, Query, description = "Matches name or e-mail")
    ),
    responses((status = 200, description = "Vendors with their products", body = Vec<VendorWithProducts>)),
    security(("api_jwt" = []))
)]
pub async fn list_vendors(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(filter): Query<VendorFilter>,
) -> Result<impl IntoResponse, AppError> {
    let vendors = app_state.catalog_service.list_vendors(&filter).await?;
    Ok(Json(vendors))
}

#[utoipa::path(
    post,
    path = "/api/vendors",
    tag = "Vendors",
    request_body = CreateVendorPayload,
    responses(
        (status = 201, description = "Vendor created", body = Vendor),
        (status = 409, description = "E-mail already in use")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_vendor(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleVendor>,
    Json(payload): Json<CreateVendorPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let vendor = app_state.catalog_service.create_vendor(&payload).await?;
    Ok((StatusCode::CREATED, Json(vendor)))
}

pub async fn get_vendor(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let vendor = app_state.catalog_service.get_vendor(id).await?;
    Ok(Json(vendor))
}

pub async fn update_vendor(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleVendor>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateVendorPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let vendor = app_state.catalog_service.update_vendor(id, &payload).await?;
    Ok(Json(vendor))
}

pub async fn delete_vendor(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleVendor>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.catalog_service.delete_vendor(id).await?;
    Ok(Json(json!({ "success": true })))
}
