// src/handlers/sales.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{RequireRole, RoleVendor},
    },
    models::orders::{CreateSaleRequest, OrderFilter, SaleDetail},
};

#[utoipa::path(
    post,
    path = "/api/sales",
    tag = "Sales",
    request_body = CreateSaleRequest,
    responses(
        (status = 201, description = "Sale recorded; wrapped as { sale }", body = SaleDetail),
        (status = 400, description = "Missing fields, vendor mismatch or insufficient stock"),
        (status = 404, description = "Vendor or product not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_sale(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireRole<RoleVendor>,
    Json(payload): Json<CreateSaleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let sale = app_state.order_service.create_sale(user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(json!({ "sale": sale }))))
}

pub async fn list_sales(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(filter): Query<OrderFilter>,
) -> Result<impl IntoResponse, AppError> {
    let sales = app_state.order_query_service.list_sales(&filter).await?;
    Ok(Json(json!({ "sales": sales })))
}

pub async fn get_sale(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let sale = app_state.order_query_service.get_sale(id).await?;
    Ok(Json(json!({ "sale": sale })))
}
