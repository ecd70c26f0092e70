// src/handlers/purchases.rs

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
    models::orders::{CreatePurchaseRequest, OrderFilter, PurchaseDetail},
};

#[utoipa::path(
    post,
    path = "/api/purchases",
    tag = "Purchases",
    request_body = CreatePurchaseRequest,
    responses(
        (status = 201, description = "Purchase recorded; wrapped as { purchase }", body = PurchaseDetail),
        (status = 400, description = "Missing fields or product from another vendor"),
        (status = 404, description = "Vendor or product not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_purchase(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireRole<RoleVendor>,
    Json(payload): Json<CreatePurchaseRequest>,
) -> Result<impl IntoResponse, AppError> {
    let purchase = app_state
        .order_service
        .create_purchase(user.id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "purchase": purchase }))))
}

pub async fn list_purchases(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(filter): Query<OrderFilter>,
) -> Result<impl IntoResponse, AppError> {
    let purchases = app_state.order_query_service.list_purchases(&filter).await?;
    Ok(Json(json!({ "purchases": purchases })))
}

pub async fn get_purchase(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let purchase = app_state.order_query_service.get_purchase(id).await?;
    Ok(Json(json!({ "purchase": purchase })))
}
