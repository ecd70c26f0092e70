// src/handlers/inventory.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    common::error::AppError, config::AppState, middleware::auth::AuthenticatedUser,
    models::inventory::MovementFilter,
};

#[utoipa::path(
    get,
    path = "/api/inventory/movements",
    tag = "Inventory",
    params(
        ("productId" = Option<uuid::Uuid>, Query, description = "Only this product"),
        ("limit" = Option<i64>, Query, description = "Default 100")
    ),
    responses((status = 200, description = "Ledger rows, newest first; wrapped as { movements }")),
    security(("api_jwt" = []))
)]
pub async fn list_movements(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(filter): Query<MovementFilter>,
) -> Result<impl IntoResponse, AppError> {
    let movements = app_state.inventory_service.list_movements(&filter).await?;
    Ok(Json(json!({ "movements": movements })))
}
