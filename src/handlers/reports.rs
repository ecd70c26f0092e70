// src/handlers/reports.rs

use axum::{
    Json,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::report::{InventoryReport, ReportFilters},
};

#[utoipa::path(
    get,
    path = "/api/reports",
    tag = "Reports",
    params(
        ("startDate" = Option<String>, Query, description = "YYYY-MM-DD, used together with endDate"),
        ("endDate" = Option<String>, Query, description = "YYYY-MM-DD, used together with startDate"),
        ("vendorId" = Option<uuid::Uuid>, Query),
        ("category" = Option<String>, Query),
        ("status" = Option<String>, Query)
    ),
    responses((status = 200, body = InventoryReport)),
    security(("api_jwt" = []))
)]
pub async fn inventory_report(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(filters): Query<ReportFilters>,
) -> Result<Json<InventoryReport>, AppError> {
    let report = app_state.report_service.inventory_report(&filters).await?;
    Ok(Json(report))
}

pub async fn inventory_report_pdf(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(filters): Query<ReportFilters>,
) -> Result<impl IntoResponse, AppError> {
    let pdf = app_state.report_service.inventory_report_pdf(&filters).await?;

    let filename = format!(
        "attachment; filename=\"inventory-report-{}.pdf\"",
        chrono::Utc::now().format("%Y-%m-%d")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        pdf,
    ))
}
