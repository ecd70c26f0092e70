// src/handlers/activity.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{RequireRole, RoleAdmin},
    },
    models::activity::{AuditLogFilter, NotificationQuery},
};

// --- NOTIFICATIONS (always the caller's own) ---

pub async fn list_notifications(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<NotificationQuery>,
) -> Result<impl IntoResponse, AppError> {
    let notifications = app_state
        .activity_service
        .notifications_for(user.id, query.unread_only)
        .await?;
    Ok(Json(json!({ "notifications": notifications })))
}

pub async fn mark_notification_read(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let notification = app_state.activity_service.mark_read(user.id, id).await?;
    Ok(Json(json!({ "notification": notification })))
}

pub async fn mark_all_notifications_read(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let updated = app_state.activity_service.mark_all_read(user.id).await?;
    Ok(Json(json!({ "updated": updated })))
}

// --- AUDIT LOG ---

pub async fn list_audit_logs(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
    Query(filter): Query<AuditLogFilter>,
) -> Result<impl IntoResponse, AppError> {
    let logs = app_state.activity_service.audit_logs(&filter).await?;
    Ok(Json(json!({ "logs": logs })))
}
