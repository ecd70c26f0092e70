// src/services/activity_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AuditRepository, NotificationRepository},
    models::activity::{AuditLog, AuditLogFilter, Notification},
};

/// Read and acknowledge side of the notification and audit sinks.
#[derive(Clone)]
pub struct ActivityService {
    notification_repo: NotificationRepository,
    audit_repo: AuditRepository,
}

impl ActivityService {
    pub fn new(notification_repo: NotificationRepository, audit_repo: AuditRepository) -> Self {
        Self {
            notification_repo,
            audit_repo,
        }
    }

    pub async fn notifications_for(
        &self,
        user_id: Uuid,
        unread_only: bool,
    ) -> Result<Vec<Notification>, AppError> {
        self.notification_repo.list_for_user(user_id, unread_only).await
    }

    pub async fn mark_read(&self, user_id: Uuid, id: Uuid) -> Result<Notification, AppError> {
        self.notification_repo
            .mark_read(user_id, id)
            .await?
            .ok_or(AppError::NotificationNotFound)
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, AppError> {
        self.notification_repo.mark_all_read(user_id).await
    }

    pub async fn audit_logs(&self, filter: &AuditLogFilter) -> Result<Vec<AuditLog>, AppError> {
        self.audit_repo.list(filter).await
    }
}
