use sea_orm::{ActiveModelTrait, Set};

use crate::db::DbConn;
use crate::error::Result;
use crate::models::audit_log::{self, AuditAction, ResourceType};

/// Audit service for logging invite and authentication events
#[derive(Clone)]
pub struct AuditService {
    db: DbConn,
}

impl AuditService {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// Log an audit event
    pub async fn log(
        &self,
        action: AuditAction,
        resource_type: ResourceType,
        resource_id: Option<String>,
        user_id: Option<i64>,
        details: Option<serde_json::Value>,
        success: bool,
        error_message: Option<String>,
    ) -> Result<()> {
        let now = chrono::Utc::now();
        let details_str = details.map(|d| d.to_string());

        let log_entry = audit_log::ActiveModel {
            timestamp: Set(now),
            user_id: Set(user_id),
            action: Set(action.to_string()),
            resource_type: Set(resource_type.to_string()),
            resource_id: Set(resource_id),
            details: Set(details_str),
            success: Set(success),
            error_message: Set(error_message),
            ..Default::default()
        };

        log_entry.insert(&self.db).await?;
        Ok(())
    }

    /// Log a successful action
    pub async fn log_success(
        &self,
        action: AuditAction,
        resource_type: ResourceType,
        resource_id: Option<String>,
        user_id: Option<i64>,
        details: Option<serde_json::Value>,
    ) -> Result<()> {
        self.log(action, resource_type, resource_id, user_id, details, true, None)
            .await
    }

    /// Log a failed action
    pub async fn log_failure(
        &self,
        action: AuditAction,
        resource_type: ResourceType,
        resource_id: Option<String>,
        user_id: Option<i64>,
        details: Option<serde_json::Value>,
        error: &str,
    ) -> Result<()> {
        self.log(
            action,
            resource_type,
            resource_id,
            user_id,
            details,
            false,
            Some(error.to_string()),
        )
        .await
    }
}
