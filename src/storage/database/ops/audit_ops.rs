use crate::storage::database::entities::audit_log;
use crate::storage::database::{now, Database};
use sea_orm::*;
use tracing::warn;
use uuid::Uuid;

impl Database {
    /// Append an audit row. Best-effort: a failed write is logged and never
    /// fails the request being audited.
    pub async fn record_audit(
        &self,
        user_id: Option<Uuid>,
        action: &str,
        target_type: Option<&str>,
        target_id: Option<&str>,
        ip: Option<&str>,
    ) {
        let model = audit_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            action: Set(action.to_string()),
            target_type: Set(target_type.map(str::to_string)),
            target_id: Set(target_id.map(str::to_string)),
            ip: Set(ip.map(str::to_string)),
            created_at: Set(now()),
        };

        if let Err(e) = model.insert(&self.db).await {
            warn!("Audit write failed for {}: {}", action, e);
        }
    }
}
