//! Periodic purge of old inbox entries, delivery logs and finished jobs.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crm_core::error::AppError;
use crm_database::traits::{JobStore, NotificationLogStore, NotificationStore};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupSummary {
    pub notifications_deleted: u64,
    pub logs_deleted: u64,
    pub jobs_deleted: u64,
}

#[derive(Clone)]
pub struct MaintenanceService {
    notifications: Arc<dyn NotificationStore>,
    logs: Arc<dyn NotificationLogStore>,
    jobs: Arc<dyn JobStore>,
    retention: Duration,
}

impl std::fmt::Debug for MaintenanceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaintenanceService")
            .field("retention", &self.retention)
            .finish()
    }
}

impl MaintenanceService {
    pub fn new(
        notifications: Arc<dyn NotificationStore>,
        logs: Arc<dyn NotificationLogStore>,
        jobs: Arc<dyn JobStore>,
        retention_days: i64,
    ) -> Self {
        Self {
            notifications,
            logs,
            jobs,
            retention: Duration::days(retention_days.max(1)),
        }
    }

    /// Delete read notifications, log rows and finished jobs older than the
    /// retention window.
    pub async fn cleanup(&self, now: DateTime<Utc>) -> Result<CleanupSummary, AppError> {
        let cutoff = now - self.retention;
        let summary = CleanupSummary {
            notifications_deleted: self.notifications.delete_read_before(cutoff).await?,
            logs_deleted: self.logs.delete_before(cutoff).await?,
            jobs_deleted: self.jobs.cleanup_old(cutoff).await?,
        };
        info!(
            cutoff = %cutoff,
            notifications = summary.notifications_deleted,
            logs = summary.logs_deleted,
            jobs = summary.jobs_deleted,
            "Maintenance cleanup complete"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use uuid::Uuid;

    use crm_database::MemoryStore;
    use crm_entity::notification::CreateNotification;

    #[tokio::test]
    async fn test_only_read_notifications_past_retention_are_purged() {
        let store = Arc::new(MemoryStore::new());
        let svc = MaintenanceService::new(store.clone(), store.clone(), store.clone(), 30);
        let user = Uuid::new_v4();
        for _ in 0..2 {
            NotificationStore::create(
                store.as_ref(),
                &CreateNotification {
                    user_id: user,
                    category: "reminder".into(),
                    title: "t".into(),
                    message: "m".into(),
                    entity_type: None,
                    entity_id: None,
                },
            )
            .await
            .unwrap();
        }
        NotificationStore::mark_all_read(store.as_ref(), user)
            .await
            .unwrap();

        let now_summary = svc.cleanup(Utc::now()).await.unwrap();
        assert_eq!(now_summary.notifications_deleted, 0);

        let later = svc.cleanup(Utc::now() + Duration::days(31)).await.unwrap();
        assert_eq!(later.notifications_deleted, 2);
    }
}
