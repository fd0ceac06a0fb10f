//! In-app notification inbox.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crm_core::error::AppError;
use crm_core::types::pagination::{PageRequest, PageResponse};
use crm_database::traits::NotificationStore;
use crm_entity::notification::Notification;

use crate::context::RequestContext;

/// Manages the current user's inbox.
#[derive(Clone)]
pub struct NotificationService {
    notifications: Arc<dyn NotificationStore>,
}

impl std::fmt::Debug for NotificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationService").finish()
    }
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(notifications: Arc<dyn NotificationStore>) -> Self {
        Self { notifications }
    }

    /// Lists notifications for the current user, newest first.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        page: &PageRequest,
    ) -> Result<PageResponse<Notification>, AppError> {
        self.notifications
            .find_by_user(ctx.user_id.into_uuid(), page)
            .await
    }

    /// Gets the unread notification count.
    pub async fn unread_count(&self, ctx: &RequestContext) -> Result<i64, AppError> {
        self.notifications
            .count_unread(ctx.user_id.into_uuid())
            .await
    }

    /// Marks one of the user's notifications as read.
    pub async fn mark_read(
        &self,
        ctx: &RequestContext,
        notification_id: Uuid,
    ) -> Result<(), AppError> {
        let updated = self
            .notifications
            .mark_read(notification_id, ctx.user_id.into_uuid())
            .await?;
        if !updated {
            return Err(AppError::not_found(format!(
                "Notification {notification_id} not found"
            )));
        }
        Ok(())
    }

    /// Marks all notifications as read for the current user.
    pub async fn mark_all_read(&self, ctx: &RequestContext) -> Result<u64, AppError> {
        let count = self
            .notifications
            .mark_all_read(ctx.user_id.into_uuid())
            .await?;
        info!(user_id = %ctx.user_id, count, "Marked notifications read");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crm_core::error::ErrorKind;
    use crm_core::types::id::UserId;
    use crm_database::MemoryStore;
    use crm_entity::notification::CreateNotification;
    use crm_entity::user::UserRole;

    async fn notify(store: &MemoryStore, user_id: Uuid, title: &str) -> Notification {
        NotificationStore::create(
            store,
            &CreateNotification {
                user_id,
                category: "reminder".into(),
                title: title.into(),
                message: "Recordatorio".into(),
                entity_type: None,
                entity_id: None,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_inbox_is_scoped_to_user() {
        let store = Arc::new(MemoryStore::new());
        let svc = NotificationService::new(store.clone());
        let me = RequestContext::new(UserId::new(), UserRole::Advisor, "Eva");
        let other = RequestContext::new(UserId::new(), UserRole::Advisor, "Iker");

        let mine = notify(&store, me.user_id.into_uuid(), "one").await;
        notify(&store, me.user_id.into_uuid(), "two").await;
        let theirs = notify(&store, other.user_id.into_uuid(), "three").await;

        let page = svc.list(&me, &PageRequest::default()).await.unwrap();
        assert_eq!(page.total_items, 2);
        assert_eq!(svc.unread_count(&me).await.unwrap(), 2);

        svc.mark_read(&me, mine.id).await.unwrap();
        assert_eq!(svc.unread_count(&me).await.unwrap(), 1);

        let err = svc.mark_read(&me, theirs.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        assert_eq!(svc.mark_all_read(&me).await.unwrap(), 1);
        assert_eq!(svc.unread_count(&me).await.unwrap(), 0);
        assert_eq!(svc.unread_count(&other).await.unwrap(), 1);
    }
}
