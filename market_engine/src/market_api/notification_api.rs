use std::fmt::Debug;

use log::trace;

use crate::{
    db_types::{NotificationEvent, UserId},
    traits::{NotificationManagement, StoreError, MAX_NOTIFICATIONS},
};

/// Read access to a user's notifications, and acknowledgement of them.
pub struct NotificationApi<B> {
    db: B,
}

impl<B: Debug> Debug for NotificationApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NotificationApi ({:?})", self.db)
    }
}

impl<B> NotificationApi<B>
where B: NotificationManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// The user's most recent notifications, newest first.
    pub async fn notifications(&self, user: &UserId) -> Result<Vec<NotificationEvent>, StoreError> {
        self.db.fetch_notifications(user, MAX_NOTIFICATIONS).await
    }

    pub async fn mark_read(&self, id: i64, user: &UserId) -> Result<bool, StoreError> {
        let changed = self.db.mark_notification_read(id, user).await?;
        trace!("🔔️ Notification #{id} marked read for {user}: {changed}");
        Ok(changed)
    }

    pub async fn mark_all_read(&self, user: &UserId) -> Result<u64, StoreError> {
        self.db.mark_all_notifications_read(user).await
    }

    pub async fn unread_count(&self, user: &UserId) -> Result<i64, StoreError> {
        self.db.count_unread_notifications(user).await
    }
}
