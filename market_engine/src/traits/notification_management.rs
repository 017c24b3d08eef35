use crate::{
    db_types::{NotificationEvent, UserId},
    traits::StoreError,
};

/// The most notifications any single read returns.
pub const MAX_NOTIFICATIONS: usize = 100;

#[allow(async_fn_in_trait)]
pub trait NotificationManagement {
    /// The most recent notifications for `user`. `limit` is clamped to [`MAX_NOTIFICATIONS`].
    async fn fetch_notifications(&self, user: &UserId, limit: usize) -> Result<Vec<NotificationEvent>, StoreError>;

    /// Marks the notification as read. Returns `false` if it does not exist or does not belong to `user`.
    async fn mark_notification_read(&self, id: i64, user: &UserId) -> Result<bool, StoreError>;

    /// Returns the number of notifications that changed state.
    async fn mark_all_notifications_read(&self, user: &UserId) -> Result<u64, StoreError>;

    async fn count_unread_notifications(&self, user: &UserId) -> Result<i64, StoreError>;
}
