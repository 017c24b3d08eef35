use log::trace;
use sqlx::{types::Json, SqliteConnection};

use super::sql_limit;
use crate::{
    db_types::{NewNotification, NotificationEvent, UserId},
    traits::StoreError,
};

pub async fn insert_notification(
    notification: NewNotification,
    conn: &mut SqliteConnection,
) -> Result<NotificationEvent, StoreError> {
    let event: NotificationEvent = sqlx::query_as(
        "INSERT INTO notifications (user_id, type, title, body, payload) VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(notification.user_id)
    .bind(notification.notification_type)
    .bind(notification.title)
    .bind(notification.body)
    .bind(Json(notification.payload))
    .fetch_one(conn)
    .await?;
    trace!("🔔️ Notification #{} ({}) queued for {}", event.id, event.notification_type, event.user_id);
    Ok(event)
}

pub async fn fetch_notifications(
    user: &UserId,
    limit: usize,
    conn: &mut SqliteConnection,
) -> Result<Vec<NotificationEvent>, StoreError> {
    let notifications = sqlx::query_as("SELECT * FROM notifications WHERE user_id = $1 ORDER BY id DESC LIMIT $2")
        .bind(user.as_str())
        .bind(sql_limit(limit))
        .fetch_all(conn)
        .await?;
    Ok(notifications)
}

pub async fn mark_read(id: i64, user: &UserId, conn: &mut SqliteConnection) -> Result<bool, StoreError> {
    let result = sqlx::query("UPDATE notifications SET read = TRUE WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user.as_str())
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn mark_all_read(user: &UserId, conn: &mut SqliteConnection) -> Result<u64, StoreError> {
    let result = sqlx::query("UPDATE notifications SET read = TRUE WHERE user_id = $1 AND read = FALSE")
        .bind(user.as_str())
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

pub async fn count_unread(user: &UserId, conn: &mut SqliteConnection) -> Result<i64, StoreError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND read = FALSE")
        .bind(user.as_str())
        .fetch_one(conn)
        .await?;
    Ok(count)
}
