//! A cursor-based poller that turns new rows into [`ChangeEvent`]s.
//!
//! Each subscription owns one task. Every tick it selects rows with `id > cursor` that pass the subscription's filter,
//! in id order, forwards them and advances the cursor. Ids come from `AUTOINCREMENT` columns, so they are never
//! reused.
use std::time::Duration;

use log::{debug, trace, warn};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tokio::{sync::mpsc, time::MissedTickBehavior};

use crate::{
    db_types::{Match, NotificationEvent},
    traits::{ChangeEvent, ChangedRow, RowFilter, StoreError, Topic},
};

/// The most rows forwarded per tick. Larger backlogs drain over successive ticks.
pub const CHANGE_BATCH_SIZE: i64 = 100;

pub async fn poll_changes(
    pool: SqlitePool,
    topic: Topic,
    filter: RowFilter,
    mut cursor: i64,
    interval: Duration,
    sink: mpsc::Sender<ChangeEvent>,
) {
    debug!("📡️ Watching {topic} after #{cursor} ({filter:?})");
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if sink.is_closed() {
            break;
        }
        let rows = match fetch_changes(&pool, topic, &filter, cursor).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("📡️ Could not poll {topic} changes: {e}. Will retry.");
                continue;
            },
        };
        for row in rows {
            cursor = cursor.max(row.row_id());
            trace!("📡️ {topic} row #{} inserted", row.row_id());
            if sink.send(ChangeEvent::inserted(row)).await.is_err() {
                break;
            }
        }
    }
    debug!("📡️ Stopped watching {topic} at #{cursor}");
}

async fn fetch_changes(
    pool: &SqlitePool,
    topic: Topic,
    filter: &RowFilter,
    after_id: i64,
) -> Result<Vec<ChangedRow>, StoreError> {
    let mut conn = pool.acquire().await?;
    let rows = match topic {
        Topic::Matches => {
            matches_after(after_id, filter, &mut conn).await?.into_iter().map(ChangedRow::Match).collect()
        },
        Topic::Notifications => {
            notifications_after(after_id, filter, &mut conn).await?.into_iter().map(ChangedRow::Notification).collect()
        },
    };
    Ok(rows)
}

pub async fn matches_after(
    after_id: i64,
    filter: &RowFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<Match>, StoreError> {
    let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM matches WHERE id > ");
    builder.push_bind(after_id);
    if let RowFilter::Participant(user) = filter {
        builder.push(" AND (buyer_id = ");
        builder.push_bind(user.as_str().to_string());
        builder.push(" OR seller_id = ");
        builder.push_bind(user.as_str().to_string());
        builder.push(")");
    }
    builder.push(" ORDER BY id ASC LIMIT ");
    builder.push_bind(CHANGE_BATCH_SIZE);
    let matches = builder.build_query_as::<Match>().fetch_all(conn).await?;
    Ok(matches)
}

pub async fn notifications_after(
    after_id: i64,
    filter: &RowFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<NotificationEvent>, StoreError> {
    let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM notifications WHERE id > ");
    builder.push_bind(after_id);
    if let RowFilter::Participant(user) = filter {
        builder.push(" AND user_id = ");
        builder.push_bind(user.as_str().to_string());
    }
    builder.push(" ORDER BY id ASC LIMIT ");
    builder.push_bind(CHANGE_BATCH_SIZE);
    let notifications = builder.build_query_as::<NotificationEvent>().fetch_all(conn).await?;
    Ok(notifications)
}
