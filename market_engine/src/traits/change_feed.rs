//! Row-insert events from the store.
//!
//! A [`Subscription`] is a cancellable handle over a stream of [`ChangeEvent`]s for one [`Topic`]. Delivery is
//! at-least-once: a subscriber that reconnects from an older cursor sees rows again, so consumers must dedupe on
//! `(topic, row id)`.
use std::fmt::Display;

use log::trace;
use serde::Serialize;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    db_types::{Match, NotificationEvent, UserId},
    traits::StoreError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Topic {
    Matches,
    Notifications,
}

impl Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Topic::Matches => write!(f, "matches"),
            Topic::Notifications => write!(f, "notifications"),
        }
    }
}

/// The server-side filter applied to a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowFilter {
    All,
    /// Matches where the user is buyer or seller; notifications addressed to the user.
    Participant(UserId),
}

impl RowFilter {
    pub fn admits(&self, row: &ChangedRow) -> bool {
        match self {
            RowFilter::All => true,
            RowFilter::Participant(user) => row.concerns(user),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChangeOperation {
    Insert,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ChangedRow {
    Match(Match),
    Notification(NotificationEvent),
}

impl ChangedRow {
    pub fn row_id(&self) -> i64 {
        match self {
            ChangedRow::Match(m) => m.id,
            ChangedRow::Notification(n) => n.id,
        }
    }

    pub fn topic(&self) -> Topic {
        match self {
            ChangedRow::Match(_) => Topic::Matches,
            ChangedRow::Notification(_) => Topic::Notifications,
        }
    }

    pub fn concerns(&self, user: &UserId) -> bool {
        match self {
            ChangedRow::Match(m) => m.involves(user),
            ChangedRow::Notification(n) => &n.user_id == user,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeEvent {
    pub operation: ChangeOperation,
    pub row: ChangedRow,
}

impl ChangeEvent {
    pub fn inserted(row: ChangedRow) -> Self {
        Self { operation: ChangeOperation::Insert, row }
    }

    pub fn row_id(&self) -> i64 {
        self.row.row_id()
    }

    pub fn topic(&self) -> Topic {
        self.row.topic()
    }
}

//--------------------------------------     Subscription      ---------------------------------------------------------
/// A live subscription to one topic. Closing or dropping the handle stops delivery and the task feeding it.
#[derive(Debug)]
pub struct Subscription {
    topic: Topic,
    events: mpsc::Receiver<ChangeEvent>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn new(topic: Topic, events: mpsc::Receiver<ChangeEvent>, task: Option<JoinHandle<()>>) -> Self {
        Self { topic, events, task }
    }

    pub fn topic(&self) -> Topic {
        self.topic
    }

    /// The next event, or `None` once the subscription is closed and drained.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.events.recv().await
    }

    pub fn close(&mut self) {
        trace!("📡️ Closing {} subscription", self.topic);
        self.events.close();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait ChangeFeed {
    /// Subscribes to inserts on `topic` that pass `filter`, starting with rows whose id is greater than `after_id`.
    async fn subscribe(&self, topic: Topic, filter: RowFilter, after_id: i64) -> Result<Subscription, StoreError>;
}
