//! # Notification fan-out
//!
//! [`NotificationFeed`] keeps one signed-in user's view of their notifications and matches current. It loads the most
//! recent rows, then follows the store's [`ChangeFeed`] for inserts on the match and notification topics.
//!
//! The feed moves through `Unsubscribed -> Subscribing -> Subscribed -> Unsubscribed`. There is never more than one
//! live subscription per topic: subscribing again, or switching users, closes the previous handles first.
//!
//! Change delivery is at-least-once, so every event is deduplicated on `(topic, row id)` before it touches the view.
//! Events are also re-checked against the signed-in user even though the subscription is already filtered.
use std::collections::{HashSet, VecDeque};

use log::*;

use crate::{
    db_types::{Match, NotificationEvent, UserId},
    traits::{
        require_user,
        AlertSurface,
        ChangeEvent,
        ChangeFeed,
        ChangedRow,
        MatchManagement,
        NoAlerts,
        NotificationManagement,
        Readiness,
        RowFilter,
        StoreError,
        Subscription,
        Topic,
    },
};

pub const NOTIFICATION_VIEW_SIZE: usize = 100;
pub const MATCH_VIEW_SIZE: usize = 100;
const SEEN_CAPACITY: usize = 1_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedState {
    Unsubscribed,
    Subscribing,
    Subscribed(UserId),
}

/// A change that made it through validation and deduplication and is now part of the view.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedUpdate {
    Match(Match),
    Notification { event: NotificationEvent, alerted: bool },
}

/// A bounded set of recently seen `(topic, id)` keys. The oldest keys are forgotten first.
#[derive(Debug)]
struct SeenSet {
    keys: HashSet<(Topic, i64)>,
    order: VecDeque<(Topic, i64)>,
    capacity: usize,
}

impl SeenSet {
    fn new(capacity: usize) -> Self {
        Self { keys: HashSet::new(), order: VecDeque::new(), capacity }
    }

    /// Returns `false` if the key was already present.
    fn insert(&mut self, topic: Topic, id: i64) -> bool {
        if !self.keys.insert((topic, id)) {
            return false;
        }
        self.order.push_back((topic, id));
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.keys.remove(&oldest);
            }
        }
        true
    }

    fn clear(&mut self) {
        self.keys.clear();
        self.order.clear();
    }
}

pub struct NotificationFeed<B, A = NoAlerts> {
    db: B,
    alerts: A,
    state: FeedState,
    match_sub: Option<Subscription>,
    notification_sub: Option<Subscription>,
    seen: SeenSet,
    notifications: VecDeque<NotificationEvent>,
    matches: VecDeque<Match>,
    focused: bool,
}

impl<B, A> std::fmt::Debug for NotificationFeed<B, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "NotificationFeed ({:?}, {} notifications, {} matches)",
            self.state,
            self.notifications.len(),
            self.matches.len()
        )
    }
}

impl<B> NotificationFeed<B> {
    pub fn new(db: B) -> Self {
        Self {
            db,
            alerts: NoAlerts,
            state: FeedState::Unsubscribed,
            match_sub: None,
            notification_sub: None,
            seen: SeenSet::new(SEEN_CAPACITY),
            notifications: VecDeque::new(),
            matches: VecDeque::new(),
            focused: false,
        }
    }
}

impl<B: Readiness, A> NotificationFeed<B, A> {
    /// The feed can load once its own store handle is usable and no other load is in progress.
    pub fn is_loaded(&self) -> bool {
        self.db.is_ready() && self.state != FeedState::Subscribing
    }
}

impl<B, A> NotificationFeed<B, A> {
    pub fn with_alerts<A2: AlertSurface>(self, alerts: A2) -> NotificationFeed<B, A2> {
        NotificationFeed {
            db: self.db,
            alerts,
            state: self.state,
            match_sub: self.match_sub,
            notification_sub: self.notification_sub,
            seen: self.seen,
            notifications: self.notifications,
            matches: self.matches,
            focused: self.focused,
        }
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn is_subscribed(&self) -> bool {
        matches!(self.state, FeedState::Subscribed(_))
    }

    pub fn user(&self) -> Option<&UserId> {
        match &self.state {
            FeedState::Subscribed(user) => Some(user),
            _ => None,
        }
    }

    /// Newest first.
    pub fn notifications(&self) -> &VecDeque<NotificationEvent> {
        &self.notifications
    }

    /// Newest first.
    pub fn matches(&self) -> &VecDeque<Match> {
        &self.matches
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }

    pub fn active_subscriptions(&self) -> usize {
        usize::from(self.match_sub.is_some()) + usize::from(self.notification_sub.is_some())
    }

    /// While focused, new notifications update the view without raising alerts.
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Closes both subscriptions and clears the view.
    pub fn unsubscribe(&mut self) {
        self.close_subscriptions();
        self.seen.clear();
        self.notifications.clear();
        self.matches.clear();
        if self.state != FeedState::Unsubscribed {
            debug!("🔔️ Notification feed unsubscribed");
        }
        self.state = FeedState::Unsubscribed;
    }

    fn close_subscriptions(&mut self) {
        for slot in [&mut self.match_sub, &mut self.notification_sub] {
            if let Some(mut sub) = slot.take() {
                sub.close();
            }
        }
    }

    fn slot_mut(&mut self, topic: Topic) -> &mut Option<Subscription> {
        match topic {
            Topic::Matches => &mut self.match_sub,
            Topic::Notifications => &mut self.notification_sub,
        }
    }
}

impl<B, A> NotificationFeed<B, A>
where
    B: NotificationManagement + MatchManagement + ChangeFeed,
    A: AlertSurface,
{
    /// Loads the user's recent notifications and matches, then subscribes to new ones.
    ///
    /// Any previous subscription is torn down first. On failure the feed is left unsubscribed.
    pub async fn subscribe(&mut self, user: UserId) -> Result<(), StoreError> {
        require_user(&user, "user")?;
        self.unsubscribe();
        self.state = FeedState::Subscribing;
        match self.load_and_follow(&user).await {
            Ok(()) => {
                info!(
                    "🔔️ Notification feed live for {user} ({} notifications, {} matches)",
                    self.notifications.len(),
                    self.matches.len()
                );
                self.state = FeedState::Subscribed(user);
                Ok(())
            },
            Err(e) => {
                warn!("🔔️ Could not start the notification feed for {user}: {e}");
                self.unsubscribe();
                Err(e)
            },
        }
    }

    async fn load_and_follow(&mut self, user: &UserId) -> Result<(), StoreError> {
        let notifications = self.db.fetch_notifications(user, NOTIFICATION_VIEW_SIZE).await?;
        let matches = self.db.fetch_matches_for_user(user, MATCH_VIEW_SIZE).await?;
        let notification_cursor = notifications.iter().map(|n| n.id).max().unwrap_or(0);
        let match_cursor = matches.iter().map(|m| m.id).max().unwrap_or(0);
        for n in &notifications {
            self.seen.insert(Topic::Notifications, n.id);
        }
        for m in &matches {
            self.seen.insert(Topic::Matches, m.id);
        }
        self.notifications = notifications.into();
        self.matches = matches.into();
        self.follow(Topic::Matches, user, match_cursor).await?;
        self.follow(Topic::Notifications, user, notification_cursor).await?;
        Ok(())
    }

    async fn follow(&mut self, topic: Topic, user: &UserId, after_id: i64) -> Result<(), StoreError> {
        if let Some(mut previous) = self.slot_mut(topic).take() {
            previous.close();
        }
        let sub = self.db.subscribe(topic, RowFilter::Participant(user.clone()), after_id).await?;
        *self.slot_mut(topic) = Some(sub);
        Ok(())
    }

    /// Follows the session: subscribes for a newly signed-in user, and tears down on sign-out.
    pub async fn on_session_change(&mut self, user: Option<UserId>) -> Result<(), StoreError> {
        match user {
            Some(user) if self.user() == Some(&user) => Ok(()),
            Some(user) => self.subscribe(user).await,
            None => {
                self.unsubscribe();
                Ok(())
            },
        }
    }

    /// Waits for the next change that updates the view. Returns `None` when there is nothing left to wait on.
    pub async fn next_update(&mut self) -> Option<FeedUpdate> {
        loop {
            if self.match_sub.is_none() && self.notification_sub.is_none() {
                return None;
            }
            let event = tokio::select! {
                Some(ev) = recv_opt(&mut self.match_sub) => ev,
                Some(ev) = recv_opt(&mut self.notification_sub) => ev,
                else => return None,
            };
            if let Some(update) = self.apply(event) {
                return Some(update);
            }
        }
    }

    /// Applies a single change event to the view. Returns `None` if the event was dropped as a duplicate, as not
    /// concerning the signed-in user, or because the feed is not subscribed.
    pub fn apply(&mut self, event: ChangeEvent) -> Option<FeedUpdate> {
        let FeedState::Subscribed(me) = &self.state else {
            trace!("🔔️ Ignoring {} #{}: feed is not subscribed", event.topic(), event.row_id());
            return None;
        };
        if !event.row.concerns(me) {
            debug!("🔔️ Dropping {} #{}: not addressed to {me}", event.topic(), event.row_id());
            return None;
        }
        if !self.seen.insert(event.topic(), event.row_id()) {
            trace!("🔔️ Dropping redelivered {} #{}", event.topic(), event.row_id());
            return None;
        }
        match event.row {
            ChangedRow::Match(m) => {
                self.matches.push_front(m.clone());
                self.matches.truncate(MATCH_VIEW_SIZE);
                Some(FeedUpdate::Match(m))
            },
            ChangedRow::Notification(n) => {
                self.notifications.push_front(n.clone());
                self.notifications.truncate(NOTIFICATION_VIEW_SIZE);
                let alerted = !self.focused && self.raise_alert(&n);
                Some(FeedUpdate::Notification { event: n, alerted })
            },
        }
    }

    fn raise_alert(&self, n: &NotificationEvent) -> bool {
        match self.alerts.raise_alert(&n.title, &n.body) {
            Ok(()) => true,
            Err(e) => {
                debug!("🔔️ Alert for notification #{} was not shown: {e}", n.id);
                false
            },
        }
    }

    /// Marks a notification read in the store and in the local view.
    pub async fn mark_read(&mut self, id: i64) -> Result<bool, StoreError> {
        let user = self
            .user()
            .cloned()
            .ok_or_else(|| StoreError::InvalidArgument("no user is subscribed to this feed".into()))?;
        let changed = self.db.mark_notification_read(id, &user).await?;
        if changed {
            if let Some(n) = self.notifications.iter_mut().find(|n| n.id == id) {
                n.read = true;
            }
        }
        Ok(changed)
    }
}

async fn recv_opt(sub: &mut Option<Subscription>) -> Option<ChangeEvent> {
    match sub {
        Some(sub) => sub.recv().await,
        None => None,
    }
}
