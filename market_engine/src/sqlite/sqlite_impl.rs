//! `SqliteDatabase` is the concrete backend for the marketplace matcher.
//!
//! It uses SQLite as the row store and implements all the traits defined in the [`crate::traits`] module.
use std::{fmt::Debug, time::Duration};

use log::*;
use sqlx::SqlitePool;
use tokio::sync::mpsc;

use super::db::{
    change_feed,
    conversations::{self, CONVERSATION_KEY},
    db_url,
    listings,
    matches::{self, MATCH_PAIR_KEY},
    new_pool,
    notifications,
};
use crate::{
    db_types::{
        Conversation,
        ConversationKey,
        InsertMatchResult,
        Listing,
        ListingKind,
        Match,
        Message,
        NewListing,
        NewMatch,
        NewNotification,
        NotificationEvent,
        UserId,
    },
    traits::{
        require_id,
        require_user,
        ChangeFeed,
        ConversationManagement,
        ListingManagement,
        MarketplaceDatabase,
        MatchManagement,
        NotificationManagement,
        Readiness,
        RowFilter,
        StoreError,
        Subscription,
        Topic,
        MAX_NOTIFICATIONS,
    },
};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
const SUBSCRIPTION_BUFFER: usize = 128;

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
    poll_interval: Duration,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, connecting to the URL in `MKT_DATABASE_URL`.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        trace!("🗃️ Connected to {url}");
        Ok(Self { url: url.to_string(), pool, poll_interval: DEFAULT_POLL_INTERVAL })
    }

    /// Sets how often change-feed subscriptions poll for new rows.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Applies any outstanding schema migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations are up to date");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        debug!("🗃️ Connection pool closed");
    }

    /// Writes the match and a notification for each party in one transaction. The match insert is the first
    /// statement, so a losing racer fails on the unique index before anything else is written.
    async fn insert_match_with_notifications(&self, new_match: NewMatch) -> Result<Match, StoreError> {
        let mut tx = self.pool.begin().await?;
        let m = matches::insert_match(new_match, &mut tx).await?;
        for recipient in [&m.buyer_id, &m.seller_id] {
            notifications::insert_notification(NewNotification::for_match(&m, recipient), &mut tx).await?;
        }
        tx.commit().await?;
        Ok(m)
    }

    async fn insert_conversation(&self, key: &ConversationKey) -> Result<Conversation, StoreError> {
        let mut tx = self.pool.begin().await?;
        let conversation = conversations::insert_conversation(key, &mut tx).await?;
        tx.commit().await?;
        Ok(conversation)
    }
}

impl MarketplaceDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }
}

impl Readiness for SqliteDatabase {
    fn is_ready(&self) -> bool {
        !self.pool.is_closed()
    }
}

impl ListingManagement for SqliteDatabase {
    async fn insert_listing(&self, listing: NewListing) -> Result<Listing, StoreError> {
        require_user(&listing.owner_id, "owner")?;
        if listing.title.trim().is_empty() {
            return Err(StoreError::InvalidArgument("a listing needs a title".into()));
        }
        let mut tx = self.pool.begin().await?;
        let listing = listings::insert_listing(listing, &mut tx).await?;
        tx.commit().await?;
        Ok(listing)
    }

    async fn fetch_listing(&self, id: i64) -> Result<Option<Listing>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        listings::fetch_listing(id, &mut conn).await
    }

    async fn fetch_listings_for_owner(&self, owner: &UserId, limit: usize) -> Result<Vec<Listing>, StoreError> {
        require_user(owner, "owner")?;
        let mut conn = self.pool.acquire().await?;
        listings::fetch_listings_for_owner(owner, limit, &mut conn).await
    }

    async fn fetch_candidate_pool(&self, kind: ListingKind, limit: usize) -> Result<Vec<Listing>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        listings::fetch_listings_by_kind(kind, limit, &mut conn).await
    }

    async fn fetch_all_listings(&self, limit: usize) -> Result<Vec<Listing>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        listings::fetch_all_listings(limit, &mut conn).await
    }
}

impl MatchManagement for SqliteDatabase {
    async fn create_match_if_absent(
        &self,
        buy: &Listing,
        sell: &Listing,
        score: u32,
    ) -> Result<InsertMatchResult, StoreError> {
        let new_match = NewMatch::validated(buy, sell, score)?;
        let (buy_id, sell_id) = (new_match.buy_listing_id, new_match.sell_listing_id);
        {
            let mut conn = self.pool.acquire().await?;
            if let Some(existing) = matches::fetch_match_by_pair(buy_id, sell_id, &mut conn).await? {
                trace!("🗃️ Listings {buy_id} and {sell_id} are already matched (#{})", existing.id);
                return Ok(InsertMatchResult::AlreadyExists(existing));
            }
        }
        match self.insert_match_with_notifications(new_match).await {
            Ok(m) => Ok(InsertMatchResult::Inserted(m)),
            Err(e) if e.is_conflict_on(&MATCH_PAIR_KEY) => {
                debug!("🗃️ Lost the race to match listings {buy_id} and {sell_id}. Using the existing match.");
                let mut conn = self.pool.acquire().await?;
                matches::fetch_match_by_pair(buy_id, sell_id, &mut conn)
                    .await?
                    .map(InsertMatchResult::AlreadyExists)
                    .ok_or_else(|| {
                        StoreError::Unexpected(format!("match for listings {buy_id}/{sell_id} conflicted but is gone"))
                    })
            },
            Err(e) => Err(e.unexpected_unless_conflict_on(&MATCH_PAIR_KEY)),
        }
    }

    async fn fetch_match(&self, id: i64) -> Result<Option<Match>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        matches::fetch_match(id, &mut conn).await
    }

    async fn fetch_matches_for_user(&self, user: &UserId, limit: usize) -> Result<Vec<Match>, StoreError> {
        require_user(user, "user")?;
        let mut conn = self.pool.acquire().await?;
        matches::fetch_matches_for_user(user, limit, &mut conn).await
    }
}

impl ConversationManagement for SqliteDatabase {
    async fn get_or_create_conversation(&self, key: &ConversationKey) -> Result<Conversation, StoreError> {
        key.validate()?;
        {
            let mut conn = self.pool.acquire().await?;
            if let Some(conversation) = conversations::fetch_conversation_by_key(key, &mut conn).await? {
                return Ok(conversation);
            }
        }
        match self.insert_conversation(key).await {
            Ok(conversation) => Ok(conversation),
            Err(e) if e.is_conflict_on(&CONVERSATION_KEY) => {
                debug!("💬️ Conversation about listing {} was created concurrently. Re-fetching.", key.post_id);
                let mut conn = self.pool.acquire().await?;
                conversations::fetch_conversation_by_key(key, &mut conn).await?.ok_or_else(|| {
                    StoreError::Unexpected(format!("conversation about listing {} conflicted but is gone", key.post_id))
                })
            },
            Err(e) => Err(e.unexpected_unless_conflict_on(&CONVERSATION_KEY)),
        }
    }

    async fn fetch_conversation(&self, id: i64) -> Result<Option<Conversation>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        conversations::fetch_conversation(id, &mut conn).await
    }

    async fn fetch_conversations_for_user(&self, user: &UserId) -> Result<Vec<Conversation>, StoreError> {
        require_user(user, "user")?;
        let mut conn = self.pool.acquire().await?;
        conversations::fetch_conversations_for_user(user, &mut conn).await
    }

    async fn post_message(&self, conversation_id: i64, sender: &UserId, body: &str) -> Result<Message, StoreError> {
        require_id(conversation_id, "conversation")?;
        require_user(sender, "sender")?;
        if body.trim().is_empty() {
            return Err(StoreError::InvalidArgument("message body must not be empty".into()));
        }
        let conversation = {
            let mut conn = self.pool.acquire().await?;
            conversations::fetch_conversation(conversation_id, &mut conn).await?
        }
        .ok_or_else(|| StoreError::InvalidArgument(format!("conversation {conversation_id} does not exist")))?;
        if !conversation.is_participant(sender) {
            return Err(StoreError::InvalidArgument(format!(
                "{sender} is not a participant in conversation {conversation_id}"
            )));
        }
        let mut tx = self.pool.begin().await?;
        let message = conversations::insert_message(conversation_id, sender, body, &mut tx).await?;
        notifications::insert_notification(NewNotification::for_message(&conversation, &message), &mut tx).await?;
        tx.commit().await?;
        debug!("💬️ {sender} posted message #{} in conversation #{conversation_id}", message.id);
        Ok(message)
    }

    async fn fetch_messages(&self, conversation_id: i64) -> Result<Vec<Message>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        conversations::fetch_messages(conversation_id, &mut conn).await
    }
}

impl NotificationManagement for SqliteDatabase {
    async fn fetch_notifications(&self, user: &UserId, limit: usize) -> Result<Vec<NotificationEvent>, StoreError> {
        require_user(user, "user")?;
        let mut conn = self.pool.acquire().await?;
        notifications::fetch_notifications(user, limit.min(MAX_NOTIFICATIONS), &mut conn).await
    }

    async fn mark_notification_read(&self, id: i64, user: &UserId) -> Result<bool, StoreError> {
        require_user(user, "user")?;
        let mut conn = self.pool.acquire().await?;
        notifications::mark_read(id, user, &mut conn).await
    }

    async fn mark_all_notifications_read(&self, user: &UserId) -> Result<u64, StoreError> {
        require_user(user, "user")?;
        let mut conn = self.pool.acquire().await?;
        notifications::mark_all_read(user, &mut conn).await
    }

    async fn count_unread_notifications(&self, user: &UserId) -> Result<i64, StoreError> {
        require_user(user, "user")?;
        let mut conn = self.pool.acquire().await?;
        notifications::count_unread(user, &mut conn).await
    }
}

impl ChangeFeed for SqliteDatabase {
    async fn subscribe(&self, topic: Topic, filter: RowFilter, after_id: i64) -> Result<Subscription, StoreError> {
        if let RowFilter::Participant(user) = &filter {
            require_user(user, "subscriber")?;
        }
        let (sender, receiver) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let poller = change_feed::poll_changes(self.pool.clone(), topic, filter, after_id, self.poll_interval, sender);
        let task = tokio::spawn(poller);
        Ok(Subscription::new(topic, receiver, Some(task)))
    }
}
