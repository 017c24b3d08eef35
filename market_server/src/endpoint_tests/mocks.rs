use market_engine::{
    db_types::{
        Conversation,
        ConversationKey,
        InsertMatchResult,
        Listing,
        ListingKind,
        Match,
        Message,
        NewListing,
        NotificationEvent,
        UserId,
    },
    traits::{ConversationManagement, ListingManagement, MatchManagement, NotificationManagement, StoreError},
};
use mockall::mock;

mock! {
    pub MarketBackend {}
    impl ListingManagement for MarketBackend {
        async fn insert_listing(&self, listing: NewListing) -> Result<Listing, StoreError>;
        async fn fetch_listing(&self, id: i64) -> Result<Option<Listing>, StoreError>;
        async fn fetch_listings_for_owner(&self, owner: &UserId, limit: usize) -> Result<Vec<Listing>, StoreError>;
        async fn fetch_candidate_pool(&self, kind: ListingKind, limit: usize) -> Result<Vec<Listing>, StoreError>;
        async fn fetch_all_listings(&self, limit: usize) -> Result<Vec<Listing>, StoreError>;
    }
    impl MatchManagement for MarketBackend {
        async fn create_match_if_absent(&self, buy: &Listing, sell: &Listing, score: u32) -> Result<InsertMatchResult, StoreError>;
        async fn fetch_match(&self, id: i64) -> Result<Option<Match>, StoreError>;
        async fn fetch_matches_for_user(&self, user: &UserId, limit: usize) -> Result<Vec<Match>, StoreError>;
    }
    impl ConversationManagement for MarketBackend {
        async fn get_or_create_conversation(&self, key: &ConversationKey) -> Result<Conversation, StoreError>;
        async fn fetch_conversation(&self, id: i64) -> Result<Option<Conversation>, StoreError>;
        async fn fetch_conversations_for_user(&self, user: &UserId) -> Result<Vec<Conversation>, StoreError>;
        async fn post_message(&self, conversation_id: i64, sender: &UserId, body: &str) -> Result<Message, StoreError>;
        async fn fetch_messages(&self, conversation_id: i64) -> Result<Vec<Message>, StoreError>;
    }
    impl NotificationManagement for MarketBackend {
        async fn fetch_notifications(&self, user: &UserId, limit: usize) -> Result<Vec<NotificationEvent>, StoreError>;
        async fn mark_notification_read(&self, id: i64, user: &UserId) -> Result<bool, StoreError>;
        async fn mark_all_notifications_read(&self, user: &UserId) -> Result<u64, StoreError>;
        async fn count_unread_notifications(&self, user: &UserId) -> Result<i64, StoreError>;
    }
}
