use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Conversation, ConversationKey, Message, UserId},
    events::{ConversationOpenedEvent, EventProducers},
    traits::{ConversationManagement, ConversationOpener, MatchManagement, NoConversationUi, StoreError},
};

/// Opens conversations between the parties to a match and carries their messages.
///
/// Opening is a user-initiated action, so failures are returned to the caller rather than swallowed.
pub struct ConversationApi<B, O = NoConversationUi> {
    db: B,
    producers: EventProducers,
    opener: O,
}

impl<B, O> Debug for ConversationApi<B, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ConversationApi")
    }
}

impl<B> ConversationApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers, opener: NoConversationUi }
    }
}

impl<B, O> ConversationApi<B, O> {
    /// Routes opened conversations to a UI.
    pub fn with_opener<O2: ConversationOpener>(self, opener: O2) -> ConversationApi<B, O2> {
        ConversationApi { db: self.db, producers: self.producers, opener }
    }
}

impl<B, O> ConversationApi<B, O>
where
    B: ConversationManagement + MatchManagement,
    O: ConversationOpener,
{
    /// Gets or creates the conversation for `key` and hands it to the conversation UI.
    pub async fn open_conversation(&self, key: &ConversationKey) -> Result<Conversation, StoreError> {
        let conversation = self.db.get_or_create_conversation(key).await?;
        debug!("💬️ Opening conversation #{} for listing {}", conversation.id, conversation.post_id);
        self.opener.open_conversation(&conversation);
        for emitter in &self.producers.conversation_opened_producer {
            emitter.publish_event(ConversationOpenedEvent::new(conversation.clone())).await;
        }
        Ok(conversation)
    }

    /// Opens the conversation about the selling listing of a match, between its buyer and seller.
    pub async fn open_for_match(&self, match_id: i64) -> Result<Conversation, StoreError> {
        let m = self
            .db
            .fetch_match(match_id)
            .await?
            .ok_or_else(|| StoreError::InvalidArgument(format!("match {match_id} does not exist")))?;
        let key = ConversationKey::for_match(&m, m.sell_listing_id);
        self.open_conversation(&key).await
    }

    pub async fn conversations_for_user(&self, user: &UserId) -> Result<Vec<Conversation>, StoreError> {
        self.db.fetch_conversations_for_user(user).await
    }

    pub async fn post_message(&self, conversation_id: i64, sender: &UserId, body: &str) -> Result<Message, StoreError> {
        self.db.post_message(conversation_id, sender, body).await
    }

    pub async fn messages(&self, conversation_id: i64) -> Result<Vec<Message>, StoreError> {
        self.db.fetch_messages(conversation_id).await
    }
}
