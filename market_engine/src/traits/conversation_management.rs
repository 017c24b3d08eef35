use crate::{
    db_types::{Conversation, ConversationKey, Message, UserId},
    traits::StoreError,
};

#[allow(async_fn_in_trait)]
pub trait ConversationManagement {
    /// Returns the conversation for `key`, creating it if necessary. Concurrent callers with the same key converge on
    /// a single row.
    async fn get_or_create_conversation(&self, key: &ConversationKey) -> Result<Conversation, StoreError>;

    async fn fetch_conversation(&self, id: i64) -> Result<Option<Conversation>, StoreError>;

    async fn fetch_conversations_for_user(&self, user: &UserId) -> Result<Vec<Conversation>, StoreError>;

    /// Appends a message to the conversation and notifies the other participant, in one transaction.
    ///
    /// The sender must be one of the two participants.
    async fn post_message(&self, conversation_id: i64, sender: &UserId, body: &str) -> Result<Message, StoreError>;

    /// All messages in the conversation, oldest first.
    async fn fetch_messages(&self, conversation_id: i64) -> Result<Vec<Message>, StoreError>;
}
