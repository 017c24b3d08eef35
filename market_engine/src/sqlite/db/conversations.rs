use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Conversation, ConversationKey, Message, UserId},
    traits::StoreError,
};

/// The columns of the unique index that makes conversation creation idempotent.
pub const CONVERSATION_KEY: [&str; 3] =
    ["conversations.post_id", "conversations.buyer_id", "conversations.seller_id"];

pub async fn fetch_conversation_by_key(
    key: &ConversationKey,
    conn: &mut SqliteConnection,
) -> Result<Option<Conversation>, StoreError> {
    let conversation =
        sqlx::query_as("SELECT * FROM conversations WHERE post_id = $1 AND buyer_id = $2 AND seller_id = $3")
            .bind(key.post_id)
            .bind(key.buyer_id.as_str())
            .bind(key.seller_id.as_str())
            .fetch_optional(conn)
            .await?;
    Ok(conversation)
}

/// Fails with `StoreError::Conflict` if a conversation already exists for the key.
pub async fn insert_conversation(
    key: &ConversationKey,
    conn: &mut SqliteConnection,
) -> Result<Conversation, StoreError> {
    let conversation: Conversation = sqlx::query_as(
        "INSERT INTO conversations (post_id, buyer_id, seller_id) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(key.post_id)
    .bind(key.buyer_id.as_str())
    .bind(key.seller_id.as_str())
    .fetch_one(conn)
    .await?;
    debug!(
        "💬️ Conversation #{} opened between {} and {} about listing {}",
        conversation.id, conversation.buyer_id, conversation.seller_id, conversation.post_id
    );
    Ok(conversation)
}

pub async fn fetch_conversation(id: i64, conn: &mut SqliteConnection) -> Result<Option<Conversation>, StoreError> {
    let conversation =
        sqlx::query_as("SELECT * FROM conversations WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(conversation)
}

pub async fn fetch_conversations_for_user(
    user: &UserId,
    conn: &mut SqliteConnection,
) -> Result<Vec<Conversation>, StoreError> {
    let conversations =
        sqlx::query_as("SELECT * FROM conversations WHERE buyer_id = $1 OR seller_id = $1 ORDER BY id DESC")
            .bind(user.as_str())
            .fetch_all(conn)
            .await?;
    Ok(conversations)
}

pub async fn insert_message(
    conversation_id: i64,
    sender: &UserId,
    body: &str,
    conn: &mut SqliteConnection,
) -> Result<Message, StoreError> {
    let message: Message = sqlx::query_as(
        "INSERT INTO messages (conversation_id, sender_id, body) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(conversation_id)
    .bind(sender.as_str())
    .bind(body)
    .fetch_one(conn)
    .await?;
    Ok(message)
}

pub async fn fetch_messages(conversation_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Message>, StoreError> {
    let messages = sqlx::query_as("SELECT * FROM messages WHERE conversation_id = $1 ORDER BY id ASC")
        .bind(conversation_id)
        .fetch_all(conn)
        .await?;
    Ok(messages)
}
