use serde::{Deserialize, Serialize};

use crate::db_types::{Conversation, Match};

/// Published once for every match the scanner records for the first time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCreatedEvent {
    pub new_match: Match,
}

impl MatchCreatedEvent {
    pub fn new(new_match: Match) -> Self {
        Self { new_match }
    }
}

/// Published whenever a user opens a conversation, whether or not it already existed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationOpenedEvent {
    pub conversation: Conversation,
}

impl ConversationOpenedEvent {
    pub fn new(conversation: Conversation) -> Self {
        Self { conversation }
    }
}
