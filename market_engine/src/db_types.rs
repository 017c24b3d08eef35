use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use market_common::Price;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Conversion error: {0}")]
pub struct ConversionError(String);

//--------------------------------------        UserId         ---------------------------------------------------------
/// The identity of a marketplace user, as issued by the (external) session provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------      ListingKind      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    /// The owner has something to sell.
    Selling,
    /// The owner is looking to buy something.
    Requesting,
}

impl ListingKind {
    pub fn opposite(&self) -> Self {
        match self {
            ListingKind::Selling => ListingKind::Requesting,
            ListingKind::Requesting => ListingKind::Selling,
        }
    }
}

impl Display for ListingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListingKind::Selling => write!(f, "selling"),
            ListingKind::Requesting => write!(f, "requesting"),
        }
    }
}

impl FromStr for ListingKind {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "selling" | "sell" | "offer" => Ok(Self::Selling),
            "requesting" | "request" | "wanted" | "buy" => Ok(Self::Requesting),
            s => Err(ConversionError(format!("Invalid listing kind: {s}"))),
        }
    }
}

//--------------------------------------        Listing        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Listing {
    pub id: i64,
    pub owner_id: UserId,
    pub kind: ListingKind,
    pub title: String,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------       NewListing      ---------------------------------------------------------
/// A listing as handed over by the posting flow, before it has been given an id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewListing {
    pub owner_id: UserId,
    pub kind: ListingKind,
    pub title: String,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub created_at: DateTime<Utc>,
}

impl NewListing {
    pub fn new<U: Into<UserId>, S: Into<String>>(owner_id: U, kind: ListingKind, title: S) -> Self {
        Self {
            owner_id: owner_id.into(),
            kind,
            title: title.into(),
            description: None,
            price: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_price(mut self, price: Price) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

//--------------------------------------         Match         ---------------------------------------------------------
/// A persisted, deduplicated record that a requesting listing and a selling listing are compatible.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Match {
    pub id: i64,
    pub buy_listing_id: i64,
    pub sell_listing_id: i64,
    pub buyer_id: UserId,
    pub seller_id: UserId,
    pub score: i64,
    pub created_at: DateTime<Utc>,
}

impl Match {
    pub fn involves(&self, user: &UserId) -> bool {
        &self.buyer_id == user || &self.seller_id == user
    }

    /// The other party to the match, from the point of view of `user`.
    pub fn counterparty(&self, user: &UserId) -> &UserId {
        if &self.buyer_id == user {
            &self.seller_id
        } else {
            &self.buyer_id
        }
    }
}

//--------------------------------------        NewMatch       ---------------------------------------------------------
/// The pair key and score for a match that is about to be written.
///
/// The pair key is always oriented by listing kind (`buy` is the requesting listing, `sell` the selling one), so the
/// unordered pair `{a, b}` has exactly one representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMatch {
    pub buy_listing_id: i64,
    pub sell_listing_id: i64,
    pub buyer_id: UserId,
    pub seller_id: UserId,
    pub score: i64,
}

impl NewMatch {
    pub fn from_pair(buy: &Listing, sell: &Listing, score: u32) -> Self {
        Self {
            buy_listing_id: buy.id,
            sell_listing_id: sell.id,
            buyer_id: buy.owner_id.clone(),
            seller_id: sell.owner_id.clone(),
            score: i64::from(score),
        }
    }
}

//--------------------------------------   InsertMatchResult   ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertMatchResult {
    Inserted(Match),
    AlreadyExists(Match),
}

impl InsertMatchResult {
    pub fn was_inserted(&self) -> bool {
        matches!(self, InsertMatchResult::Inserted(_))
    }

    pub fn into_match(self) -> Match {
        match self {
            InsertMatchResult::Inserted(m) | InsertMatchResult::AlreadyExists(m) => m,
        }
    }
}

//--------------------------------------      Conversation     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    pub post_id: i64,
    pub buyer_id: UserId,
    pub seller_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn is_participant(&self, user: &UserId) -> bool {
        &self.buyer_id == user || &self.seller_id == user
    }

    pub fn other_participant(&self, user: &UserId) -> &UserId {
        if &self.buyer_id == user {
            &self.seller_id
        } else {
            &self.buyer_id
        }
    }
}

//--------------------------------------    ConversationKey    ---------------------------------------------------------
/// The `(post, buyer, seller)` triple that identifies a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationKey {
    pub post_id: i64,
    pub buyer_id: UserId,
    pub seller_id: UserId,
}

impl ConversationKey {
    pub fn new<B: Into<UserId>, S: Into<UserId>>(post_id: i64, buyer_id: B, seller_id: S) -> Self {
        Self { post_id, buyer_id: buyer_id.into(), seller_id: seller_id.into() }
    }

    /// The key for a conversation about `post` between the two parties to a match.
    pub fn for_match(m: &Match, post_id: i64) -> Self {
        Self { post_id, buyer_id: m.buyer_id.clone(), seller_id: m.seller_id.clone() }
    }
}

//--------------------------------------        Message        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    pub sender_id: UserId,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------    NotificationType   ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    NewMatch,
    NewMessage,
}

impl Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationType::NewMatch => write!(f, "new_match"),
            NotificationType::NewMessage => write!(f, "new_message"),
        }
    }
}

impl From<String> for NotificationType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "new_match" => NotificationType::NewMatch,
            "new_message" => NotificationType::NewMessage,
            _ => {
                error!("Invalid notification type: {value}. But this conversion cannot fail. Defaulting to new_match");
                NotificationType::NewMatch
            },
        }
    }
}

//--------------------------------------   NotificationEvent   ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub id: i64,
    pub user_id: UserId,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub body: String,
    pub payload: Json<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

//--------------------------------------    NewNotification    ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub user_id: UserId,
    pub notification_type: NotificationType,
    pub title: String,
    pub body: String,
    pub payload: serde_json::Value,
}

impl NewNotification {
    /// The notification each party receives when a match is first recorded.
    pub fn for_match(m: &Match, recipient: &UserId) -> Self {
        let role = if recipient == &m.buyer_id { "request" } else { "listing" };
        Self {
            user_id: recipient.clone(),
            notification_type: NotificationType::NewMatch,
            title: "New match".to_string(),
            body: format!("Your {role} has a new match (score {}).", m.score),
            payload: serde_json::json!({
                "match_id": m.id,
                "buy_listing_id": m.buy_listing_id,
                "sell_listing_id": m.sell_listing_id,
                "counterparty": m.counterparty(recipient),
            }),
        }
    }

    pub fn for_message(conversation: &Conversation, message: &Message) -> Self {
        let recipient = conversation.other_participant(&message.sender_id).clone();
        let preview: String = message.body.chars().take(80).collect();
        Self {
            user_id: recipient,
            notification_type: NotificationType::NewMessage,
            title: format!("New message from {}", message.sender_id),
            body: preview,
            payload: serde_json::json!({
                "conversation_id": conversation.id,
                "message_id": message.id,
                "post_id": conversation.post_id,
            }),
        }
    }
}
