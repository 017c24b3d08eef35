use std::fmt::Display;

use chrono::{DateTime, Utc};
use log::debug;
use market_common::Price;
use market_engine::{
    db_types::{Listing, ListingKind, NewListing, NotificationEvent},
    ScanReport,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }
}

/// The body of a `listing_created` webhook call from the posting flow.
///
/// `kind` accepts the usual synonyms ("sell", "wanted", ...). `price` is free text; a price that cannot be read is
/// dropped and the listing is stored without one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewListingRequest {
    pub owner_id: String,
    pub kind: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl TryFrom<NewListingRequest> for NewListing {
    type Error = String;

    fn try_from(req: NewListingRequest) -> Result<Self, Self::Error> {
        let kind = req.kind.parse::<ListingKind>().map_err(|e| e.to_string())?;
        let mut listing = NewListing::new(req.owner_id, kind, req.title);
        if let Some(description) = req.description.filter(|d| !d.trim().is_empty()) {
            listing = listing.with_description(description);
        }
        match req.price.as_deref().map(str::parse::<Price>) {
            Some(Ok(price)) => listing = listing.with_price(price),
            Some(Err(e)) => debug!("💻️ Ignoring listing price. {e}"),
            None => {},
        }
        if let Some(created_at) = req.created_at {
            listing = listing.with_created_at(created_at);
        }
        Ok(listing)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingCreatedResponse {
    pub listing: Listing,
    /// Absent when auto-scan is off, or when the scan failed.
    pub scan: Option<ScanReport>,
}

/// Opens a conversation either for an existing match, or for an explicit (post, buyer, seller) key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OpenConversationRequest {
    ForMatch { match_id: i64 },
    ForKey { post_id: i64, buyer_id: String, seller_id: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostMessageRequest {
    pub sender_id: String,
    pub body: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsResponse {
    pub unread: i64,
    pub notifications: Vec<NotificationEvent>,
}
