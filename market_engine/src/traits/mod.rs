//! # Storage and collaborator contracts
//!
//! This module defines the interface contracts the matcher needs from its backends and from the surrounding
//! application.
//!
//! ## Row store
//! * [`ListingManagement`] reads the listing store and ingests new listings.
//! * [`MatchManagement`] records matches idempotently and serves the "view matches" read path.
//! * [`ConversationManagement`] gets-or-creates conversations and stores their messages.
//! * [`NotificationManagement`] reads and acknowledges per-user notifications.
//! * [`MarketplaceDatabase`] ties them together for a concrete backend.
//!
//! Every operation fails with a [`StoreError`]. Uniqueness constraints in the store, not in-process locks, are what
//! keep concurrent writers from creating duplicate matches or conversations.
//!
//! ## Change events
//! [`ChangeFeed`] delivers row inserts on the match and notification tables as cancellable [`Subscription`]s.
//!
//! ## Collaborators
//! [`SessionProvider`], [`AlertSurface`] and [`ConversationOpener`] are supplied by whatever front end hosts the
//! engine. No-op defaults are provided.
mod change_feed;
mod collaborators;
mod conversation_management;
mod listing_management;
mod marketplace_database;
mod match_management;
mod notification_management;
mod store_error;
mod validation;

pub use change_feed::{ChangeEvent, ChangeFeed, ChangeOperation, ChangedRow, RowFilter, Subscription, Topic};
pub use collaborators::{
    AlertError,
    AlertSurface,
    ConversationOpener,
    NoAlerts,
    NoConversationUi,
    SessionHandle,
    SessionProvider,
    StaticSession,
};
pub use conversation_management::ConversationManagement;
pub use listing_management::ListingManagement;
pub use marketplace_database::{MarketplaceDatabase, Readiness};
pub use match_management::MatchManagement;
pub use notification_management::{NotificationManagement, MAX_NOTIFICATIONS};
pub use store_error::StoreError;
pub use validation::{require_id, require_user};
