//! Marketplace Matcher Engine
//!
//! The engine pairs "selling" listings with compatible "requesting" listings on a peer-to-peer marketplace, records
//! each compatible pair exactly once, notifies both parties and opens conversations between them. It is
//! storage-agnostic; SQLite is the bundled backend.
//!
//! The library is divided into these sections:
//! 1. Matching ([`mod@matching`]). Pure functions: tokenizing listing text, the compatibility filter, the scorer and
//!    ranking. Nothing here fails or touches storage.
//! 2. Storage contracts ([`mod@traits`]) and the SQLite backend ([`SqliteDatabase`]). Idempotence of matches and
//!    conversations is enforced by uniqueness constraints in the store, so concurrent writers in different processes
//!    converge on one row.
//! 3. The public API ([`MatchFlowApi`], [`ConversationApi`], [`NotificationApi`]). Scans are triggered explicitly, on
//!    a new listing or on demand.
//! 4. Realtime delivery. [`fanout::NotificationFeed`] follows the store's change feed for one signed-in user, and
//!    [`bootstrap::BootstrapSupervisor`] starts it once the session and the store are ready.
//!
//! The engine also emits application events ([`mod@events`]) that can be hooked, e.g. to push a message to an external
//! channel whenever a match is created.
pub mod bootstrap;
pub mod db_types;
pub mod events;
pub mod fanout;
mod market_api;
pub mod matching;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use market_api::{
    conversation_api::ConversationApi,
    match_flow_api::MatchFlowApi,
    notification_api::NotificationApi,
    scan_objects::{ScanConfig, ScanReport},
};
#[cfg(feature = "sqlite")]
pub use sqlite::{db::db_url, SqliteDatabase, DEFAULT_POLL_INTERVAL};
