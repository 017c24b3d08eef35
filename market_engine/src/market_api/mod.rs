//! # Marketplace matcher public API
//!
//! The `market_api` module exposes the programmatic API for the matcher. The API is modular, so that clients can pick
//! the functionality they want.
//!
//! * [`match_flow_api`] scans listings for compatible counterparts, records matches and serves the match views.
//! * [`conversation_api`] opens conversations between matched users and carries their messages.
//! * [`notification_api`] reads and acknowledges per-user notifications.
//!
//! # API usage
//!
//! Every API is created by supplying a database backend that implements the backend traits it needs.
//!
//! ```rust,ignore
//! use market_engine::{events::EventProducers, MatchFlowApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/marketplace.db", 5).await?;
//! let api = MatchFlowApi::new(db, EventProducers::default());
//! let report = api.scan_for_user(&"alice".into()).await?;
//! ```
pub mod conversation_api;
pub mod match_flow_api;
pub mod notification_api;
pub mod scan_objects;
