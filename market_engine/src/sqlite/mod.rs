//! The SQLite backend for the marketplace matcher.
//!
//! [`SqliteDatabase`] implements every storage trait in [`crate::traits`], plus a polling
//! [`crate::traits::ChangeFeed`].
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::{SqliteDatabase, DEFAULT_POLL_INTERVAL};
