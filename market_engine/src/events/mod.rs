//! Engine-level events and the hooks that consume them.
//!
//! These are application events published by the API layer. They are unrelated to the store-level
//! [`crate::traits::ChangeFeed`], which reports raw row inserts.
mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::{ConversationOpenedEvent, MatchCreatedEvent};
pub use hooks::{EventHandlers, EventHooks, EventProducers};
