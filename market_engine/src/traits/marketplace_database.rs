use crate::traits::{ConversationManagement, ListingManagement, MatchManagement, NotificationManagement};

/// The full row-store contract a backend must meet to run the matcher.
pub trait MarketplaceDatabase:
    Clone + ListingManagement + MatchManagement + ConversationManagement + NotificationManagement {
    /// The URL of the database
    fn url(&self) -> &str;
}

/// Reports whether the store client is initialised and usable.
pub trait Readiness {
    fn is_ready(&self) -> bool;
}
