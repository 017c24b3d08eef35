use crate::{
    db_types::{Listing, ListingKind, NewListing, UserId},
    traits::StoreError,
};

/// Read access to the listing store, plus ingest of listings created by the external posting flow.
///
/// All list queries are most-recent-first.
#[allow(async_fn_in_trait)]
pub trait ListingManagement {
    /// Stores a listing created elsewhere and returns the stored row.
    async fn insert_listing(&self, listing: NewListing) -> Result<Listing, StoreError>;

    async fn fetch_listing(&self, id: i64) -> Result<Option<Listing>, StoreError>;

    /// The most recent `limit` listings owned by `owner`.
    async fn fetch_listings_for_owner(&self, owner: &UserId, limit: usize) -> Result<Vec<Listing>, StoreError>;

    /// A snapshot of the most recent `limit` listings of the given `kind`.
    async fn fetch_candidate_pool(&self, kind: ListingKind, limit: usize) -> Result<Vec<Listing>, StoreError>;

    async fn fetch_all_listings(&self, limit: usize) -> Result<Vec<Listing>, StoreError>;
}
