use crate::{
    db_types::{InsertMatchResult, Listing, Match, UserId},
    traits::StoreError,
};

#[allow(async_fn_in_trait)]
pub trait MatchManagement {
    /// Records a match between a requesting listing (`buy`) and a selling listing (`sell`), unless one already exists
    /// for the pair.
    ///
    /// This call is idempotent. Two concurrent callers racing on the same pair both succeed: exactly one receives
    /// `Inserted`, the other `AlreadyExists` carrying the winner's row. A new match and the notifications for both
    /// parties are written atomically.
    ///
    /// A pair that could never be a legal match is rejected with `InvalidArgument` before touching storage.
    async fn create_match_if_absent(
        &self,
        buy: &Listing,
        sell: &Listing,
        score: u32,
    ) -> Result<InsertMatchResult, StoreError>;

    async fn fetch_match(&self, id: i64) -> Result<Option<Match>, StoreError>;

    /// Matches where `user` is buyer or seller, most recent first.
    async fn fetch_matches_for_user(&self, user: &UserId, limit: usize) -> Result<Vec<Match>, StoreError>;
}
