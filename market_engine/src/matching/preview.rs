use log::trace;
use serde::Serialize;

use super::{filter::is_compatible, scorer::score_profiles, tokenizer::TokenProfile};
use crate::db_types::{Listing, ListingKind, UserId};

pub const DEFAULT_MATCH_THRESHOLD: u32 = 30;
pub const DEFAULT_MAX_PER_LISTING: usize = 10;

/// A scored, not-yet-persisted pairing of an owned `listing` with a `candidate` from the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchCandidate {
    pub listing: Listing,
    pub candidate: Listing,
    pub score: u32,
}

impl MatchCandidate {
    /// The pair ordered as `(buy, sell)`, i.e. the requesting listing first.
    pub fn buy_sell(&self) -> (&Listing, &Listing) {
        match self.listing.kind {
            ListingKind::Requesting => (&self.listing, &self.candidate),
            ListingKind::Selling => (&self.candidate, &self.listing),
        }
    }
}

/// The ranked matches for one of the viewer's listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingMatches {
    pub listing: Listing,
    pub matches: Vec<MatchCandidate>,
}

/// Threshold and cap applied when ranking a candidate pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matcher {
    pub threshold: u32,
    pub max_per_listing: usize,
}

impl Default for Matcher {
    fn default() -> Self {
        Self { threshold: DEFAULT_MATCH_THRESHOLD, max_per_listing: DEFAULT_MAX_PER_LISTING }
    }
}

impl Matcher {
    pub fn new(threshold: u32, max_per_listing: usize) -> Self {
        Self { threshold, max_per_listing }
    }

    /// Ranks `pool` against `listing`. See [`rank_candidates`].
    pub fn rank(&self, listing: &Listing, pool: &[Listing]) -> Vec<MatchCandidate> {
        let profiles: Vec<TokenProfile> = pool.iter().map(TokenProfile::of).collect();
        self.rank_profiled(listing, pool, &profiles)
    }

    fn rank_profiled(&self, listing: &Listing, pool: &[Listing], profiles: &[TokenProfile]) -> Vec<MatchCandidate> {
        let own = TokenProfile::of(listing);
        let mut ranked: Vec<MatchCandidate> = pool
            .iter()
            .zip(profiles)
            .filter(|(candidate, _)| is_compatible(listing, candidate))
            .map(|(candidate, profile)| {
                let score = score_profiles(&own, listing.price, profile, candidate.price).total();
                (candidate, score)
            })
            .filter(|(_, score)| *score >= self.threshold)
            .map(|(candidate, score)| MatchCandidate { listing: listing.clone(), candidate: candidate.clone(), score })
            .collect();
        // stable, so equal scores keep pool (recency) order
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked.truncate(self.max_per_listing);
        trace!("🔎️ Listing {} has {} candidates at or above {}", listing.id, ranked.len(), self.threshold);
        ranked
    }

    /// See [`scan_all_for_viewer`].
    pub fn scan_all_for_viewer(&self, viewer: &UserId, all_listings: &[Listing]) -> Vec<ListingMatches> {
        let profiles: Vec<TokenProfile> = all_listings.iter().map(TokenProfile::of).collect();
        all_listings
            .iter()
            .filter(|l| &l.owner_id == viewer)
            .map(|listing| ListingMatches {
                listing: listing.clone(),
                matches: self.rank_profiled(listing, all_listings, &profiles),
            })
            .collect()
    }
}

/// Filters, scores and ranks `pool` against `listing`.
///
/// Only compatible candidates scoring at least `threshold` are kept. The result is sorted by descending score and holds
/// at most `max_per_listing` entries.
pub fn rank_candidates(
    listing: &Listing,
    pool: &[Listing],
    threshold: u32,
    max_per_listing: usize,
) -> Vec<MatchCandidate> {
    Matcher::new(threshold, max_per_listing).rank(listing, pool)
}

/// The in-memory "preview my matches" view.
///
/// Scores every listing owned by `viewer` against the complete, pre-fetched `all_listings` set and returns one ranked,
/// capped entry per owned listing, in the order the owned listings appear. Nothing is persisted and no notifications
/// follow.
pub fn scan_all_for_viewer(viewer: &UserId, all_listings: &[Listing], max_per_listing: usize) -> Vec<ListingMatches> {
    Matcher::new(DEFAULT_MATCH_THRESHOLD, max_per_listing).scan_all_for_viewer(viewer, all_listings)
}
