use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{InsertMatchResult, Listing, ListingKind, Match, NewListing, UserId},
    events::{EventProducers, MatchCreatedEvent},
    market_api::scan_objects::{ScanConfig, ScanReport, PREVIEW_LISTING_LIMIT},
    matching::{is_compatible, ListingMatches},
    traits::{require_user, ListingManagement, MatchManagement, StoreError},
};

/// `MatchFlowApi` is the primary API for finding and recording matches.
///
/// Scans are triggered explicitly, either when a new listing arrives or on demand for a user. Matches are written
/// through [`MatchManagement::create_match_if_absent`], so running the same scan twice, or two scans concurrently in
/// different processes, never produces a duplicate.
pub struct MatchFlowApi<B> {
    db: B,
    producers: EventProducers,
    config: ScanConfig,
}

impl<B> Debug for MatchFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MatchFlowApi ({:?})", self.config)
    }
}

impl<B> MatchFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers, config: ScanConfig::default() }
    }

    pub fn with_config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> MatchFlowApi<B>
where B: ListingManagement + MatchManagement
{
    /// Stores a listing created by the posting flow. Scanning is left to the caller.
    pub async fn ingest_listing(&self, listing: NewListing) -> Result<Listing, StoreError> {
        self.db.insert_listing(listing).await
    }

    /// Scans the user's most recent listings against the opposite-kind candidate pools and records every match that
    /// clears the threshold, up to the per-listing cap.
    ///
    /// A storage failure stops the scan. Matches recorded before the failure stay recorded.
    pub async fn scan_for_user(&self, user: &UserId) -> Result<ScanReport, StoreError> {
        require_user(user, "user")?;
        let own = self.db.fetch_listings_for_owner(user, self.config.own_listing_page).await?;
        let mut selling_pool = None;
        let mut requesting_pool = None;
        let mut report = ScanReport::default();
        for listing in &own {
            let slot = match listing.kind.opposite() {
                ListingKind::Selling => &mut selling_pool,
                ListingKind::Requesting => &mut requesting_pool,
            };
            if slot.is_none() {
                let pool_size = self.config.candidate_pool_size;
                *slot = Some(self.db.fetch_candidate_pool(listing.kind.opposite(), pool_size).await?);
            }
            let pool = slot.as_deref().unwrap_or_default();
            report.merge(self.scan_listing_against(listing, pool).await?);
        }
        info!("🔍️ Scan for {user}: {report}");
        Ok(report)
    }

    /// Scans a single listing, typically one that was just posted.
    pub async fn scan_for_listing(&self, listing_id: i64) -> Result<ScanReport, StoreError> {
        let listing = self
            .db
            .fetch_listing(listing_id)
            .await?
            .ok_or_else(|| StoreError::InvalidArgument(format!("listing {listing_id} does not exist")))?;
        let pool = self.db.fetch_candidate_pool(listing.kind.opposite(), self.config.candidate_pool_size).await?;
        let report = self.scan_listing_against(&listing, &pool).await?;
        info!("🔍️ Scan for listing #{listing_id}: {report}");
        Ok(report)
    }

    /// The compute-on-view preview: ranks every listing `viewer` owns against all current listings without persisting
    /// anything.
    pub async fn preview_for_viewer(&self, viewer: &UserId) -> Result<Vec<ListingMatches>, StoreError> {
        require_user(viewer, "viewer")?;
        let all = self.db.fetch_all_listings(PREVIEW_LISTING_LIMIT).await?;
        Ok(self.config.matcher().scan_all_for_viewer(viewer, &all))
    }

    pub async fn fetch_matches_for_user(&self, user: &UserId, limit: usize) -> Result<Vec<Match>, StoreError> {
        self.db.fetch_matches_for_user(user, limit).await
    }

    async fn scan_listing_against(&self, listing: &Listing, pool: &[Listing]) -> Result<ScanReport, StoreError> {
        let candidates_scored = pool.iter().filter(|c| is_compatible(listing, c)).count();
        let ranked = self.config.matcher().rank(listing, pool);
        let mut report = ScanReport { listings_scanned: 1, candidates_scored, ..Default::default() };
        for candidate in ranked {
            let (buy, sell) = candidate.buy_sell();
            match self.db.create_match_if_absent(buy, sell, candidate.score).await? {
                InsertMatchResult::Inserted(m) => {
                    report.matches_created += 1;
                    self.call_match_created_hook(&m).await;
                },
                InsertMatchResult::AlreadyExists(_) => report.already_existing += 1,
            }
        }
        trace!("🔍️ Listing #{}: {report}", listing.id);
        Ok(report)
    }

    async fn call_match_created_hook(&self, m: &Match) {
        for emitter in &self.producers.match_created_producer {
            debug!("🔍️ Notifying match created hook subscribers of match #{}", m.id);
            emitter.publish_event(MatchCreatedEvent::new(m.clone())).await;
        }
    }
}
