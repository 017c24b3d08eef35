use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::matching::Matcher;

pub const DEFAULT_CANDIDATE_POOL_SIZE: usize = 200;
pub const DEFAULT_OWN_LISTING_PAGE: usize = 50;
/// The most listings loaded for an in-memory preview.
pub const PREVIEW_LISTING_LIMIT: usize = 1000;

/// Tuning for the match scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Minimum score for a pair to count as a match.
    pub threshold: u32,
    /// How many of the most recent opposite-kind listings each scan considers.
    pub candidate_pool_size: usize,
    /// How many of a user's own listings a user scan covers.
    pub own_listing_page: usize,
    /// The most matches kept for any single listing.
    pub max_per_listing: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        let matcher = Matcher::default();
        Self {
            threshold: matcher.threshold,
            candidate_pool_size: DEFAULT_CANDIDATE_POOL_SIZE,
            own_listing_page: DEFAULT_OWN_LISTING_PAGE,
            max_per_listing: matcher.max_per_listing,
        }
    }
}

impl ScanConfig {
    pub fn matcher(&self) -> Matcher {
        Matcher::new(self.threshold, self.max_per_listing)
    }
}

/// What a persisted scan did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub listings_scanned: usize,
    /// Candidates that passed the compatibility filter and were scored.
    pub candidates_scored: usize,
    pub matches_created: usize,
    pub already_existing: usize,
}

impl ScanReport {
    pub fn merge(&mut self, other: ScanReport) {
        self.listings_scanned += other.listings_scanned;
        self.candidates_scored += other.candidates_scored;
        self.matches_created += other.matches_created;
        self.already_existing += other.already_existing;
    }
}

impl Display for ScanReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} listings scanned, {} candidates scored, {} new matches, {} already matched",
            self.listings_scanned, self.candidates_scored, self.matches_created, self.already_existing
        )
    }
}
