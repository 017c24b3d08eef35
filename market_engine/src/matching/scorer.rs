//! Deterministic compatibility scoring.
//!
//! The score is the sum of three independent parts:
//! * body overlap: [`SHARED_TOKEN_POINTS`] per token the two listings share anywhere in their text, capped at
//!   [`SHARED_TOKEN_CAP`] so long descriptions can't dominate,
//! * title overlap: [`SHARED_TITLE_TOKEN_POINTS`] per token shared between the two titles, uncapped,
//! * price closeness: up to [`PRICE_CLOSENESS_POINTS`] when both listings have a price.
//!
//! Scoring is symmetric and a pure function of the two listings. It does not apply the compatibility filter; callers
//! gate with [`super::is_compatible`] first.
use market_common::Price;

use super::tokenizer::TokenProfile;
use crate::db_types::Listing;

pub const SHARED_TOKEN_POINTS: u32 = 10;
pub const SHARED_TOKEN_CAP: u32 = 60;
pub const SHARED_TITLE_TOKEN_POINTS: u32 = 25;
pub const PRICE_CLOSENESS_POINTS: f64 = 20.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub token_overlap: u32,
    pub title_overlap: u32,
    pub price_closeness: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.token_overlap + self.title_overlap + self.price_closeness
    }
}

pub fn score(a: &Listing, b: &Listing) -> u32 {
    score_profiles(&TokenProfile::of(a), a.price, &TokenProfile::of(b), b.price).total()
}

/// Scores two listings whose token profiles have already been computed. Scanners use this to avoid re-tokenizing the
/// candidate pool for every owned listing.
pub fn score_profiles(
    pa: &TokenProfile,
    price_a: Option<Price>,
    pb: &TokenProfile,
    price_b: Option<Price>,
) -> ScoreBreakdown {
    let shared = u32::try_from(pa.shared_tokens(pb)).unwrap_or(u32::MAX);
    let shared_title = u32::try_from(pa.shared_title_tokens(pb)).unwrap_or(u32::MAX);
    ScoreBreakdown {
        token_overlap: shared.saturating_mul(SHARED_TOKEN_POINTS).min(SHARED_TOKEN_CAP),
        title_overlap: shared_title.saturating_mul(SHARED_TITLE_TOKEN_POINTS),
        price_closeness: price_points(price_a, price_b),
    }
}

/// `round(closeness * 20)` where `closeness = 1 - |a - b| / max(1, max(a, b))`, or zero if either price is missing or
/// the closeness isn't positive.
pub fn price_points(a: Option<Price>, b: Option<Price>) -> u32 {
    let (Some(a), Some(b)) = (a, b) else {
        return 0;
    };
    let (a, b) = (a.as_units(), b.as_units());
    let closeness = 1.0 - (a - b).abs() / a.max(b).max(1.0);
    if closeness > 0.0 {
        // closeness is in (0, 1], so the product fits comfortably
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let points = (closeness * PRICE_CLOSENESS_POINTS).round() as u32;
        points
    } else {
        0
    }
}
