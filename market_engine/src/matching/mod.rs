//! # Matching
//!
//! The pure half of the pipeline: turning listings into token profiles, gating pairs with the compatibility filter,
//! scoring the survivors, and ranking them. Nothing in this module touches storage or fails.
mod filter;
mod preview;
mod scorer;
pub mod tokenizer;

pub use filter::{is_compatible, price_ratio, MAX_PRICE_RATIO};
pub use preview::{rank_candidates, scan_all_for_viewer, ListingMatches, MatchCandidate, Matcher};
pub use scorer::{
    price_points,
    score,
    score_profiles,
    ScoreBreakdown,
    PRICE_CLOSENESS_POINTS,
    SHARED_TITLE_TOKEN_POINTS,
    SHARED_TOKEN_CAP,
    SHARED_TOKEN_POINTS,
};
pub use tokenizer::{tokenize, TokenProfile};
