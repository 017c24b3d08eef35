//! Free-text normalisation for listing titles and descriptions.
use std::collections::{BTreeSet, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::db_types::Listing;

/// Tokens shorter than this carry too little signal to compare.
pub const MIN_TOKEN_LENGTH: usize = 3;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z0-9]+").expect("static token regex is valid"));

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // grammar
        "the", "and", "for", "with", "you", "your", "are", "was", "were", "this", "that", "these", "those", "from",
        "have", "has", "had", "but", "not", "all", "any", "can", "our", "its", "into", "out", "too", "very", "just",
        "only", "also", "than", "then", "them", "they", "there", "will", "would", "should", "could", "about", "some",
        "such", "what", "when", "which", "who", "how", "her", "his", "she", "him", "one",
        // marketplace filler; the listing kind already says which side of the trade this is
        "want", "wanted", "looking", "need", "needed", "sale", "sell", "selling", "buy", "buying", "offer", "price",
        "obo", "please", "contact",
    ]
    .into_iter()
    .collect()
});

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token)
}

/// Splits `text` into lowercase alphanumeric tokens of at least [`MIN_TOKEN_LENGTH`] characters, dropping stopwords.
///
/// Tokens are returned in the order they appear, duplicates included. `None` or blank input gives an empty vector.
pub fn tokenize(text: Option<&str>) -> Vec<String> {
    let Some(text) = text else {
        return Vec::new();
    };
    let lower = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|t| t.len() >= MIN_TOKEN_LENGTH && !is_stopword(t))
        .map(String::from)
        .collect()
}

/// The comparable token sets of a listing.
///
/// `all` is the union of title and description tokens. `title` is tracked on its own because shared title words are
/// weighted more heavily than shared body text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenProfile {
    pub all: BTreeSet<String>,
    pub title: BTreeSet<String>,
}

impl TokenProfile {
    pub fn new(title: Option<&str>, description: Option<&str>) -> Self {
        let title: BTreeSet<String> = tokenize(title).into_iter().collect();
        let mut all = title.clone();
        all.extend(tokenize(description));
        Self { all, title }
    }

    pub fn of(listing: &Listing) -> Self {
        Self::new(Some(listing.title.as_str()), listing.description.as_deref())
    }

    pub fn shared_tokens(&self, other: &TokenProfile) -> usize {
        self.all.intersection(&other.all).count()
    }

    pub fn shared_title_tokens(&self, other: &TokenProfile) -> usize {
        self.title.intersection(&other.title).count()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lowercases_and_splits_on_punctuation() {
        assert_eq!(tokenize(Some("Red BICYCLE, 26-inch!")), vec!["red", "bicycle", "inch"]);
    }

    #[test]
    fn drops_short_tokens_and_stopwords() {
        assert_eq!(tokenize(Some("a TV for the kids")), vec!["kids"]);
        assert_eq!(tokenize(Some("red bike wanted")), vec!["red", "bike"]);
    }

    #[test]
    fn empty_input_never_fails() {
        assert!(tokenize(None).is_empty());
        assert!(tokenize(Some("")).is_empty());
        assert!(tokenize(Some("  ?? !! ")).is_empty());
    }

    #[test]
    fn profile_tracks_title_separately() {
        let p = TokenProfile::new(Some("Road bike"), Some("Carbon frame, barely ridden bike"));
        assert_eq!(p.title.len(), 2);
        assert!(p.all.contains("carbon"));
        assert!(p.all.contains("bike"));
        assert!(!p.title.contains("carbon"));
    }
}
