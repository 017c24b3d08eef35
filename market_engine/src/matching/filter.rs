use log::trace;

use crate::db_types::Listing;

/// Pairs whose prices differ by more than this factor are in different price tiers and never match.
pub const MAX_PRICE_RATIO: f64 = 5.0;

/// The hard gate in front of the scorer. A pair that fails here is never scored, however similar the text.
///
/// Rejects the pair when
/// 1. both listings belong to the same owner,
/// 2. the kinds are not exactly one `selling` and one `requesting`,
/// 3. both carry a price and `max / max(1, min)` exceeds [`MAX_PRICE_RATIO`].
pub fn is_compatible(a: &Listing, b: &Listing) -> bool {
    if a.owner_id == b.owner_id {
        return false;
    }
    if a.kind == b.kind {
        return false;
    }
    if let Some(ratio) = price_ratio(a, b) {
        if ratio > MAX_PRICE_RATIO {
            trace!("🔎️ Listings {} and {} are {ratio:.1}x apart in price", a.id, b.id);
            return false;
        }
    }
    true
}

/// The ratio of the larger to the smaller price, with the denominator floored at one currency unit so free listings
/// don't divide by zero. `None` unless both listings have a price.
pub fn price_ratio(a: &Listing, b: &Listing) -> Option<f64> {
    let (pa, pb) = (a.price?.as_units().max(0.0), b.price?.as_units().max(0.0));
    Some(pa.max(pb) / pa.min(pb).max(1.0))
}

#[cfg(test)]
mod test {
    use chrono::Utc;
    use market_common::Price;

    use super::*;
    use crate::db_types::ListingKind::{self, Requesting, Selling};

    fn listing(id: i64, owner: &str, kind: ListingKind, price: Option<i64>) -> Listing {
        Listing {
            id,
            owner_id: owner.into(),
            kind,
            title: "anything".into(),
            description: None,
            price: price.map(Price::from_units),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn same_kind_never_compatible() {
        for kind in [Selling, Requesting] {
            let a = listing(1, "alice", kind, Some(10));
            let b = listing(2, "bob", kind, Some(10));
            assert!(!is_compatible(&a, &b));
            assert!(!is_compatible(&b, &a));
        }
    }

    #[test]
    fn same_owner_never_compatible() {
        let a = listing(1, "alice", Selling, Some(10));
        let b = listing(2, "alice", Requesting, Some(10));
        assert!(!is_compatible(&a, &b));
        let b = listing(2, "alice", Requesting, None);
        assert!(!is_compatible(&a, &b));
    }

    #[test]
    fn complementary_kinds_are_compatible() {
        let a = listing(1, "alice", Selling, Some(100));
        let b = listing(2, "bob", Requesting, Some(110));
        assert!(is_compatible(&a, &b));
        assert!(is_compatible(&b, &a));
    }

    #[test]
    fn price_tier_mismatch() {
        let a = listing(1, "alice", Selling, Some(100));
        let d = listing(4, "dave", Requesting, Some(1000));
        assert_eq!(price_ratio(&a, &d), Some(10.0));
        assert!(!is_compatible(&a, &d));
        // exactly five times apart is still allowed
        let e = listing(5, "erin", Requesting, Some(500));
        assert!(is_compatible(&a, &e));
    }

    #[test]
    fn free_listings_use_a_floor_of_one() {
        let free = listing(1, "alice", Selling, Some(0));
        let cheap = listing(2, "bob", Requesting, Some(4));
        let dear = listing(3, "carol", Requesting, Some(6));
        assert_eq!(price_ratio(&free, &cheap), Some(4.0));
        assert!(is_compatible(&free, &cheap));
        assert!(!is_compatible(&free, &dear));
    }

    #[test]
    fn missing_price_skips_the_ratio_gate() {
        let a = listing(1, "alice", Selling, None);
        let b = listing(2, "bob", Requesting, Some(1_000_000));
        assert_eq!(price_ratio(&a, &b), None);
        assert!(is_compatible(&a, &b));
    }
}
