use cucumber::{given, then, when};
use market_common::Price;
use market_engine::{
    db_types::{ListingKind, NewListing, UserId},
    traits::{MatchManagement, NotificationManagement},
};

use crate::cucumber::MarketWorld;

async fn post_listing(
    world: &mut MarketWorld,
    owner: String,
    kind: String,
    label: String,
    title: String,
    price: Option<i64>,
) {
    let kind = kind.parse::<ListingKind>().expect("Not a listing kind");
    let mut listing = NewListing::new(owner, kind, title);
    if let Some(p) = price {
        listing = listing.with_price(Price::from_units(p));
    }
    let listing = world.api().ingest_listing(listing).await.expect("Error posting listing");
    world.system().listings.insert(label, listing);
}

#[given(expr = "{word} posts a {word} listing {word} {string} for {int}")]
async fn post_priced(world: &mut MarketWorld, owner: String, kind: String, label: String, title: String, price: i64) {
    post_listing(world, owner, kind, label, title, Some(price)).await;
}

#[given(expr = "{word} posts a {word} listing {word} {string} without a price")]
async fn post_unpriced(world: &mut MarketWorld, owner: String, kind: String, label: String, title: String) {
    post_listing(world, owner, kind, label, title, None).await;
}

#[when(expr = "{word} scans for matches")]
async fn scan_user(world: &mut MarketWorld, user: String) {
    let report = world.api().scan_for_user(&UserId::from(user)).await.expect("Error scanning");
    world.system().last_report = Some(report);
}

#[when(expr = "listing {word} is scanned")]
async fn scan_listing(world: &mut MarketWorld, label: String) {
    let id = world.listing(&label).id;
    let report = world.api().scan_for_listing(id).await.expect("Error scanning");
    world.system().last_report = Some(report);
}

#[when(expr = "{word} previews matches")]
async fn preview(world: &mut MarketWorld, user: String) {
    let preview = world.api().preview_for_viewer(&UserId::from(user)).await.expect("Error previewing");
    world.system().preview = preview;
}

#[then(regex = r"^there (?:is|are) (\d+) match(?:es)? for (\w+)$")]
async fn match_count(world: &mut MarketWorld, count: usize, user: String) {
    let matches = world.api().db().fetch_matches_for_user(&UserId::from(user), 100).await.expect("Error fetching");
    assert_eq!(matches.len(), count);
}

#[then(expr = "the match pairs buy listing {word} with sell listing {word} at a score of {int}")]
async fn match_pair(world: &mut MarketWorld, buy: String, sell: String, score: i64) {
    let (buy, sell) = (world.listing(&buy), world.listing(&sell));
    let matches = world.api().db().fetch_matches_for_user(&buy.owner_id, 100).await.expect("Error fetching");
    let m = matches
        .iter()
        .find(|m| m.buy_listing_id == buy.id && m.sell_listing_id == sell.id)
        .expect("No match for the pair");
    assert_eq!(m.buyer_id, buy.owner_id);
    assert_eq!(m.seller_id, sell.owner_id);
    assert_eq!(m.score, score);
}

#[then(regex = r"^(\w+) has (\d+) notifications?$")]
async fn notification_count(world: &mut MarketWorld, user: String, count: usize) {
    let notes = world.api().db().fetch_notifications(&UserId::from(user), 100).await.expect("Error fetching");
    assert_eq!(notes.len(), count);
}

#[then(expr = "the last scan created {int} and found {int} existing")]
async fn last_report(world: &mut MarketWorld, created: usize, existing: usize) {
    let report = world.system().last_report.expect("No scan has run");
    assert_eq!(report.matches_created, created);
    assert_eq!(report.already_existing, existing);
}

#[then(expr = "the preview for listing {word} ranks {word} first")]
async fn preview_top(world: &mut MarketWorld, label: String, top: String) {
    let (listing, top) = (world.listing(&label), world.listing(&top));
    let entry = world
        .system()
        .preview
        .iter()
        .find(|e| e.listing.id == listing.id)
        .cloned()
        .expect("Listing is not in the preview");
    assert_eq!(entry.matches.first().map(|c| c.candidate.id), Some(top.id));
}
