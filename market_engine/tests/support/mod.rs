#![allow(dead_code)]
use std::time::Duration;

use market_common::Price;
use market_engine::{
    db_types::{Listing, ListingKind, NewListing},
    test_utils::{drop_database, prepare_test_env, random_db_path},
    traits::{ListingManagement, MarketplaceDatabase},
    SqliteDatabase,
};

pub const TEST_POLL_INTERVAL: Duration = Duration::from_millis(20);

pub async fn setup() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5)
        .await
        .expect("Error creating database")
        .with_poll_interval(TEST_POLL_INTERVAL)
}

pub async fn tear_down(db: SqliteDatabase) {
    let url = db.url().to_string();
    db.close().await;
    drop_database(&url).await;
}

pub async fn post(db: &SqliteDatabase, owner: &str, kind: ListingKind, title: &str, price: Option<i64>) -> Listing {
    let mut listing = NewListing::new(owner, kind, title);
    if let Some(p) = price {
        listing = listing.with_price(Price::from_units(p));
    }
    db.insert_listing(listing).await.expect("Error inserting listing")
}
