use log::debug;
use sqlx::SqliteConnection;

use super::sql_limit;
use crate::{
    db_types::{Listing, ListingKind, NewListing, UserId},
    traits::StoreError,
};

pub async fn insert_listing(listing: NewListing, conn: &mut SqliteConnection) -> Result<Listing, StoreError> {
    let listing: Listing = sqlx::query_as(
        r#"
            INSERT INTO listings (owner_id, kind, title, description, price, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(listing.owner_id)
    .bind(listing.kind)
    .bind(listing.title)
    .bind(listing.description)
    .bind(listing.price)
    .bind(listing.created_at)
    .fetch_one(conn)
    .await?;
    debug!("📝️ {} listing #{} stored for {}", listing.kind, listing.id, listing.owner_id);
    Ok(listing)
}

pub async fn fetch_listing(id: i64, conn: &mut SqliteConnection) -> Result<Option<Listing>, StoreError> {
    let listing = sqlx::query_as("SELECT * FROM listings WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(listing)
}

pub async fn fetch_listings_for_owner(
    owner: &UserId,
    limit: usize,
    conn: &mut SqliteConnection,
) -> Result<Vec<Listing>, StoreError> {
    let listings = sqlx::query_as(
        "SELECT * FROM listings WHERE owner_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2",
    )
    .bind(owner.as_str())
    .bind(sql_limit(limit))
    .fetch_all(conn)
    .await?;
    Ok(listings)
}

/// The most recent `limit` listings of the given kind.
pub async fn fetch_listings_by_kind(
    kind: ListingKind,
    limit: usize,
    conn: &mut SqliteConnection,
) -> Result<Vec<Listing>, StoreError> {
    let listings =
        sqlx::query_as("SELECT * FROM listings WHERE kind = $1 ORDER BY created_at DESC, id DESC LIMIT $2")
            .bind(kind)
            .bind(sql_limit(limit))
            .fetch_all(conn)
            .await?;
    Ok(listings)
}

pub async fn fetch_all_listings(limit: usize, conn: &mut SqliteConnection) -> Result<Vec<Listing>, StoreError> {
    let listings = sqlx::query_as("SELECT * FROM listings ORDER BY created_at DESC, id DESC LIMIT $1")
        .bind(sql_limit(limit))
        .fetch_all(conn)
        .await?;
    Ok(listings)
}
