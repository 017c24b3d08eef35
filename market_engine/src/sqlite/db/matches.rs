use log::debug;
use sqlx::SqliteConnection;

use super::sql_limit;
use crate::{
    db_types::{Match, NewMatch, UserId},
    traits::StoreError,
};

/// The columns of the unique index that makes match creation idempotent.
pub const MATCH_PAIR_KEY: [&str; 2] = ["matches.buy_listing_id", "matches.sell_listing_id"];

pub async fn fetch_match_by_pair(
    buy_listing_id: i64,
    sell_listing_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Match>, StoreError> {
    let m = sqlx::query_as("SELECT * FROM matches WHERE buy_listing_id = $1 AND sell_listing_id = $2")
        .bind(buy_listing_id)
        .bind(sell_listing_id)
        .fetch_optional(conn)
        .await?;
    Ok(m)
}

/// Inserts the match. This is not atomic with anything else; embed the call in a transaction (passing `&mut *tx`)
/// when the match must land together with other rows.
///
/// Fails with `StoreError::Conflict` if the pair already has a match.
pub async fn insert_match(new_match: NewMatch, conn: &mut SqliteConnection) -> Result<Match, StoreError> {
    let m: Match = sqlx::query_as(
        r#"
            INSERT INTO matches (buy_listing_id, sell_listing_id, buyer_id, seller_id, score)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(new_match.buy_listing_id)
    .bind(new_match.sell_listing_id)
    .bind(new_match.buyer_id)
    .bind(new_match.seller_id)
    .bind(new_match.score)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Match #{} recorded: listing {} buys from listing {}", m.id, m.buy_listing_id, m.sell_listing_id);
    Ok(m)
}

pub async fn fetch_match(id: i64, conn: &mut SqliteConnection) -> Result<Option<Match>, StoreError> {
    let m = sqlx::query_as("SELECT * FROM matches WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(m)
}

pub async fn fetch_matches_for_user(
    user: &UserId,
    limit: usize,
    conn: &mut SqliteConnection,
) -> Result<Vec<Match>, StoreError> {
    let matches =
        sqlx::query_as("SELECT * FROM matches WHERE buyer_id = $1 OR seller_id = $1 ORDER BY id DESC LIMIT $2")
            .bind(user.as_str())
            .bind(sql_limit(limit))
            .fetch_all(conn)
            .await?;
    Ok(matches)
}
