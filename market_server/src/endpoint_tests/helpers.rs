use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use chrono::{TimeZone, Utc};
use log::debug;
use market_common::Price;
use market_engine::db_types::{Listing, ListingKind, Match, UserId};
use serde_json::Value;

pub async fn get_request(path: &str, configure: impl FnOnce(&mut ServiceConfig)) -> (StatusCode, String) {
    call(TestRequest::get().uri(path), configure).await
}

pub async fn post_request(
    path: &str,
    body: Option<Value>,
    configure: impl FnOnce(&mut ServiceConfig),
) -> (StatusCode, String) {
    let req = match body {
        Some(body) => TestRequest::post().uri(path).set_json(body),
        None => TestRequest::post().uri(path),
    };
    call(req, configure).await
}

async fn call(req: TestRequest, configure: impl FnOnce(&mut ServiceConfig)) -> (StatusCode, String) {
    let _ = env_logger::try_init().ok();
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}

pub fn listing(id: i64, owner: &str, kind: ListingKind, title: &str, price: Option<i64>) -> Listing {
    Listing {
        id,
        owner_id: UserId::from(owner),
        kind,
        title: title.to_string(),
        description: None,
        price: price.map(Price::from_units),
        created_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
    }
}

pub fn match_between(id: i64, buy: &Listing, sell: &Listing, score: i64) -> Match {
    Match {
        id,
        buy_listing_id: buy.id,
        sell_listing_id: sell.id,
        buyer_id: buy.owner_id.clone(),
        seller_id: sell.owner_id.clone(),
        score,
        created_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 5, 0).unwrap(),
    }
}
