use actix_web::{http::StatusCode, web, web::ServiceConfig};
use market_common::Price;
use market_engine::{
    db_types::{InsertMatchResult, ListingKind::*},
    events::EventProducers,
    traits::StoreError,
    MatchFlowApi,
};
use mockall::predicate::{always, eq};
use serde_json::{json, Value};

use super::{
    helpers::{listing, match_between, post_request},
    mocks::MockMarketBackend,
};
use crate::{config::ServerOptions, routes::ListingCreatedRoute};

fn red_bike_request() -> Value {
    json!({
        "owner_id": "bob",
        "kind": "wanted",
        "title": "red bike wanted",
        "price": "$110"
    })
}

fn configure(cfg: &mut ServiceConfig, backend: MockMarketBackend, auto_scan: bool) {
    let api = MatchFlowApi::new(backend, EventProducers::default());
    cfg.service(ListingCreatedRoute::<MockMarketBackend>::new())
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(ServerOptions { auto_scan }));
}

fn backend_with_stored_request() -> MockMarketBackend {
    let mut backend = MockMarketBackend::new();
    backend.expect_insert_listing().times(1).returning(|l| {
        assert_eq!(l.kind, Requesting);
        assert_eq!(l.price, Some(Price::from_units(110)));
        Ok(listing(2, l.owner_id.as_str(), l.kind, &l.title, Some(110)))
    });
    backend
}

#[actix_web::test]
async fn new_listing_is_stored_and_scanned() {
    let (status, body) = post_request("/webhook/listing_created", Some(red_bike_request()), |cfg| {
        let mut backend = backend_with_stored_request();
        backend
            .expect_fetch_listing()
            .with(eq(2))
            .returning(|_| Ok(Some(listing(2, "bob", Requesting, "red bike wanted", Some(110)))));
        backend
            .expect_fetch_candidate_pool()
            .with(eq(Selling), always())
            .returning(|_, _| Ok(vec![listing(1, "alice", Selling, "red bicycle", Some(100))]));
        backend.expect_create_match_if_absent().times(1).returning(|buy, sell, score| {
            assert_eq!((buy.id, sell.id, score), (2, 1, 53));
            Ok(InsertMatchResult::Inserted(match_between(9, buy, sell, i64::from(score))))
        });
        configure(cfg, backend, true)
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["listing"]["id"], 2);
    assert_eq!(body["listing"]["kind"], "requesting");
    assert_eq!(body["scan"]["matches_created"], 1);
    assert_eq!(body["scan"]["candidates_scored"], 1);
}

#[actix_web::test]
async fn listing_is_kept_when_the_scan_fails() {
    let (status, body) = post_request("/webhook/listing_created", Some(red_bike_request()), |cfg| {
        let mut backend = backend_with_stored_request();
        backend.expect_fetch_listing().returning(|_| Err(StoreError::Transient("database is locked".into())));
        configure(cfg, backend, true)
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["listing"]["id"], 2);
    assert!(body["scan"].is_null());
}

#[actix_web::test]
async fn auto_scan_can_be_switched_off() {
    let (status, body) = post_request("/webhook/listing_created", Some(red_bike_request()), |cfg| {
        configure(cfg, backend_with_stored_request(), false)
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert!(body["scan"].is_null());
}

#[actix_web::test]
async fn unknown_listing_kind_is_rejected() {
    let req = json!({ "owner_id": "bob", "kind": "swap", "title": "red bike" });
    let (status, body) =
        post_request("/webhook/listing_created", Some(req), |cfg| configure(cfg, MockMarketBackend::new(), true)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Invalid listing kind: swap"), "{body}");
}

#[actix_web::test]
async fn store_rejection_is_a_bad_request() {
    let req = json!({ "owner_id": " ", "kind": "sell", "title": "red bike" });
    let (status, body) = post_request("/webhook/listing_created", Some(req), |cfg| {
        let mut backend = MockMarketBackend::new();
        backend
            .expect_insert_listing()
            .returning(|_| Err(StoreError::InvalidArgument("owner must not be blank".into())));
        configure(cfg, backend, true)
    })
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["error"], "Could not read request body: owner must not be blank");
}
