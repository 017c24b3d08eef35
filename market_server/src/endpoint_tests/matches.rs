use actix_web::{http::StatusCode, web, web::ServiceConfig};
use market_engine::{
    db_types::{InsertMatchResult, ListingKind::*, UserId},
    events::EventProducers,
    MatchFlowApi,
};
use mockall::predicate::{always, eq};
use serde_json::Value;

use super::{
    helpers::{get_request, listing, match_between, post_request},
    mocks::MockMarketBackend,
};
use crate::routes::{MatchesForUserRoute, PreviewForUserRoute, ScanForUserRoute};

fn configure(cfg: &mut ServiceConfig, backend: MockMarketBackend) {
    let api = MatchFlowApi::new(backend, EventProducers::default());
    cfg.service(ScanForUserRoute::<MockMarketBackend>::new())
        .service(MatchesForUserRoute::<MockMarketBackend>::new())
        .service(PreviewForUserRoute::<MockMarketBackend>::new())
        .app_data(web::Data::new(api));
}

#[actix_web::test]
async fn rescanning_reports_existing_matches() {
    let (status, body) = post_request("/scan/alice", None, |cfg| {
        let mut backend = MockMarketBackend::new();
        backend
            .expect_fetch_listings_for_owner()
            .with(eq(UserId::from("alice")), always())
            .returning(|_, _| Ok(vec![listing(1, "alice", Selling, "red bicycle", Some(100))]));
        backend
            .expect_fetch_candidate_pool()
            .with(eq(Requesting), always())
            .times(1)
            .returning(|_, _| Ok(vec![listing(2, "bob", Requesting, "red bike wanted", Some(110))]));
        backend.expect_create_match_if_absent().returning(|buy, sell, score| {
            Ok(InsertMatchResult::AlreadyExists(match_between(9, buy, sell, score.into())))
        });
        configure(cfg, backend)
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    let report: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(report["listings_scanned"], 1);
    assert_eq!(report["matches_created"], 0);
    assert_eq!(report["already_existing"], 1);
}

#[actix_web::test]
async fn scanning_for_a_blank_user_is_rejected() {
    let (status, _) = post_request("/scan/%20", None, |cfg| configure(cfg, MockMarketBackend::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn match_listing_is_capped() {
    let (status, body) = get_request("/matches/alice?limit=500", |cfg| {
        let mut backend = MockMarketBackend::new();
        backend.expect_fetch_matches_for_user().with(eq(UserId::from("alice")), eq(100)).times(1).returning(|_, _| {
            let buy = listing(2, "bob", Requesting, "red bike wanted", Some(110));
            let sell = listing(1, "alice", Selling, "red bicycle", Some(100));
            Ok(vec![match_between(9, &buy, &sell, 53)])
        });
        configure(cfg, backend)
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    let matches: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(matches[0]["id"], 9);
    assert_eq!(matches[0]["buyer_id"], "bob");
    assert_eq!(matches[0]["seller_id"], "alice");
}

#[actix_web::test]
async fn preview_ranks_without_recording() {
    let (status, body) = get_request("/preview/alice", |cfg| {
        let mut backend = MockMarketBackend::new();
        backend.expect_fetch_all_listings().returning(|_| {
            Ok(vec![
                listing(3, "carol", Requesting, "garden hose", None),
                listing(2, "bob", Requesting, "red bike wanted", Some(110)),
                listing(1, "alice", Selling, "red bicycle", Some(100)),
            ])
        });
        backend.expect_create_match_if_absent().never();
        configure(cfg, backend)
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    let preview: Value = serde_json::from_str(&body).unwrap();
    let preview = preview.as_array().unwrap();
    assert_eq!(preview.len(), 1);
    assert_eq!(preview[0]["listing"]["id"], 1);
    let matches = preview[0]["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["candidate"]["id"], 2);
    assert_eq!(matches[0]["score"], 53);
}
