use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::Utc;
use market_engine::{
    db_types::{Conversation, ConversationKey, ListingKind::*, Message, UserId},
    events::EventProducers,
    traits::StoreError,
    ConversationApi,
};
use mockall::predicate::eq;
use serde_json::{json, Value};

use super::{
    helpers::{get_request, listing, match_between, post_request},
    mocks::MockMarketBackend,
};
use crate::routes::{ConversationMessagesRoute, ConversationsForUserRoute, OpenConversationRoute, PostMessageRoute};

fn configure(cfg: &mut ServiceConfig, backend: MockMarketBackend) {
    let api = ConversationApi::new(backend, EventProducers::default());
    cfg.service(OpenConversationRoute::<MockMarketBackend>::new())
        .service(ConversationsForUserRoute::<MockMarketBackend>::new())
        .service(PostMessageRoute::<MockMarketBackend>::new())
        .service(ConversationMessagesRoute::<MockMarketBackend>::new())
        .app_data(web::Data::new(api));
}

fn conversation_for(key: &ConversationKey) -> Conversation {
    Conversation {
        id: 4,
        post_id: key.post_id,
        buyer_id: key.buyer_id.clone(),
        seller_id: key.seller_id.clone(),
        created_at: Utc::now(),
    }
}

#[actix_web::test]
async fn open_conversation_for_a_match_uses_the_selling_listing() {
    let (status, body) = post_request("/conversations", Some(json!({ "match_id": 9 })), |cfg| {
        let mut backend = MockMarketBackend::new();
        backend.expect_fetch_match().with(eq(9)).returning(|_| {
            let buy = listing(2, "bob", Requesting, "red bike wanted", Some(110));
            let sell = listing(1, "alice", Selling, "red bicycle", Some(100));
            Ok(Some(match_between(9, &buy, &sell, 53)))
        });
        backend
            .expect_get_or_create_conversation()
            .with(eq(ConversationKey::new(1, "bob", "alice")))
            .times(1)
            .returning(|key| Ok(conversation_for(key)));
        configure(cfg, backend)
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    let conversation: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(conversation["id"], 4);
    assert_eq!(conversation["post_id"], 1);
}

#[actix_web::test]
async fn open_conversation_for_a_missing_match() {
    let (status, _) = post_request("/conversations", Some(json!({ "match_id": 77 })), |cfg| {
        let mut backend = MockMarketBackend::new();
        backend.expect_fetch_match().returning(|_| Ok(None));
        configure(cfg, backend)
    })
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn open_conversation_by_key() {
    let req = json!({ "post_id": 3, "buyer_id": "bob", "seller_id": "alice" });
    let (status, body) = post_request("/conversations", Some(req), |cfg| {
        let mut backend = MockMarketBackend::new();
        backend
            .expect_get_or_create_conversation()
            .with(eq(ConversationKey::new(3, "bob", "alice")))
            .returning(|key| Ok(conversation_for(key)));
        configure(cfg, backend)
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    let conversation: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(conversation["buyer_id"], "bob");
}

#[actix_web::test]
async fn busy_store_is_reported_as_unavailable() {
    let req = json!({ "post_id": 3, "buyer_id": "bob", "seller_id": "alice" });
    let (status, body) = post_request("/conversations", Some(req), |cfg| {
        let mut backend = MockMarketBackend::new();
        backend
            .expect_get_or_create_conversation()
            .returning(|_| Err(StoreError::Transient("database is locked".into())));
        configure(cfg, backend)
    })
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains("database is locked"), "{body}");
}

#[actix_web::test]
async fn post_and_read_messages() {
    let req = json!({ "sender_id": "bob", "body": "Is it still available?" });
    let (status, body) = post_request("/conversations/4/messages", Some(req), |cfg| {
        let mut backend = MockMarketBackend::new();
        backend.expect_post_message().with(eq(4), eq(UserId::from("bob")), eq("Is it still available?")).returning(
            |conversation_id, sender, body| {
                Ok(Message {
                    id: 1,
                    conversation_id,
                    sender_id: sender.clone(),
                    body: body.to_string(),
                    created_at: Utc::now(),
                })
            },
        );
        configure(cfg, backend)
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    let message: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(message["sender_id"], "bob");

    let (status, body) = get_request("/conversations/4/messages", |cfg| {
        let mut backend = MockMarketBackend::new();
        backend.expect_fetch_messages().with(eq(4)).returning(|_| Ok(vec![]));
        configure(cfg, backend)
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
}

#[actix_web::test]
async fn conversations_for_user() {
    let (status, body) = get_request("/conversations/alice", |cfg| {
        let mut backend = MockMarketBackend::new();
        backend
            .expect_fetch_conversations_for_user()
            .with(eq(UserId::from("alice")))
            .returning(|_| Ok(vec![conversation_for(&ConversationKey::new(1, "bob", "alice"))]));
        configure(cfg, backend)
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    let conversations: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(conversations.as_array().map(Vec::len), Some(1));
}
