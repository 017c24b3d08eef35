use actix_web::{http::StatusCode, web, web::ServiceConfig};
use market_engine::{
    db_types::{NotificationEvent, UserId},
    NotificationApi,
};
use mockall::predicate::{always, eq};
use serde_json::{json, Value};

use super::{
    helpers::{get_request, post_request},
    mocks::MockMarketBackend,
};
use crate::routes::{MarkNotificationReadRoute, NotificationsRoute};

fn configure(cfg: &mut ServiceConfig, backend: MockMarketBackend) {
    cfg.service(NotificationsRoute::<MockMarketBackend>::new())
        .service(MarkNotificationReadRoute::<MockMarketBackend>::new())
        .app_data(web::Data::new(NotificationApi::new(backend)));
}

fn notification(id: i64, user: &str, read: bool) -> NotificationEvent {
    serde_json::from_value(json!({
        "id": id,
        "user_id": user,
        "type": "new_match",
        "title": "New match",
        "body": "Your listing has a new match (score 53).",
        "payload": { "match_id": 9 },
        "created_at": "2024-06-01T12:05:00Z",
        "read": read
    }))
    .unwrap()
}

#[actix_web::test]
async fn notifications_with_unread_count() {
    let (status, body) = get_request("/notifications/alice", |cfg| {
        let mut backend = MockMarketBackend::new();
        backend
            .expect_fetch_notifications()
            .with(eq(UserId::from("alice")), always())
            .returning(|_, _| Ok(vec![notification(2, "alice", false), notification(1, "alice", true)]));
        backend.expect_count_unread_notifications().returning(|_| Ok(1));
        configure(cfg, backend)
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["unread"], 1);
    assert_eq!(body["notifications"][0]["id"], 2);
    assert_eq!(body["notifications"][0]["type"], "new_match");
    assert_eq!(body["notifications"][0]["payload"]["match_id"], 9);
}

#[actix_web::test]
async fn mark_read() {
    let (status, body) = post_request("/notifications/alice/2/read", None, |cfg| {
        let mut backend = MockMarketBackend::new();
        backend.expect_mark_notification_read().with(eq(2), eq(UserId::from("alice"))).returning(|_, _| Ok(true));
        configure(cfg, backend)
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["success"], true);
}

#[actix_web::test]
async fn mark_read_for_someone_elses_notification() {
    let (status, body) = post_request("/notifications/mallory/2/read", None, |cfg| {
        let mut backend = MockMarketBackend::new();
        backend.expect_mark_notification_read().returning(|_, _| Ok(false));
        configure(cfg, backend)
    })
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Notification 2 for mallory"), "{body}");
}
