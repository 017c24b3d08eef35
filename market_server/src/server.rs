use std::{future::Future, pin::Pin, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use market_engine::{
    events::{ConversationOpenedEvent, EventHandlers, EventHooks, EventProducers, MatchCreatedEvent},
    ConversationApi,
    MatchFlowApi,
    NotificationApi,
    SqliteDatabase,
};

use crate::{
    config::{ServerConfig, ServerOptions},
    errors::ServerError,
    routes::{
        health,
        ConversationMessagesRoute,
        ConversationsForUserRoute,
        ListingCreatedRoute,
        MarkNotificationReadRoute,
        MatchesForUserRoute,
        NotificationsRoute,
        OpenConversationRoute,
        PostMessageRoute,
        PreviewForUserRoute,
        ScanForUserRoute,
    },
};

const EVENT_BUFFER_SIZE: usize = 64;

type HookFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.db_max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?
        .with_poll_interval(config.feed_poll_interval);
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, logging_hooks());
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let options = ServerOptions::from_config(&config);
    let scan_config = config.scan;
    let srv = HttpServer::new(move || {
        let match_api = MatchFlowApi::new(db.clone(), producers.clone()).with_config(scan_config);
        let conversation_api = ConversationApi::new(db.clone(), producers.clone());
        let notification_api = NotificationApi::new(db.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("market::access_log"))
            .app_data(web::Data::new(match_api))
            .app_data(web::Data::new(conversation_api))
            .app_data(web::Data::new(notification_api))
            .app_data(web::Data::new(options))
            .service(health)
            .service(ListingCreatedRoute::<SqliteDatabase>::new())
            .service(ScanForUserRoute::<SqliteDatabase>::new())
            .service(MatchesForUserRoute::<SqliteDatabase>::new())
            .service(PreviewForUserRoute::<SqliteDatabase>::new())
            .service(OpenConversationRoute::<SqliteDatabase>::new())
            .service(ConversationsForUserRoute::<SqliteDatabase>::new())
            .service(PostMessageRoute::<SqliteDatabase>::new())
            .service(ConversationMessagesRoute::<SqliteDatabase>::new())
            .service(NotificationsRoute::<SqliteDatabase>::new())
            .service(MarkNotificationReadRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Hooks that record matches and conversations in the server log.
fn logging_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks
        .on_match_created(|ev: MatchCreatedEvent| {
            Box::pin(async move {
                let m = ev.new_match;
                info!(
                    "🪝️ Match #{} created: {} wants what {} is selling (score {})",
                    m.id, m.buyer_id, m.seller_id, m.score
                );
            }) as HookFuture
        })
        .on_conversation_opened(|ev: ConversationOpenedEvent| {
            Box::pin(async move {
                let c = ev.conversation;
                debug!("🪝️ Conversation #{} opened about listing #{}", c.id, c.post_id);
            }) as HookFuture
        });
    hooks
}
