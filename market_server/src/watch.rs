//! The `watch` command: follows one user's notification feed in the terminal.
//!
//! This drives the same bootstrap and fan-out path a front end would: wait for a session and a usable store, load the
//! user's recent matches and notifications, then print every live update until interrupted.
use log::*;
use market_engine::{
    bootstrap::{BootstrapOutcome, BootstrapSupervisor},
    db_types::{Match, UserId},
    fanout::{FeedUpdate, NotificationFeed},
    traits::StaticSession,
    SqliteDatabase,
};

use crate::{alerts::TerminalAlerts, config::ServerConfig, errors::ServerError};

pub async fn watch_user(config: ServerConfig, user: UserId) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.db_max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?
        .with_poll_interval(config.feed_poll_interval);
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let session = StaticSession::signed_in(user);
    let mut feed = NotificationFeed::new(db.clone()).with_alerts(TerminalAlerts::default());
    let mut supervisor = BootstrapSupervisor::default();
    let me = match supervisor.start(&session, &db, &mut feed).await? {
        BootstrapOutcome::Started(user) => {
            info!("🚀️ Watching the notification feed for {user}");
            user
        },
        BootstrapOutcome::TimedOut { missing } => {
            let missing = missing.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
            return Err(ServerError::InitializeError(format!("Notification feed did not start. Missing: {missing}")));
        },
        BootstrapOutcome::AlreadyStarted => {
            return Err(ServerError::Unspecified("Notification feed was already started".into()));
        },
    };
    println!("{} unread of {} recent notifications.", feed.unread_count(), feed.notifications().len());
    feed.matches().iter().rev().for_each(|m| println!("{}", describe_match(m, &me)));

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            update = feed.next_update() => match update {
                Some(update) => println!("{}", describe_update(&update, &me)),
                None => {
                    warn!("🔔️ The notification feed closed");
                    break;
                },
            },
            _ = &mut shutdown => break,
        }
    }
    feed.unsubscribe();
    db.close().await;
    Ok(())
}

fn describe_update(update: &FeedUpdate, me: &UserId) -> String {
    match update {
        FeedUpdate::Match(m) => describe_match(m, me),
        FeedUpdate::Notification { event, .. } => {
            let status = if event.read { "read" } else { "new" };
            format!("📬️ [{status}] {}: {}", event.title, event.body)
        },
    }
}

fn describe_match(m: &Match, me: &UserId) -> String {
    format!(
        "🤝️ Match #{} with {} (score {}, listings {} / {})",
        m.id,
        m.counterparty(me),
        m.score,
        m.buy_listing_id,
        m.sell_listing_id
    )
}
