//! # Bootstrap supervisor
//!
//! The notification feed should only start once three things hold at the same moment: a user is signed in, the store
//! client is usable and the feed's own store handle is usable. [`BootstrapSupervisor`] polls for that, starts the feed
//! once, and gives up after a ceiling.
use std::{fmt::Display, time::Duration};

use log::*;
use tokio::time::{Instant, MissedTickBehavior};

use crate::{
    db_types::UserId,
    fanout::NotificationFeed,
    traits::{AlertSurface, ChangeFeed, MatchManagement, NotificationManagement, Readiness, SessionProvider, StoreError},
};

pub const DEFAULT_BOOTSTRAP_POLL_INTERVAL: Duration = Duration::from_millis(250);
pub const DEFAULT_BOOTSTRAP_CEILING: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapConfig {
    pub poll_interval: Duration,
    pub ceiling: Duration,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self { poll_interval: DEFAULT_BOOTSTRAP_POLL_INTERVAL, ceiling: DEFAULT_BOOTSTRAP_CEILING }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    Session,
    Store,
    NotificationFeed,
}

impl Display for Precondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Precondition::Session => write!(f, "signed-in session"),
            Precondition::Store => write!(f, "store client"),
            Precondition::NotificationFeed => write!(f, "notification feed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Started(UserId),
    TimedOut { missing: Vec<Precondition> },
    AlreadyStarted,
}

#[derive(Debug, Default)]
pub struct BootstrapSupervisor {
    config: BootstrapConfig,
    started: bool,
}

impl BootstrapSupervisor {
    pub fn new(config: BootstrapConfig) -> Self {
        Self { config, started: false }
    }

    pub fn has_started(&self) -> bool {
        self.started
    }

    /// Polls until every precondition holds, then subscribes `feed` for the signed-in user. The feed is started at
    /// most once per supervisor.
    ///
    /// If the ceiling passes first, the outcome lists the preconditions that were still missing on the last poll and
    /// the feed is left untouched.
    pub async fn start<S, R, B, A>(
        &mut self,
        session: &S,
        store: &R,
        feed: &mut NotificationFeed<B, A>,
    ) -> Result<BootstrapOutcome, StoreError>
    where
        S: SessionProvider,
        R: Readiness,
        B: NotificationManagement + MatchManagement + ChangeFeed + Readiness,
        A: AlertSurface,
    {
        if self.started {
            return Ok(BootstrapOutcome::AlreadyStarted);
        }
        let deadline = Instant::now() + self.config.ceiling;
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let user = session.current_user();
            let mut missing = Vec::new();
            if user.is_none() {
                missing.push(Precondition::Session);
            }
            if !store.is_ready() {
                missing.push(Precondition::Store);
            }
            if !feed.is_loaded() {
                missing.push(Precondition::NotificationFeed);
            }
            match user {
                Some(user) if missing.is_empty() => {
                    debug!("🚀️ Starting the notification feed for {user}");
                    feed.subscribe(user.clone()).await?;
                    self.started = true;
                    return Ok(BootstrapOutcome::Started(user));
                },
                _ if Instant::now() >= deadline => {
                    let names = missing.iter().map(Precondition::to_string).collect::<Vec<_>>().join(", ");
                    warn!("🚀️ Gave up waiting to start the notification feed. Still missing: {names}");
                    return Ok(BootstrapOutcome::TimedOut { missing });
                },
                _ => trace!("🚀️ Waiting on {} precondition(s)", missing.len()),
            }
        }
    }
}
