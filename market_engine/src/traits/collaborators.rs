//! The external collaborators the notification fan-out and bootstrap depend on. Each comes with a no-op or in-memory
//! implementation so the engine runs without a UI attached.
use std::sync::Arc;

use log::debug;
use thiserror::Error;
use tokio::sync::watch;

use crate::db_types::{Conversation, UserId};

//--------------------------------------        Session        ---------------------------------------------------------
pub trait SessionProvider {
    /// The signed-in user, if any.
    fn current_user(&self) -> Option<UserId>;
}

/// A session that can change over time. Clones share the same session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    state: Arc<watch::Sender<Option<UserId>>>,
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHandle {
    pub fn new() -> Self {
        let (state, _) = watch::channel(None);
        Self { state: Arc::new(state) }
    }

    pub fn sign_in<U: Into<UserId>>(&self, user: U) {
        let user = user.into();
        debug!("👤️ {user} signed in");
        self.state.send_replace(Some(user));
    }

    pub fn sign_out(&self) {
        if let Some(user) = self.state.send_replace(None) {
            debug!("👤️ {user} signed out");
        }
    }

    /// A receiver that is notified whenever the session changes.
    pub fn watch(&self) -> watch::Receiver<Option<UserId>> {
        self.state.subscribe()
    }
}

impl SessionProvider for SessionHandle {
    fn current_user(&self) -> Option<UserId> {
        self.state.borrow().clone()
    }
}

/// A fixed session, for terminal sessions and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSession(pub Option<UserId>);

impl StaticSession {
    pub fn signed_in<U: Into<UserId>>(user: U) -> Self {
        Self(Some(user.into()))
    }
}

impl SessionProvider for StaticSession {
    fn current_user(&self) -> Option<UserId> {
        self.0.clone()
    }
}

//--------------------------------------         Alerts        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlertError {
    #[error("Alerts are not permitted")]
    PermissionDenied,
    #[error("Alert surface unavailable: {0}")]
    Unavailable(String),
}

/// Somewhere to raise a user-visible, best-effort alert.
pub trait AlertSurface {
    fn raise_alert(&self, title: &str, body: &str) -> Result<(), AlertError>;
}

/// The alert surface of a feed that has nowhere to show alerts. Every alert is reported as not shown.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAlerts;

impl AlertSurface for NoAlerts {
    fn raise_alert(&self, _title: &str, _body: &str) -> Result<(), AlertError> {
        Err(AlertError::Unavailable("no alert surface is configured".into()))
    }
}

//--------------------------------------   Conversation UI     ---------------------------------------------------------
pub trait ConversationOpener {
    fn open_conversation(&self, conversation: &Conversation);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoConversationUi;

impl ConversationOpener for NoConversationUi {
    fn open_conversation(&self, _conversation: &Conversation) {}
}
