// Session bus: logout propagation between client contexts
//
// Every context created from the same bus sees the others' logouts, the way
// browser tabs see each other's storage events.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

const SESSION_BUS_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    /// A context logged out explicitly.
    LoggedOut,
    /// The backend rejected a request with 401.
    SessionExpired,
}

#[derive(Clone)]
pub struct SessionBus {
    tx: broadcast::Sender<SessionEvent>,
}

impl Default for SessionBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionBus {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(SESSION_BUS_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Publish to every subscriber. Having none is not an error.
    pub fn publish(&self, event: SessionEvent) {
        let delivered = self.tx.send(event).unwrap_or(0);
        tracing::debug!("Session event {:?} delivered to {} contexts", event, delivered);
    }
}
