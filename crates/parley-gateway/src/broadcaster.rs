use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
#[error("session {0} is closed")]
pub struct SessionClosed(pub Uuid);

/// Handle to one live connection.
///
/// Frames are queued on an unbounded channel drained by the connection's
/// writer task, so sending never waits on a slow socket.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    tx: mpsc::UnboundedSender<String>,
}

impl Session {
    /// Create a session and the receiver its connection drains.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                id: Uuid::new_v4(),
                tx,
            },
            rx,
        )
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn send(&self, payload: &str) -> Result<(), SessionClosed> {
        self.tx
            .send(payload.to_string())
            .map_err(|_| SessionClosed(self.id))
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Registry of connected sessions with fan-out to all of them.
#[derive(Clone, Default)]
pub struct Broadcaster {
    inner: Arc<BroadcasterInner>,
}

#[derive(Default)]
struct BroadcasterInner {
    /// session_id -> session
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn connect(&self, session: Session) {
        let mut sessions = self.inner.sessions.write().await;
        let id = session.id();
        sessions.insert(id, session);
        info!(
            "Connection established. Added session {}, total count of sessions is now {}",
            id,
            sessions.len()
        );
    }

    /// Deregister a session. Returns false if it was already gone.
    pub async fn disconnect(&self, session_id: Uuid) -> bool {
        let mut sessions = self.inner.sessions.write().await;
        let removed = sessions.remove(&session_id).is_some();
        if removed {
            info!(
                "Connection closed. Removed session {}, {} remaining",
                session_id,
                sessions.len()
            );
        }
        removed
    }

    /// Deliver `payload` to every session registered at the time of the call.
    ///
    /// Works on a snapshot, so concurrent connects and disconnects never
    /// disturb the iteration. A failed delivery is logged and skipped; sessions
    /// found closed are pruned afterwards. Returns the number of deliveries.
    pub async fn broadcast(&self, payload: &str) -> usize {
        let snapshot: Vec<Session> = self.inner.sessions.read().await.values().cloned().collect();

        let mut delivered = 0;
        let mut closed = Vec::new();
        for session in &snapshot {
            match session.send(payload) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!("Broadcast delivery failed: {}", e);
                    closed.push(session.id());
                }
            }
        }

        if !closed.is_empty() {
            let mut sessions = self.inner.sessions.write().await;
            for id in closed {
                if sessions.get(&id).is_some_and(Session::is_closed) {
                    sessions.remove(&id);
                }
            }
        }

        debug!(
            "Broadcast {} bytes to {}/{} session(s)",
            payload.len(),
            delivered,
            snapshot.len()
        );
        delivered
    }

    pub async fn session_count(&self) -> usize {
        self.inner.sessions.read().await.len()
    }
}
