//! In-memory session store with per-session mutation locks.
//!
//! Sessions are keyed by id; completed sessions are additionally indexed
//! by order id. Each session sits behind its own `tokio::Mutex` so that
//! concurrent operations against the same session are serialized — the
//! state-machine invariants assume serialized mutation per session, and
//! `complete` must hold the lock across the gateway call to stay
//! exactly-once. Store contents are process-lifetime only; a restart
//! drops all open sessions.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use super::session::CheckoutSession;

/// Handle to a stored session. Lock before reading or writing.
pub type SessionHandle = Arc<Mutex<CheckoutSession>>;

/// Keyed storage for checkout sessions and the order-id index.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<String, SessionHandle>,
    orders: DashMap<String, String>,
}

impl SessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a freshly created session and returns its handle.
    pub fn insert(&self, session: CheckoutSession) -> SessionHandle {
        let id = session.id.clone();
        let handle = Arc::new(Mutex::new(session));
        self.sessions.insert(id, Arc::clone(&handle));
        handle
    }

    /// Looks up a session by id.
    #[must_use]
    pub fn get(&self, session_id: &str) -> Option<SessionHandle> {
        self.sessions.get(session_id).map(|h| Arc::clone(&h))
    }

    /// Indexes a completed session under its order id.
    pub fn index_order(&self, order_id: &str, session_id: &str) {
        self.orders.insert(order_id.to_owned(), session_id.to_owned());
    }

    /// Resolves an order id back to its session.
    #[must_use]
    pub fn get_by_order(&self, order_id: &str) -> Option<SessionHandle> {
        let session_id = self.orders.get(order_id)?;
        self.get(&session_id)
    }

    /// Number of stored sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if no sessions are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = SessionStore::new();
        let handle = store.insert(CheckoutSession::new("mat", 1, 2999));
        let id = handle.lock().await.id.clone();
        assert!(store.get(&id).is_some());
        assert!(store.get("acp_missing").is_none());
    }

    #[tokio::test]
    async fn test_order_index_round_trip() {
        let store = SessionStore::new();
        let handle = store.insert(CheckoutSession::new("strap", 1, 1299));
        let id = handle.lock().await.id.clone();
        store.index_order("order_abc", &id);

        let found = store.get_by_order("order_abc").unwrap();
        assert_eq!(found.lock().await.id, id);
        assert!(store.get_by_order("order_missing").is_none());
    }
}
