// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User → live connection mapping.
//!
//! One handle per user; the most recent registration wins. The registry has
//! no interior locking: [`crate::session::hub::Hub`] owns it behind a mutex
//! so that mutations and the presence snapshot that follows them are taken
//! under the same critical section.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::protocol::ServerEvent;

/// Process-unique identifier of one transport connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Routing handle for a live connection.
///
/// Sending never blocks; events queue until the connection task writes them
/// to the socket. Cancelling the token tells the connection task to close.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    conn_id: ConnectionId,
    tx: mpsc::UnboundedSender<ServerEvent>,
    cancel: CancellationToken,
}

impl SessionHandle {
    /// Create a handle with a fresh connection id and its event receiver.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ServerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle =
            Self { conn_id: ConnectionId::next(), tx, cancel: CancellationToken::new() };
        (handle, rx)
    }

    pub fn conn_id(&self) -> ConnectionId {
        self.conn_id
    }

    /// Queue an event for the connection. Returns false if it already closed.
    pub fn send(&self, event: ServerEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn close(&self) {
        self.cancel.cancel();
    }

    pub fn closed_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<String, SessionHandle>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `user_id` to `handle`, returning the handle it replaced.
    pub fn register(&mut self, user_id: &str, handle: SessionHandle) -> Option<SessionHandle> {
        self.sessions.insert(user_id.to_owned(), handle)
    }

    /// Remove the binding for `user_id` only if `conn_id` is still the
    /// current connection. A late disconnect from a superseded connection
    /// leaves the newer session in place and returns false.
    pub fn unregister(&mut self, user_id: &str, conn_id: ConnectionId) -> bool {
        match self.sessions.get(user_id) {
            Some(current) if current.conn_id == conn_id => {
                self.sessions.remove(user_id);
                true
            }
            _ => false,
        }
    }

    pub fn lookup(&self, user_id: &str) -> Option<&SessionHandle> {
        self.sessions.get(user_id)
    }

    /// Online user ids, sorted for stable broadcasts.
    pub fn list_online(&self) -> Vec<String> {
        let mut users: Vec<String> = self.sessions.keys().cloned().collect();
        users.sort_unstable();
        users
    }

    pub fn handles(&self) -> impl Iterator<Item = &SessionHandle> {
        self.sessions.values()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
