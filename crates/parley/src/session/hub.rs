// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Serialized owner of the session registry.
//!
//! Every registry mutation and the presence broadcast that follows it happen
//! under one lock, so no session ever observes an "online" set that predates
//! a disconnect already applied. The lock is never held across an await.

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::protocol::ServerEvent;
use crate::session::presence;
use crate::session::registry::{ConnectionId, SessionHandle, SessionRegistry};

#[derive(Debug, Default)]
pub struct Hub {
    registry: Mutex<SessionRegistry>,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly authenticated connection and announce presence.
    ///
    /// A previous connection for the same user is closed. Returns the
    /// connection id of the replaced session, if any.
    pub fn connect(&self, user_id: &str, handle: SessionHandle) -> Option<ConnectionId> {
        let conn_id = handle.conn_id();
        let replaced = {
            let mut registry = self.registry.lock();
            let replaced = registry.register(user_id, handle);
            presence::announce(&registry);
            replaced
        };

        info!(user_id, %conn_id, "session registered");
        replaced.map(|old| {
            debug!(user_id, old = %old.conn_id(), new = %conn_id, "closing superseded session");
            old.close();
            old.conn_id()
        })
    }

    /// Remove the session if `conn_id` is still current and announce presence.
    ///
    /// Returns false (and broadcasts nothing) for a stale disconnect.
    pub fn disconnect(&self, user_id: &str, conn_id: ConnectionId) -> bool {
        let removed = {
            let mut registry = self.registry.lock();
            let removed = registry.unregister(user_id, conn_id);
            if removed {
                presence::announce(&registry);
            }
            removed
        };

        if removed {
            info!(user_id, %conn_id, "session unregistered");
        } else {
            debug!(user_id, %conn_id, "ignoring disconnect from superseded session");
        }
        removed
    }

    /// Route an event to the user's current session.
    ///
    /// Returns false on a routing miss (user offline or connection closing).
    pub fn deliver(&self, user_id: &str, event: ServerEvent) -> bool {
        let registry = self.registry.lock();
        match registry.lookup(user_id) {
            Some(handle) => handle.send(event),
            None => false,
        }
    }

    pub fn is_online(&self, user_id: &str) -> bool {
        self.registry.lock().lookup(user_id).is_some()
    }

    pub fn current_connection(&self, user_id: &str) -> Option<ConnectionId> {
        self.registry.lock().lookup(user_id).map(SessionHandle::conn_id)
    }

    pub fn online_users(&self) -> Vec<String> {
        self.registry.lock().list_online()
    }

    pub fn online_count(&self) -> usize {
        self.registry.lock().len()
    }
}

#[cfg(test)]
#[path = "hub_tests.rs"]
mod tests;
