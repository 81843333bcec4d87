// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Full-set presence announcements.

use crate::protocol::ServerEvent;
use crate::session::registry::SessionRegistry;

/// Snapshot of the presence set as a `getOnlineUsers` event.
pub fn online_users_event(registry: &SessionRegistry) -> ServerEvent {
    ServerEvent::GetOnlineUsers(registry.list_online())
}

/// Send the current presence set to every registered session.
///
/// Must be called with the registry already mutated. Returns how many
/// sessions accepted the event.
pub fn announce(registry: &SessionRegistry) -> usize {
    let event = online_users_event(registry);
    registry.handles().filter(|handle| handle.send(event.clone())).count()
}
