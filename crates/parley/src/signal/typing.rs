// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::HandlerError;
use crate::protocol::{ServerEvent, TypingNotice, TypingTarget};
use crate::state::AppState;

fn relay(
    state: &AppState,
    sender_id: &str,
    target: &TypingTarget,
    event: fn(TypingNotice) -> ServerEvent,
) -> Result<Option<ServerEvent>, HandlerError> {
    if target.recipient_id.trim().is_empty() {
        return Err(HandlerError::validation("`recipientId` is required"));
    }
    // Ephemeral: dropped when the recipient is offline.
    state.hub.deliver(&target.recipient_id, event(TypingNotice { sender_id: sender_id.to_owned() }));
    Ok(None)
}

pub fn start_typing(
    state: &AppState,
    sender_id: &str,
    target: TypingTarget,
) -> Result<Option<ServerEvent>, HandlerError> {
    relay(state, sender_id, &target, ServerEvent::Typing)
}

pub fn stop_typing(
    state: &AppState,
    sender_id: &str,
    target: TypingTarget,
) -> Result<Option<ServerEvent>, HandlerError> {
    relay(state, sender_id, &target, ServerEvent::StopTyping)
}
