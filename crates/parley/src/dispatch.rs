// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound event routing and the per-connection error supervisor.

use tracing::{debug, error};

use crate::chat::{delivery, receipts};
use crate::error::{ErrorCode, HandlerError};
use crate::protocol::{error_event, ClientEvent, ServerEvent};
use crate::signal::{relay, typing};
use crate::state::AppState;

/// Route one parsed event from `user_id`. The returned event, if any, is
/// the reply for the originating connection.
pub async fn dispatch(
    state: &AppState,
    user_id: &str,
    event: ClientEvent,
) -> Result<Option<ServerEvent>, HandlerError> {
    match event {
        ClientEvent::SendMessage(req) => {
            let payload = delivery::send_message(state, user_id, req).await?;
            Ok(Some(ServerEvent::NewMessage(payload)))
        }
        ClientEvent::MarkMessagesAsRead(req) => {
            receipts::mark_read(state, user_id, req).await?;
            Ok(None)
        }
        ClientEvent::StartTyping(target) => typing::start_typing(state, user_id, target),
        ClientEvent::StopTyping(target) => typing::stop_typing(state, user_id, target),
        ClientEvent::CallUser(req) => relay::call_user(state, user_id, req),
        ClientEvent::AnswerCall(req) => relay::answer_call(state, user_id, req),
        ClientEvent::IceCandidate(req) => relay::ice_candidate(state, user_id, req),
        ClientEvent::EndCall(req) => relay::end_call(state, user_id, req),
        ClientEvent::Ping => Ok(Some(ServerEvent::Pong)),
    }
}

/// Parse and dispatch a text frame, absorbing handler failures.
///
/// Malformed frames get an `error` reply. Handler errors are logged and
/// swallowed; the connection stays open either way.
pub async fn handle_frame(state: &AppState, user_id: &str, text: &str) -> Option<ServerEvent> {
    let event: ClientEvent = match serde_json::from_str(text) {
        Ok(event) => event,
        Err(e) => {
            debug!(user_id, err = %e, "malformed frame");
            return Some(error_event(ErrorCode::BadRequest, "invalid event"));
        }
    };

    let name = event.name();
    match dispatch(state, user_id, event).await {
        Ok(reply) => reply,
        Err(err @ HandlerError::Validation(_)) => {
            debug!(user_id, event = name, code = %err.code(), "{err}");
            None
        }
        Err(err @ HandlerError::Persistence(_)) => {
            error!(user_id, event = name, code = %err.code(), "{err}");
            None
        }
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
