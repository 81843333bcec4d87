// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use tracing::debug;

use crate::error::HandlerError;
use crate::protocol::{MarkMessagesAsRead, MessagesRead, ServerEvent};
use crate::state::AppState;

/// Mark everything `other_user_id` sent in the conversation as read by
/// `reader_id`, then tell `other_user_id` if anything changed.
///
/// Returns the number of messages that moved to `read`.
pub async fn mark_read(
    state: &AppState,
    reader_id: &str,
    req: MarkMessagesAsRead,
) -> Result<usize, HandlerError> {
    if req.conversation_id.trim().is_empty() || req.other_user_id.trim().is_empty() {
        return Err(HandlerError::validation("`conversationId` and `otherUserId` are required"));
    }

    let conversation = state.store.conversation(&req.conversation_id).await?.ok_or_else(|| {
        HandlerError::validation(format!("unknown conversation {}", req.conversation_id))
    })?;
    match conversation.other_participant(reader_id) {
        Some(other) if other == req.other_user_id => {}
        Some(_) => {
            return Err(HandlerError::validation("`otherUserId` is not in this conversation"));
        }
        None => return Err(HandlerError::validation("reader is not in this conversation")),
    }

    let changed = state.store.mark_read(&conversation.id, &req.other_user_id).await?;
    if changed > 0 {
        let event = ServerEvent::MessagesRead(MessagesRead { conversation_id: conversation.id });
        state.hub.deliver(&req.other_user_id, event);
    }
    debug!(reader_id, conversation_id = %req.conversation_id, changed, "messages marked read");
    Ok(changed)
}

#[cfg(test)]
#[path = "receipts_tests.rs"]
mod tests;
