// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message delivery pipeline: persist, denormalize, route.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::chat::model::{ConversationKey, MessageStatus, NewMessage};
use crate::error::HandlerError;
use crate::protocol::{MessagePayload, SendMessage, ServerEvent};
use crate::state::AppState;

const STRIPES: usize = 64;

/// Striped async locks keyed by conversation identity.
///
/// Two first messages between the same pair racing from different
/// connections take the same stripe, so find-or-create runs one at a time
/// for that key even against a store without atomic upserts.
pub struct CreationLocks {
    stripes: Vec<Mutex<()>>,
}

impl CreationLocks {
    pub fn new() -> Self {
        Self { stripes: (0..STRIPES).map(|_| Mutex::new(())).collect() }
    }

    pub async fn lock(&self, key: &ConversationKey) -> MutexGuard<'_, ()> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let idx = (hasher.finish() as usize) % self.stripes.len();
        self.stripes[idx].lock().await
    }
}

impl Default for CreationLocks {
    fn default() -> Self {
        Self::new()
    }
}

fn validate(sender_id: &str, req: &SendMessage) -> Result<(), HandlerError> {
    if req.recipient_id.trim().is_empty() {
        return Err(HandlerError::validation("`recipientId` is required"));
    }
    if req.workspace_id.trim().is_empty() {
        return Err(HandlerError::validation("`workspaceId` is required"));
    }
    if req.content.trim().is_empty() {
        return Err(HandlerError::validation("message content is empty"));
    }
    if req.recipient_id == sender_id {
        return Err(HandlerError::validation("cannot message yourself"));
    }
    Ok(())
}

/// Persist a message from `sender_id` and route it to the recipient.
///
/// The returned payload carries the final status and is the sender's
/// acknowledgement. Any store failure aborts before a single event is
/// emitted.
pub async fn send_message(
    state: &AppState,
    sender_id: &str,
    req: SendMessage,
) -> Result<MessagePayload, HandlerError> {
    validate(sender_id, &req)?;

    let key = ConversationKey::new(&req.workspace_id, sender_id, &req.recipient_id);
    let conversation = {
        let _guard = state.creation_locks.lock(&key).await;
        state.store.find_or_create_conversation(&key).await?
    };
    if let Some(hint) = req.conversation_id.as_deref().filter(|hint| *hint != conversation.id) {
        debug!(hint, conversation_id = %conversation.id, "ignoring stale conversation hint");
    }

    let message = state
        .store
        .insert_message(NewMessage {
            conversation_id: conversation.id.clone(),
            sender_id: sender_id.to_owned(),
            content: req.content,
        })
        .await?;
    state.store.set_last_message(&conversation.id, &message.id).await?;
    let mut view = state.store.message_view(&message.id).await?;

    let recipient_online = state.hub.is_online(&req.recipient_id);
    if recipient_online {
        view.message.status =
            state.store.advance_status(&message.id, MessageStatus::Delivered).await?;
    }

    let payload =
        MessagePayload { view, recipient_id: req.recipient_id, workspace_id: req.workspace_id };

    if recipient_online
        && !state.hub.deliver(&payload.recipient_id, ServerEvent::NewMessage(payload.clone()))
    {
        debug!(recipient_id = %payload.recipient_id, "recipient left before delivery");
    }

    info!(
        sender_id,
        recipient_id = %payload.recipient_id,
        conversation_id = %conversation.id,
        message_id = %payload.view.message.id,
        status = %payload.view.message.status,
        "message stored"
    );
    Ok(payload)
}

#[cfg(test)]
#[path = "delivery_tests.rs"]
mod tests;
